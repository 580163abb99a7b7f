const FENCE: &str = "---";

#[derive(Debug, thiserror::Error)]
#[error("frontmatter opened with --- is never closed")]
pub struct UnterminatedFrontmatter;

/// A markdown source split into its YAML frontmatter and body.
#[derive(Debug, PartialEq, Eq)]
pub struct Document<'a> {
  pub frontmatter: Option<&'a str>,
  pub body: &'a str,
}

impl<'a> Document<'a> {
  pub fn parse(content: &'a str) -> Result<Self, UnterminatedFrontmatter> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = strip_fence_line(content) else {
      return Ok(Self {
        frontmatter: None,
        body: content,
      });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
      if is_fence(line) {
        return Ok(Self {
          frontmatter: Some(&rest[..offset]),
          body: &rest[offset + line.len()..],
        });
      }
      offset += line.len();
    }

    Err(UnterminatedFrontmatter)
  }
}

fn strip_fence_line(content: &str) -> Option<&str> {
  let (first, rest) = match content.find('\n') {
    Some(i) => (&content[..i], &content[i + 1..]),
    None => (content, ""),
  };
  is_fence(first).then_some(rest)
}

fn is_fence(line: &str) -> bool {
  line.trim_end() == FENCE
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_split_frontmatter() {
    let doc = Document::parse("---\ntitle: Hi\n---\n# Body\n").unwrap();
    assert_eq!(doc.frontmatter, Some("title: Hi\n"));
    assert_eq!(doc.body, "# Body\n");
  }

  #[test]
  fn test_crlf_and_bom() {
    let doc =
      Document::parse("\u{feff}---\r\ntitle: Hi\r\n---\r\nbody").unwrap();
    assert_eq!(doc.frontmatter, Some("title: Hi\r\n"));
    assert_eq!(doc.body, "body");
  }

  #[test]
  fn test_empty_frontmatter() {
    let doc = Document::parse("---\n---\n").unwrap();
    assert_eq!(doc.frontmatter, Some(""));
    assert_eq!(doc.body, "");
  }

  #[test]
  fn test_no_frontmatter() {
    let doc = Document::parse("# Just markdown\n---\n").unwrap();
    assert_eq!(doc.frontmatter, None);
    assert_eq!(doc.body, "# Just markdown\n---\n");
  }

  #[test]
  fn test_unterminated() {
    assert!(Document::parse("---\ntitle: Hi\n").is_err());
  }
}
