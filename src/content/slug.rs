use std::path::{Component, Path};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
  static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("bad regex");
  static ref DISALLOWED: Regex = Regex::new(r"[^\w-]").expect("bad regex");
  static ref OVERRIDE_SEGMENT: Regex =
    Regex::new(r"^[\w.~-]+$").expect("bad regex");
}

/// Lowercase, dash-separated form of a single path segment.
pub fn slugify(segment: &str) -> String {
  let lowered = segment.trim().to_lowercase();
  let dashed = WHITESPACE.replace_all(&lowered, "-");
  DISALLOWED.replace_all(&dashed, "").into_owned()
}

/// Slug of an entry from its path relative to the collection directory:
/// the extension is dropped and every directory level is slugified.
pub fn slug_from_path(relative: &Path) -> String {
  relative
    .with_extension("")
    .components()
    .filter_map(|c| match c {
      Component::Normal(segment) => Some(slugify(&segment.to_string_lossy())),
      _ => None,
    })
    .filter(|segment| !segment.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

/// A slug written in frontmatter, kept as-is apart from surrounding
/// slashes. Every `/`-separated segment has to be a non-empty run of
/// word characters, `-`, `.` or `~`, so the slug can be joined into a
/// link without escaping.
pub fn normalize_override(slug: &str) -> Result<String, &'static str> {
  let slug = slug.trim().trim_matches('/');
  if slug.is_empty() {
    return Err("must not be empty");
  }

  for segment in slug.split('/') {
    if segment.is_empty() {
      return Err("must not contain empty path segments");
    }
    if segment == "." || segment == ".." {
      return Err("must not contain `.` or `..` segments");
    }
    if !OVERRIDE_SEGMENT.is_match(segment) {
      return Err("may only contain letters, digits, `-`, `_`, `.` and `~`");
    }
  }

  Ok(slug.to_owned())
}
