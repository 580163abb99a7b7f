use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::content::{Post, PostData};

pub fn date(s: &str) -> DateTime<FixedOffset> {
  crate::util::parse_date(s).expect("invalid test date")
}

pub fn post(slug: &str, date_str: &str, published: bool) -> Post {
  Post {
    id: format!("{slug}.md"),
    slug: slug.to_owned(),
    body: String::new(),
    data: PostData {
      title: format!("Title {slug}"),
      description: format!("Description {slug}"),
      date: date(date_str),
      published,
    },
  }
}

pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).expect("failed to create dir");
  }
  std::fs::write(path, content).expect("failed to write file");
}

/// A content root with a `blog` collection matching the three-post
/// example: `a` published, `b` unpublished, `c` without the flag.
pub fn sample_content_root() -> tempfile::TempDir {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let blog = dir.path().join("blog");
  write_file(
    &blog.join("a.md"),
    "---\ntitle: Post A\ndescription: About A\ndate: 2024-01-01\npublished: true\n---\nA\n",
  );
  write_file(
    &blog.join("b.md"),
    "---\ntitle: Post B\ndescription: About B\ndate: 2024-03-01\npublished: false\n---\nB\n",
  );
  write_file(
    &blog.join("c.md"),
    "---\ntitle: Post C\ndescription: About C\ndate: 2024-02-01\n---\nC\n",
  );
  dir
}
