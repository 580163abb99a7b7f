mod frontmatter;
mod slug;

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{error::ContentError, util};

use self::frontmatter::Document;
pub use self::frontmatter::UnterminatedFrontmatter;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

/// Validated frontmatter of a blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct PostData {
  pub title: String,
  pub description: String,
  pub date: DateTime<FixedOffset>,
  pub published: bool,
}

impl PostData {
  pub fn is_published(&self) -> bool {
    self.published
  }
}

/// One entry of a content collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
  /// Path relative to the collection directory, `/`-separated
  pub id: String,
  pub slug: String,
  /// Raw markdown body, never rendered here
  pub body: String,
  pub data: PostData,
}

// The shape frontmatter has to deserialize into before coercion.
#[derive(Deserialize)]
struct RawPostData {
  title: String,
  description: String,
  date: serde_yaml::Value,
  #[serde(default = "default_published")]
  published: bool,
  #[serde(default)]
  slug: Option<String>,
}

fn default_published() -> bool {
  true
}

impl Post {
  /// Parse one markdown source. `path` is only used in error messages.
  pub fn parse(
    relative: &Path,
    path: &Path,
    content: &str,
  ) -> Result<Self, ContentError> {
    let doc =
      Document::parse(content).map_err(|source| ContentError::Frontmatter {
        path: path.to_owned(),
        source,
      })?;

    let yaml = match doc.frontmatter {
      Some(yaml) if !yaml.trim().is_empty() => yaml,
      _ => "{}",
    };
    let raw: RawPostData =
      serde_yaml::from_str(yaml).map_err(|source| ContentError::Schema {
        path: path.to_owned(),
        source,
      })?;

    let invalid =
      |field: &'static str, message: &str| ContentError::InvalidField {
        path: path.to_owned(),
        field,
        message: message.to_owned(),
      };

    if raw.title.trim().is_empty() {
      return Err(invalid("title", "must not be empty"));
    }
    if raw.description.trim().is_empty() {
      return Err(invalid("description", "must not be empty"));
    }

    let date = coerce_date(&raw.date).ok_or_else(|| ContentError::InvalidDate {
      path: path.to_owned(),
      value: describe_value(&raw.date),
    })?;

    let slug = match raw.slug.as_deref() {
      Some(custom) => slug::normalize_override(custom)
        .map_err(|message| invalid("slug", message))?,
      None => slug::slug_from_path(relative),
    };
    if slug.is_empty() {
      return Err(invalid("slug", "cannot derive a slug from the file name"));
    }

    Ok(Self {
      id: entry_id(relative),
      slug,
      body: doc.body.to_owned(),
      data: PostData {
        title: raw.title,
        description: raw.description,
        date,
        published: raw.published,
      },
    })
  }
}

fn coerce_date(value: &serde_yaml::Value) -> Option<DateTime<FixedOffset>> {
  use serde_yaml::Value;

  match value {
    Value::String(s) => util::parse_date(s),
    Value::Number(n) => n.as_i64().and_then(util::from_millis),
    Value::Tagged(tagged) => coerce_date(&tagged.value),
    _ => None,
  }
}

fn describe_value(value: &serde_yaml::Value) -> String {
  serde_yaml::to_string(value)
    .map(|s| s.trim_end().to_owned())
    .unwrap_or_else(|_| format!("{value:?}"))
}

fn entry_id(relative: &Path) -> String {
  relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

/// Directory-backed store of content collections. Each collection is a
/// sub-directory of `root` holding markdown files.
#[derive(Clone, Debug)]
pub struct ContentStore {
  root: PathBuf,
}

impl ContentStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn collection_dir(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  /// Load and validate every entry of a collection, in path order.
  pub fn load_collection(&self, name: &str) -> Result<Vec<Post>, ContentError> {
    let dir = self.collection_dir(name);
    if !dir.is_dir() {
      return Err(ContentError::CollectionNotFound {
        name: name.to_owned(),
        path: dir,
      });
    }

    let mut files = Vec::new();
    collect_markdown_files(&dir, &mut files)?;
    files.sort();

    let mut posts = Vec::with_capacity(files.len());
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for path in files {
      let content =
        std::fs::read_to_string(&path).map_err(|source| ContentError::Io {
          path: path.clone(),
          source,
        })?;
      let relative = path.strip_prefix(&dir).unwrap_or(&path);
      let post = Post::parse(relative, &path, &content)?;

      if let Some(first) = seen.get(&post.slug) {
        return Err(ContentError::DuplicateSlug {
          slug: post.slug,
          first: first.clone(),
          second: path,
        });
      }
      debug!(
        "loaded {} ({} bytes of markdown) as /{}/",
        post.id,
        post.body.len(),
        post.slug
      );
      seen.insert(post.slug.clone(), path);
      posts.push(post);
    }

    info!("loaded {} entries from collection {}", posts.len(), name);
    Ok(posts)
  }

  /// Entries of a collection for which `predicate` holds.
  pub fn get_collection(
    &self,
    name: &str,
    predicate: impl Fn(&PostData) -> bool,
  ) -> Result<Vec<Post>, ContentError> {
    let mut posts = self.load_collection(name)?;
    posts.retain(|post| predicate(&post.data));
    Ok(posts)
  }
}

fn collect_markdown_files(
  dir: &Path,
  files: &mut Vec<PathBuf>,
) -> Result<(), ContentError> {
  let io_err = |source| ContentError::Io {
    path: dir.to_owned(),
    source,
  };

  for entry in std::fs::read_dir(dir).map_err(io_err)? {
    let entry = entry.map_err(io_err)?;
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if name.starts_with('_') || name.starts_with('.') {
      continue;
    }

    let path = entry.path();
    if entry.file_type().map_err(io_err)?.is_dir() {
      collect_markdown_files(&path, files)?;
    } else if is_markdown(&path) {
      files.push(path);
    }
  }

  Ok(())
}

fn is_markdown(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}
