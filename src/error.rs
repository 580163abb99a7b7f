use std::path::PathBuf;

use http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("YAML parse error")]
  Yaml(#[from] serde_yaml::Error),

  #[error("{0}")]
  Message(String),
}

/// Failures while loading a content collection. All of them abort the
/// build: a post is never silently skipped.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
  #[error("collection {name} not found at {}", path.display())]
  CollectionNotFound { name: String, path: PathBuf },

  #[error("failed to read {}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed frontmatter in {}", path.display())]
  Frontmatter {
    path: PathBuf,
    #[source]
    source: crate::content::UnterminatedFrontmatter,
  },

  #[error("frontmatter of {} does not match the schema", path.display())]
  Schema {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("field `{field}` in {} is invalid: {message}", path.display())]
  InvalidField {
    path: PathBuf,
    field: &'static str,
    message: String,
  },

  #[error("cannot coerce {value} into a date in {}", path.display())]
  InvalidDate { path: PathBuf, value: String },

  #[error(
    "duplicate slug {slug:?} used by {} and {}",
    first.display(),
    second.display()
  )]
  DuplicateSlug {
    slug: String,
    first: PathBuf,
    second: PathBuf,
  },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("IO error")]
  Io(#[from] std::io::Error),

  #[error("Feed error")]
  Rss(#[from] rss::Error),

  #[error("Config error {0:?}")]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Content(#[from] ContentError),

  #[error("failed to watch {}", path.display())]
  Watch {
    path: PathBuf,
    #[source]
    source: notify::Error,
  },

  #[error("{0}")]
  Message(String),
}

/// The error message followed by its chain of causes, one per line.
pub fn error_chain(e: &dyn std::error::Error) -> String {
  let mut message = e.to_string();
  let mut source = e.source();
  while let Some(cause) = source {
    message.push_str(&format!("\n  caused by: {cause}"));
    source = cause.source();
  }
  message
}

pub fn into_http(e: &Error) -> (StatusCode, String) {
  (StatusCode::INTERNAL_SERVER_ERROR, error_chain(e))
}
