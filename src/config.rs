use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SITE: &str = "https://www.userhat.com";

/// # Site configuration
///
/// Every key is optional; an empty file describes the User Hat blog.
#[derive(JsonSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
  /// The canonical site URL. Item links are built from it. Falls back
  /// to https://www.userhat.com when unset.
  pub site: Option<Url>,
  /// Directory holding one sub-directory per content collection
  pub content_dir: PathBuf,
  /// Name of the collection the feed is built from
  pub collection: String,
  pub feed: FeedConfig,
  pub build: BuildConfig,
}

/// # Feed channel settings
#[derive(JsonSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
  /// Path the feed is served at and written to (e.g. "/rss.xml")
  pub path: String,
  pub title: String,
  pub description: String,
  /// Language tag of the channel (e.g. "en-au")
  pub language: String,
}

/// # Static build settings
#[derive(JsonSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  /// Output directory of the static build
  pub out_dir: PathBuf,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      site: None,
      content_dir: PathBuf::from("src/content"),
      collection: "blog".into(),
      feed: FeedConfig::default(),
      build: BuildConfig::default(),
    }
  }
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      path: "/rss.xml".into(),
      title: "User Hat SEO Blog RSS Feed".into(),
      description: "A blog exploring my interest in Usability and Search \
                    Engine Visibility."
        .into(),
      language: "en-au".into(),
    }
  }
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      out_dir: PathBuf::from("dist"),
    }
  }
}

impl SiteConfig {
  pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
      ConfigError::Message(format!("failed to read {}: {e}", path.display()))
    })?;
    Self::parse_yaml(&content)
  }

  pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }

    let config: Self = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Load from `path` if given, otherwise use the built-in defaults.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    match path {
      Some(path) => Self::load_from_file(path),
      None => Ok(Self::default()),
    }
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if !self.feed.path.starts_with('/') || self.feed.path.len() < 2 {
      return Err(ConfigError::Message(format!(
        "feed.path must be an absolute path like /rss.xml (got {:?})",
        self.feed.path
      )));
    }

    if self.collection.is_empty() || self.collection.contains('/') {
      return Err(ConfigError::Message(format!(
        "invalid collection name {:?}",
        self.collection
      )));
    }

    Ok(())
  }

  /// The configured site, or the blog's public URL.
  pub fn default_site(&self) -> Url {
    match &self.site {
      Some(site) => site.clone(),
      None => default_site_url(),
    }
  }

  /// Where the static build writes the feed.
  pub fn feed_output_path(&self, out_dir: Option<&Path>) -> PathBuf {
    let out_dir = out_dir.unwrap_or(&self.build.out_dir);
    out_dir.join(self.feed.path.trim_start_matches('/'))
  }

  pub fn schema() -> schemars::schema::RootSchema {
    let settings = schemars::r#gen::SchemaSettings::draft07().with(|s| {
      s.option_nullable = true;
      s.option_add_null_type = false;
    });
    let generator = settings.into_generator();
    generator.into_root_schema_for::<Self>()
  }
}

pub fn default_site_url() -> Url {
  Url::parse(DEFAULT_SITE).expect("DEFAULT_SITE is a valid URL")
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_empty_config_is_default() {
    let config = SiteConfig::parse_yaml("").unwrap();
    assert_eq!(config, SiteConfig::default());
    assert_eq!(config.default_site().as_str(), "https://www.userhat.com/");
    assert_eq!(config.feed.title, "User Hat SEO Blog RSS Feed");
    assert_eq!(config.feed.language, "en-au");
    assert_eq!(config.content_dir, PathBuf::from("src/content"));
    assert_eq!(config.collection, "blog");
  }

  #[test]
  fn test_partial_config() {
    let config = SiteConfig::parse_yaml(
      r#"
site: https://example.com/blog/
feed:
  title: Another feed
build:
  out_dir: public
"#,
    )
    .unwrap();

    assert_eq!(config.default_site().as_str(), "https://example.com/blog/");
    assert_eq!(config.feed.title, "Another feed");
    assert_eq!(config.feed.path, "/rss.xml");
    assert_eq!(
      config.feed_output_path(None),
      PathBuf::from("public/rss.xml")
    );
    assert_eq!(
      config.feed_output_path(Some(Path::new("out"))),
      PathBuf::from("out/rss.xml")
    );
  }

  #[test]
  fn test_invalid_config() {
    assert!(SiteConfig::parse_yaml("site: not a url").is_err());
    assert!(SiteConfig::parse_yaml("unknown_key: 1").is_err());
    assert!(SiteConfig::parse_yaml("feed:\n  path: rss.xml").is_err());
    assert!(SiteConfig::parse_yaml("collection: a/b").is_err());
  }

  #[test]
  fn test_schema_lists_fields() {
    let schema = serde_json::to_value(SiteConfig::schema()).unwrap();
    let properties = &schema["properties"];
    for key in ["site", "content_dir", "collection", "feed", "build"] {
      assert!(properties.get(key).is_some(), "missing {key}");
    }
  }
}
