use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::{
  config::SiteConfig,
  content::{ContentStore, PostData},
  error::Result,
  feed::{FeedBuilder, FeedDocument},
};

/// Load the collection and build the feed once.
pub fn render_feed(
  config: &SiteConfig,
  site: Option<&Url>,
) -> Result<FeedDocument> {
  let store = ContentStore::new(&config.content_dir);
  let posts = store.get_collection(&config.collection, PostData::is_published)?;
  let builder = FeedBuilder::new(config);
  Ok(builder.build(&posts, site))
}

/// Write the feed into the static output directory. Returns the path of
/// the written file.
pub fn write_feed(
  config: &SiteConfig,
  site: Option<&Url>,
  out_dir: Option<&Path>,
) -> Result<PathBuf> {
  let doc = render_feed(config, site)?;
  let xml = doc.serialize(false)?;

  let path = config.feed_output_path(out_dir);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, xml)?;

  info!("rss: {} ({} items)", path.display(), doc.items.len());
  Ok(path)
}
