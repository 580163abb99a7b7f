use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};
use url::Url;

use crate::{
  config::SiteConfig,
  content::{ContentStore, Post, PostData},
  error::{ContentError, Error, Result, error_chain},
  feed::{FeedBuilder, FeedDocument},
};

/// Shared, reloadable snapshot of the published posts.
#[derive(Clone)]
pub struct FeedService {
  inner: Arc<RwLock<Inner>>,
  source: Arc<Source>,
}

struct Inner {
  posts: Arc<Vec<Post>>,
  // set when the content never loaded successfully
  load_error: Option<ContentError>,
}

struct Source {
  store: ContentStore,
  collection: String,
  builder: FeedBuilder,
  site: Option<Url>,
}

impl Source {
  fn new(config: &SiteConfig, site: Option<Url>) -> Self {
    Self {
      store: ContentStore::new(&config.content_dir),
      collection: config.collection.clone(),
      builder: FeedBuilder::new(config),
      site,
    }
  }

  fn load(&self) -> Result<Vec<Post>, ContentError> {
    self
      .store
      .get_collection(&self.collection, PostData::is_published)
  }
}

impl FeedService {
  pub fn try_from(
    config: &SiteConfig,
    site: Option<Url>,
  ) -> Result<Self, ContentError> {
    let source = Source::new(config, site);
    let posts = source.load()?;
    let inner = Inner {
      posts: Arc::new(posts),
      load_error: None,
    };
    Ok(Self::from_parts(source, inner))
  }

  /// Never fails: a load error is kept and reported by every request
  /// until a reload succeeds.
  pub fn new_lenient(config: &SiteConfig, site: Option<Url>) -> Self {
    let source = Source::new(config, site);
    let inner = match source.load() {
      Ok(posts) => Inner {
        posts: Arc::new(posts),
        load_error: None,
      },
      Err(e) => {
        error!("failed to load content: {}", error_chain(&e));
        Inner {
          posts: Arc::default(),
          load_error: Some(e),
        }
      }
    };
    Self::from_parts(source, inner)
  }

  fn from_parts(source: Source, inner: Inner) -> Self {
    Self {
      inner: Arc::new(RwLock::new(inner)),
      source: Arc::new(source),
    }
  }

  pub async fn with_error<R>(
    &self,
    f: impl FnOnce(&ContentError) -> R,
  ) -> Option<R> {
    let inner = self.inner.read().await;
    inner.load_error.as_ref().map(f)
  }

  pub async fn posts(&self) -> Arc<Vec<Post>> {
    let inner = self.inner.read().await;
    inner.posts.clone()
  }

  // Reload the collection from disk. Return true if the reload was
  // successful. On failure a previously loaded snapshot stays in place.
  pub async fn reload(&self) -> bool {
    let source = self.source.clone();
    let task = tokio::task::spawn_blocking(move || source.load());
    let loaded = match task.await {
      Ok(loaded) => loaded,
      Err(e) => {
        error!("content reload task failed: {}", e);
        return false;
      }
    };

    match loaded {
      Ok(posts) => {
        let mut inner = self.inner.write().await;
        info!("reloaded {} published posts", posts.len());
        inner.posts = Arc::new(posts);
        inner.load_error = None;
        true
      }
      Err(e) => {
        error!("failed to reload content: {}", error_chain(&e));
        let mut inner = self.inner.write().await;
        if inner.load_error.is_some() {
          inner.load_error = Some(e);
        }
        false
      }
    }
  }

  pub async fn render(&self) -> Result<FeedDocument> {
    if let Some(message) = self.with_error(|e| error_chain(e)).await {
      return Err(Error::Message(format!("content failed to load: {message}")));
    }

    let posts = self.posts().await;
    Ok(self.source.builder.build(&posts, self.source.site.as_ref()))
  }
}
