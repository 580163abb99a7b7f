mod endpoint;
mod feed_service;
mod watcher;

use axum::{Router, routing::get};
use clap::Parser;
use http::StatusCode;
use tower_http::compression::CompressionLayer;
use tracing::info;
use url::Url;

use crate::{config::SiteConfig, error::Result};

pub use endpoint::{EndpointParam, FeedEndpoint};
pub use feed_service::FeedService;
use watcher::Watcher;

#[derive(Parser)]
pub struct ServerConfig {
  #[clap(long, short, default_value = "127.0.0.1:4321")]
  bind: String,
  /// Site URL used for the channel and item links (overrides the config)
  #[clap(long)]
  site: Option<Url>,
  /// Reload the content collection whenever a file under it changes
  #[clap(long, short)]
  watch: bool,
}

impl ServerConfig {
  pub async fn run(self, site_config: SiteConfig) -> Result<()> {
    serve(self, site_config).await
  }
}

pub fn router(service: FeedService, feed_path: &str) -> Router {
  Router::new()
    .route_service(feed_path, FeedEndpoint::new(service))
    .route("/", get(|| async { "userhat-feed is up and running!" }))
    .route("/health", get(|| async { "ok" }))
    .fallback(get(|| async { (StatusCode::NOT_FOUND, "Endpoint not found") }))
    .layer(CompressionLayer::new().gzip(true))
}

pub async fn serve(
  server_config: ServerConfig,
  site_config: SiteConfig,
) -> Result<()> {
  let site = server_config.site.clone().or_else(|| site_config.site.clone());
  let service = if server_config.watch {
    FeedService::new_lenient(&site_config, site)
  } else {
    FeedService::try_from(&site_config, site)?
  };

  // kept alive for as long as the server runs
  let mut content_watcher = None;
  if server_config.watch {
    let mut watcher = Watcher::new(&site_config.content_dir);
    watcher.setup()?;
    if let Some(mut alert) = watcher.take_change_alert() {
      let service = service.clone();
      tokio::spawn(async move {
        while alert.recv().await.is_some() {
          info!("content changed, reloading");
          service.reload().await;
        }
      });
    }
    info!("watching {} for changes", site_config.content_dir.display());
    content_watcher = Some(watcher);
  }

  info!("listening on {}", server_config.bind);
  let listener = tokio::net::TcpListener::bind(&server_config.bind).await?;

  info!("serving feed at {}", site_config.feed.path);
  let app = router(service, &site_config.feed.path);

  info!("starting server");
  axum::serve(listener, app).await?;
  drop(content_watcher);
  Ok(())
}

#[cfg(test)]
mod test {
  use axum::body::{Body, to_bytes};
  use http::{Request, header};
  use tower::ServiceExt;

  use super::*;
  use crate::test_utils::sample_content_root;

  async fn fetch(app: Router, uri: &str) -> (StatusCode, String, String) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_owned();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
  }

  fn app(root: &std::path::Path) -> Router {
    let config = SiteConfig {
      content_dir: root.to_owned(),
      ..Default::default()
    };
    let service = FeedService::try_from(&config, None).unwrap();
    router(service, &config.feed.path)
  }

  #[tokio::test]
  async fn test_feed_endpoint() {
    let root = sample_content_root();
    let (status, content_type, body) =
      fetch(app(root.path()), "/rss.xml").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/xml");

    let channel = rss::Channel::read_from(body.as_bytes()).unwrap();
    let titles: Vec<_> =
      channel.items().iter().filter_map(|i| i.title()).collect();
    assert_eq!(titles, ["Post C", "Post A"]);
    assert_eq!(channel.language(), Some("en-au"));
  }

  #[tokio::test]
  async fn test_feed_endpoint_pretty_print() {
    let root = sample_content_root();
    let (_, _, compact) = fetch(app(root.path()), "/rss.xml").await;
    let (status, _, pretty) = fetch(app(root.path()), "/rss.xml?pp=1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(pretty.lines().count() > compact.lines().count());
  }

  #[tokio::test]
  async fn test_health_and_fallback() {
    let root = sample_content_root();

    let (status, _, body) = fetch(app(root.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _, _) = fetch(app(root.path()), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_feed_endpoint_reports_load_error() {
    let root = tempfile::tempdir().unwrap();
    let config = SiteConfig {
      content_dir: root.path().to_owned(),
      ..Default::default()
    };
    let service = FeedService::new_lenient(&config, None);
    let app = router(service, &config.feed.path);

    let (status, _, body) = fetch(app, "/rss.xml").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("collection blog not found"));
  }
}
