use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use axum::body::Body;
use axum::response::IntoResponse;
use http::header::{CONTENT_TYPE, HeaderValue};
use tower::Service;
use url::Url;

use super::feed_service::FeedService;
use crate::error::{Error, Result, into_http};
use crate::feed;

type Request = http::Request<Body>;
type Response = http::Response<Body>;

/// Serves the RSS document built from the current content snapshot.
#[derive(Clone)]
pub struct FeedEndpoint {
  service: FeedService,
}

#[derive(Clone, Default)]
pub struct EndpointParam {
  pretty_print: bool,
}

impl EndpointParam {
  pub fn new(pretty_print: bool) -> Self {
    Self { pretty_print }
  }

  fn from_request(req: &Request) -> Self {
    Self {
      pretty_print: Self::parse_pretty_print(req),
    }
  }

  fn parse_pretty_print(req: &Request) -> bool {
    Self::get_query(req, "pp")
      .map(|x| x == "1" || x == "true")
      .unwrap_or(false)
  }

  fn get_query(req: &Request, name: &str) -> Option<String> {
    let url = Url::parse(&format!("http://placeholder{}", &req.uri())).ok()?;
    url
      .query_pairs()
      .find_map(|(k, v)| (k == name).then_some(v))
      .map(|x| x.to_string())
  }
}

#[derive(Clone)]
pub struct EndpointOutcome {
  feed_xml: String,
}

impl EndpointOutcome {
  pub fn feed_xml(&self) -> &str {
    &self.feed_xml
  }
}

impl IntoResponse for EndpointOutcome {
  fn into_response(self) -> axum::response::Response {
    let mut resp = Response::new(Body::from(self.feed_xml));
    resp
      .headers_mut()
      .insert(CONTENT_TYPE, HeaderValue::from_static(feed::CONTENT_TYPE));
    resp
  }
}

impl Service<EndpointParam> for FeedEndpoint {
  type Response = EndpointOutcome;
  type Error = Error;
  type Future =
    Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

  fn poll_ready(
    &mut self,
    _cx: &mut std::task::Context<'_>,
  ) -> std::task::Poll<Result<(), Self::Error>> {
    std::task::Poll::Ready(Ok(()))
  }

  fn call(&mut self, req: EndpointParam) -> Self::Future {
    let this = self.clone();
    let fut = async { this.call_internal(req).await };
    Box::pin(fut)
  }
}

impl Service<Request> for FeedEndpoint {
  type Response = Response;
  type Error = Infallible;
  // not Sync because the request's Body may not be sync
  type Future =
    Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

  fn poll_ready(
    &mut self,
    _cx: &mut std::task::Context<'_>,
  ) -> std::task::Poll<Result<(), Self::Error>> {
    std::task::Poll::Ready(Ok(()))
  }

  fn call(&mut self, req: Request) -> Self::Future {
    let this = self.clone();
    let param = EndpointParam::from_request(&req);
    let fut = async move {
      let resp = match this.call_internal(param).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
          tracing::error!("failed to render feed: {e}");
          into_http(&e).into_response()
        }
      };
      Ok(resp)
    };
    Box::pin(fut)
  }
}

impl FeedEndpoint {
  pub fn new(service: FeedService) -> Self {
    Self { service }
  }

  async fn call_internal(
    self,
    param: EndpointParam,
  ) -> Result<EndpointOutcome> {
    let doc = self.service.render().await?;
    let feed_xml = doc.serialize(param.pretty_print)?;
    Ok(EndpointOutcome { feed_xml })
  }
}
