use chrono::{DateTime, FixedOffset};
use url::Url;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::util;

pub const CONTENT_TYPE: &str = "application/xml";

/// One syndicated post.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedItem {
  pub title: String,
  pub description: String,
  pub pub_date: DateTime<FixedOffset>,
  pub link: String,
}

/// A channel and its items, newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedDocument {
  pub title: String,
  pub description: String,
  pub link: String,
  pub language: String,
  pub items: Vec<FeedItem>,
}

/// Turns a post collection into a [`FeedDocument`]. Holds only the fixed
/// channel metadata, so building is a pure function of the posts and the
/// site URL.
#[derive(Clone, Debug)]
pub struct FeedBuilder {
  title: String,
  description: String,
  language: String,
  default_site: Url,
}

impl FeedBuilder {
  pub fn new(config: &SiteConfig) -> Self {
    Self {
      title: config.feed.title.clone(),
      description: config.feed.description.clone(),
      language: config.feed.language.clone(),
      default_site: config.default_site(),
    }
  }

  /// Keep published posts, order them newest first (stable on ties) and
  /// link each one under `site`, or under the default site when the
  /// caller has none.
  pub fn build(&self, posts: &[Post], site: Option<&Url>) -> FeedDocument {
    let site = site_root(site.unwrap_or(&self.default_site));
    let base = site.as_str().trim_end_matches('/');

    let mut published: Vec<&Post> =
      posts.iter().filter(|post| post.data.is_published()).collect();
    // sort_by is stable: equal dates keep collection order
    published.sort_by(|a, b| b.data.date.cmp(&a.data.date));

    let items = published
      .into_iter()
      .map(|post| FeedItem {
        title: post.data.title.clone(),
        description: post.data.description.clone(),
        pub_date: post.data.date,
        link: format!("{base}/{}/", post.slug),
      })
      .collect();

    FeedDocument {
      title: self.title.clone(),
      description: self.description.clone(),
      link: site.to_string(),
      language: self.language.clone(),
      items,
    }
  }
}

// Query and fragment would end up in the middle of every item link.
fn site_root(site: &Url) -> Url {
  let mut site = site.clone();
  site.set_query(None);
  site.set_fragment(None);
  site
}

impl From<&FeedItem> for rss::Item {
  fn from(item: &FeedItem) -> Self {
    rss::Item {
      title: Some(item.title.clone()),
      link: Some(item.link.clone()),
      description: Some(item.description.clone()),
      pub_date: Some(util::to_rfc822(&item.pub_date)),
      guid: Some(rss::Guid {
        value: item.link.clone(),
        permalink: true,
      }),
      ..Default::default()
    }
  }
}

impl From<&FeedDocument> for rss::Channel {
  fn from(doc: &FeedDocument) -> Self {
    rss::Channel {
      title: doc.title.clone(),
      link: doc.link.clone(),
      description: doc.description.clone(),
      language: Some(doc.language.clone()),
      items: doc.items.iter().map(rss::Item::from).collect(),
      ..Default::default()
    }
  }
}

impl FeedDocument {
  pub fn to_channel(&self) -> rss::Channel {
    rss::Channel::from(self)
  }

  pub fn serialize(&self, pretty: bool) -> Result<String> {
    let channel = self.to_channel();
    let mut buffer = vec![];

    if pretty {
      channel.pretty_write_to(&mut buffer, b' ', 2)?;
    } else {
      channel.write_to(&mut buffer)?;
    }

    let s = String::from_utf8_lossy(&buffer).into_owned();
    Ok(s)
  }
}
