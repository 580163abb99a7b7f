use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tower::Service;
use url::Url;

use crate::{
  build,
  config::SiteConfig,
  server::{EndpointParam, FeedEndpoint, FeedService, ServerConfig},
};

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
  #[clap(subcommand)]
  subcmd: SubCommand,

  /// Site configuration (YAML). Built-in defaults are used when omitted.
  #[clap(long, short, env = "USERHAT_FEED_CONFIG")]
  config: Option<PathBuf>,
}

#[derive(Parser)]
enum SubCommand {
  /// Serve the feed over HTTP
  Serve(ServerConfig),
  /// Write the feed into the static output directory
  Build(BuildConfig),
  /// Print the feed to stdout
  Print(PrintConfig),
  /// Print the JSON schema of the configuration file
  Schema,
}

#[derive(Parser)]
struct BuildConfig {
  /// Output directory (overrides build.out_dir)
  #[clap(long, short)]
  out_dir: Option<PathBuf>,
  /// Site URL used for the channel and item links
  #[clap(long)]
  site: Option<Url>,
}

#[derive(Parser)]
struct PrintConfig {
  /// Site URL used for the channel and item links
  #[clap(long)]
  site: Option<Url>,
  /// Pretty-print the XML output
  #[clap(long, short)]
  pretty: bool,
}

impl Cli {
  pub async fn run(self) -> anyhow::Result<()> {
    if let SubCommand::Schema = self.subcmd {
      let schema = serde_json::to_string_pretty(&SiteConfig::schema())?;
      println!("{schema}");
      return Ok(());
    }

    let site_config = SiteConfig::load(self.config.as_deref())
      .context("failed to load site configuration")?;

    match self.subcmd {
      SubCommand::Serve(server_config) => server_config
        .run(site_config)
        .await
        .context("server failed"),
      SubCommand::Build(build_config) => {
        build::write_feed(
          &site_config,
          build_config.site.as_ref(),
          build_config.out_dir.as_deref(),
        )
        .context("build failed")?;
        Ok(())
      }
      SubCommand::Print(print_config) => {
        print_feed(site_config, &print_config).await
      }
      SubCommand::Schema => Ok(()),
    }
  }
}

async fn print_feed(
  site_config: SiteConfig,
  print_config: &PrintConfig,
) -> anyhow::Result<()> {
  let service = FeedService::try_from(&site_config, print_config.site.clone())
    .context("failed to load content")?;
  let mut endpoint = FeedEndpoint::new(service);
  let outcome = endpoint
    .call(EndpointParam::new(print_config.pretty))
    .await
    .context("failed to render feed")?;

  println!("{}", outcome.feed_xml());
  Ok(())
}
