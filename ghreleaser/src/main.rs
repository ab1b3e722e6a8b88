use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghreleaser::cli::{Args, GhreleaserCli};
use ghreleaser::config::{Config, Settings};
use ghreleaser::orchestrator::Releaser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GhreleaserCli::parse();

    // Initialize tracing, RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("ghreleaser version {}", env!("CARGO_PKG_VERSION"));

    let args: Args = cli.into();
    let config = Config::discover(args.config.as_deref())?;
    let settings = Settings::resolve(args, config)?;

    let releaser = Releaser::new(settings);
    let summary = releaser.run().await?;

    if !summary.is_success() {
        tracing::error!("Run finished with errors");
        std::process::exit(1);
    }

    tracing::info!("Run finished successfully");
    Ok(())
}
