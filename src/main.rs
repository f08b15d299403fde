//! ValuesLens CLI entry point.

use anyhow::Context;
use clap::Parser;

use valueslens::cli::{handle_error, AppContext, Cli};
use valueslens::infrastructure::config::ConfigLoader;
use valueslens::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    let mut ctx = AppContext::new(config).await?;
    valueslens::cli::run(cli.command, &mut ctx, cli.json).await
}
