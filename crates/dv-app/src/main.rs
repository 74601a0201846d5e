//! Main application entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dv_core::Preferences;

mod cli;
mod commands;
mod report;

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let preferences_path = cli
        .preferences
        .clone()
        .unwrap_or_else(commands::default_preferences_path);
    let preferences = Preferences::load(&preferences_path)?;
    info!("designview {}", env!("CARGO_PKG_VERSION"));

    App::new(preferences).run(cli.command).await
}
