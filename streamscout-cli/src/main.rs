//! Streamscout CLI - Command-line interface
//!
//! Runs the API server or performs one-off lookups against the providers.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use streamscout_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "streamscout")]
#[command(about = "Finds playable streams for movies and episodes")]
struct Cli {
    /// Console log level (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    /// Directory for the last-run debug log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    commands::handle_command(cli.command).await
}
