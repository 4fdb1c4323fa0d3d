//! drivesync CLI - Mirror local files into Google Drive folders
//!
//! Reads the sync config, authorizes against Google, and creates or updates
//! one Drive object per matched local file.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::config::run_config;
use crate::commands::run::run_sync;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run { dry_run } => run_sync(config_path, dry_run).await?,
        Commands::Auth { command } => run_auth(command, config_path).await?,
        Commands::Config { command } => run_config(command, config_path)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "drivesync=debug"
    } else {
        "drivesync=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match default_directive(verbose).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
