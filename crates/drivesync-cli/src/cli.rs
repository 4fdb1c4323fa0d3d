use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "drivesync")]
#[command(about = "Mirror local files into Google Drive folders")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the sync config file (overrides DRIVESYNC_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output, including listing pagination
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync every configured target
    Run {
        /// Report what would be created or updated without uploading
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage the stored Google OAuth token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Inspect the sync configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Run the browser consent flow and store a fresh token
    Login,
    /// Show whether a usable token is stored
    Status,
    /// Delete the stored token
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration after normalization
    Show,
    /// Print which config file would be used
    Path,
}
