use std::path::Path;

use drivesync_core::config::resolve_config_path;

use crate::cli::ConfigCommands;
use crate::commands::common::load_config;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            let (path, config) = load_config(config_path)?;
            println!("# {}", path.display());
            println!("{}", config.to_pretty_json()?);
        }
        ConfigCommands::Path => {
            let path = resolve_config_path(config_path)?;
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (missing)", path.display());
            }
        }
    }
    Ok(())
}
