use std::path::Path;

use chrono::Utc;
use drivesync_core::auth::{ClientSecrets, FileTokenStore, OAuthClient, TokenPersistence};

use crate::cli::AuthCommands;
use crate::commands::common::{describe_token, load_config};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let (_, config) = load_config(config_path)?;
    let store = FileTokenStore::new(&config.token_path);

    match command {
        AuthCommands::Login => {
            let secrets = ClientSecrets::from_file(&config.credentials_path)?;
            let client = OAuthClient::new(secrets, store)?;
            let token = client.authorize_interactive(&config.scopes).await?;
            println!(
                "Saved token to {} ({})",
                client.store().describe().display(),
                describe_token(Some(&token), &config.scopes, Utc::now())
            );
            Ok(())
        }
        AuthCommands::Status => {
            let token = store.load_token()?;
            println!(
                "{}: {}",
                store.describe().display(),
                describe_token(token.as_ref(), &config.scopes, Utc::now())
            );
            Ok(())
        }
        AuthCommands::Logout => {
            store.clear_token()?;
            println!("Removed token at {}", store.describe().display());
            Ok(())
        }
    }
}
