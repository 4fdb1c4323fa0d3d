use std::path::Path;

use drivesync_core::auth::{authorize, Interaction};
use drivesync_core::remote::DriveClient;
use drivesync_core::Driver;

use crate::commands::common::{format_run_summary, load_config};
use crate::error::CliError;

pub async fn run_sync(config_path: Option<&Path>, dry_run: bool) -> Result<(), CliError> {
    let (path, config) = load_config(config_path)?;
    tracing::info!(
        "Loaded {} target(s) from {}",
        config.targets.len(),
        path.display()
    );

    let token = authorize(
        &config.token_path,
        &config.credentials_path,
        &config.scopes,
        Interaction::Allowed,
    )
    .await?;
    let client = DriveClient::new(token)?;

    let report = Driver::new(&config, &client).dry_run(dry_run).run().await?;

    for line in format_run_summary(&report, dry_run) {
        println!("{line}");
    }

    if report.has_failures() {
        return Err(CliError::TargetsFailed(
            report.failed(),
            report.targets.len(),
        ));
    }
    Ok(())
}
