use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use drivesync_core::auth::StoredToken;
use drivesync_core::config::resolve_config_path;
use drivesync_core::sync::SyncOutcome;
use drivesync_core::{RunReport, SyncConfig, TargetOutcome};

use crate::error::CliError;

pub fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, SyncConfig), CliError> {
    let path = resolve_config_path(explicit)?;
    tracing::debug!("Loading config from {}", path.display());
    let config = SyncConfig::load_from_path(&path)?;
    Ok((path, config))
}

/// Render per-target lines followed by a totals line.
pub fn format_run_summary(report: &RunReport, dry_run: bool) -> Vec<String> {
    let mut lines = Vec::new();

    for target in &report.targets {
        let pattern = &target.target.pattern;
        let container = &target.target.container;
        match &target.outcome {
            TargetOutcome::NoMatches => {
                lines.push(format!("{pattern} -> {container}: no matching paths"));
            }
            TargetOutcome::Failed(message) => {
                lines.push(format!("{pattern} -> {container}: FAILED: {message}"));
            }
            TargetOutcome::Synced(sync) => {
                lines.push(format!("{pattern} -> {container}"));
                for entry in &sync.entries {
                    lines.push(format!(
                        "  {:<20} {}{}",
                        entry.outcome.label(),
                        entry.path.display(),
                        remote_suffix(&entry.outcome)
                    ));
                }
            }
        }
    }

    let totals = if dry_run {
        format!(
            "Dry run: {} planned, {} unchanged, {} director(ies) skipped, {} unmatched, {} failed",
            report.planned(),
            report.unchanged(),
            report.skipped_directories(),
            report.unmatched(),
            report.failed()
        )
    } else {
        format!(
            "{} created, {} updated, {} unchanged, {} director(ies) skipped, {} unmatched, {} failed",
            report.created(),
            report.updated(),
            report.unchanged(),
            report.skipped_directories(),
            report.unmatched(),
            report.failed()
        )
    };
    lines.push(totals);
    lines
}

fn remote_suffix(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Created { remote_id }
        | SyncOutcome::Updated { remote_id }
        | SyncOutcome::Unchanged { remote_id }
        | SyncOutcome::WouldUpdate { remote_id } => format!(" ({remote_id})"),
        SyncOutcome::SkippedDirectory | SyncOutcome::WouldCreate => String::new(),
    }
}

pub fn describe_token(
    token: Option<&StoredToken>,
    scopes: &[String],
    now: DateTime<Utc>,
) -> String {
    let Some(token) = token else {
        return "No token stored.".to_string();
    };

    let expiry = token.expiry.map_or_else(
        || "no recorded expiry".to_string(),
        |expiry| format!("expires_at={}", expiry.to_rfc3339()),
    );
    let refresh = if token.refresh_token.is_some() {
        "refreshable"
    } else {
        "not refreshable"
    };

    if !token.covers(scopes) {
        return format!("Token stored but missing requested scopes ({expiry}, {refresh}).");
    }
    if token.is_expired_at(now) {
        format!("Token expired ({expiry}, {refresh}).")
    } else {
        format!("Token valid ({expiry}, {refresh}).")
    }
}
