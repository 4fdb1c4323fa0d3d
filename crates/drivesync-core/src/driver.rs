//! Top-level run over every configured target.

use crate::config::SyncConfig;
use crate::models::SyncTarget;
use crate::remote::RemoteStore;
use crate::resolve::resolve;
use crate::sync::{EngineOptions, SyncEngine, SyncReport};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The pattern matched nothing; the target was skipped.
    NoMatches,
    Synced(SyncReport),
    /// The target failed and the run moved on.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: SyncTarget,
    pub outcome: TargetOutcome,
}

/// Per-target outcomes in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    fn synced(&self) -> impl Iterator<Item = &SyncReport> {
        self.targets.iter().filter_map(|report| match &report.outcome {
            TargetOutcome::Synced(sync) => Some(sync),
            _ => None,
        })
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.synced().map(SyncReport::created).sum()
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.synced().map(SyncReport::updated).sum()
    }

    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.synced().map(SyncReport::unchanged).sum()
    }

    #[must_use]
    pub fn planned(&self) -> usize {
        self.synced().map(SyncReport::planned).sum()
    }

    #[must_use]
    pub fn skipped_directories(&self) -> usize {
        self.synced().map(SyncReport::skipped_directories).sum()
    }

    #[must_use]
    pub fn unmatched(&self) -> usize {
        self.targets
            .iter()
            .filter(|report| report.outcome == TargetOutcome::NoMatches)
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.targets
            .iter()
            .filter(|report| matches!(report.outcome, TargetOutcome::Failed(_)))
            .count()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

pub struct Driver<'a, R: RemoteStore + ?Sized> {
    config: &'a SyncConfig,
    remote: &'a R,
    dry_run: bool,
}

impl<'a, R: RemoteStore + ?Sized> Driver<'a, R> {
    pub const fn new(config: &'a SyncConfig, remote: &'a R) -> Self {
        Self {
            config,
            remote,
            dry_run: false,
        }
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every target in order.
    ///
    /// A failing target is recorded and the run continues, unless the config
    /// sets `stop_on_error`, in which case the first failure is returned.
    pub async fn run(&self) -> Result<RunReport> {
        let engine = SyncEngine::new(
            self.remote,
            EngineOptions {
                tie_break: self.config.tie_break,
                dry_run: self.dry_run,
            },
        );

        let mut report = RunReport::default();
        for target in &self.config.targets {
            let outcome = match Self::run_target(&engine, target).await {
                Ok(outcome) => outcome,
                Err(error) if self.config.stop_on_error => {
                    tracing::error!("Target '{}' failed, stopping: {}", target.pattern, error);
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!("Target '{}' failed: {}", target.pattern, error);
                    TargetOutcome::Failed(error.to_string())
                }
            };
            report.targets.push(TargetReport {
                target: target.clone(),
                outcome,
            });
        }
        Ok(report)
    }

    async fn run_target(engine: &SyncEngine<'_, R>, target: &SyncTarget) -> Result<TargetOutcome> {
        let paths = resolve(&target.pattern)?;
        if paths.is_empty() {
            tracing::warn!("Pattern '{}' resolved to no paths", target.pattern);
            return Ok(TargetOutcome::NoMatches);
        }

        tracing::info!(
            "Pattern '{}' resolved to {} path(s); syncing into {}",
            target.pattern,
            paths.len(),
            target.container
        );
        let sync = engine.sync(&paths, &target.container).await?;
        Ok(TargetOutcome::Synced(sync))
    }
}
