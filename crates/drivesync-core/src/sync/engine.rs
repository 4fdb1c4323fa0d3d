//! Per-path create/update/skip decisions against a remote store.

use std::path::{Path, PathBuf};

use super::change::has_changed;
use super::select::{pick_newest, TieBreak};
use crate::models::{ContainerId, LocalEntry, LocalFileRef, RemoteFileRecord};
use crate::remote::RemoteStore;
use crate::Result;

/// Terminal state reached for one resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    SkippedDirectory,
    Created { remote_id: String },
    Updated { remote_id: String },
    Unchanged { remote_id: String },
    /// Dry run: a create would have been issued
    WouldCreate,
    /// Dry run: an update of `remote_id` would have been issued
    WouldUpdate { remote_id: String },
}

impl SyncOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SkippedDirectory => "skipped (directory)",
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Unchanged { .. } => "unchanged",
            Self::WouldCreate => "would create",
            Self::WouldUpdate { .. } => "would update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

/// Outcomes of one `sync` call, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    fn push(&mut self, path: &Path, outcome: SyncOutcome) {
        self.entries.push(SyncEntry {
            path: path.to_path_buf(),
            outcome,
        });
    }

    fn count(&self, predicate: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|outcome| matches!(outcome, SyncOutcome::Created { .. }))
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(|outcome| matches!(outcome, SyncOutcome::Updated { .. }))
    }

    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|outcome| matches!(outcome, SyncOutcome::Unchanged { .. }))
    }

    #[must_use]
    pub fn skipped_directories(&self) -> usize {
        self.count(|outcome| matches!(outcome, SyncOutcome::SkippedDirectory))
    }

    #[must_use]
    pub fn planned(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                SyncOutcome::WouldCreate | SyncOutcome::WouldUpdate { .. }
            )
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub tie_break: TieBreak,
    pub dry_run: bool,
}

pub struct SyncEngine<'a, R: RemoteStore + ?Sized> {
    remote: &'a R,
    options: EngineOptions,
}

impl<'a, R: RemoteStore + ?Sized> SyncEngine<'a, R> {
    pub const fn new(remote: &'a R, options: EngineOptions) -> Self {
        Self { remote, options }
    }

    /// Bring `container` up to date with every path in `local_paths`.
    ///
    /// Paths are processed one at a time; the first error aborts the rest.
    pub async fn sync(
        &self,
        local_paths: &[PathBuf],
        container: &ContainerId,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for path in local_paths {
            let outcome = self.sync_path(path, container).await?;
            report.push(path, outcome);
        }
        Ok(report)
    }

    async fn sync_path(&self, path: &Path, container: &ContainerId) -> Result<SyncOutcome> {
        let local = match LocalEntry::classify(path).await? {
            LocalEntry::Directory(directory) => {
                tracing::info!("Skipping directory {}", directory.display());
                return Ok(SyncOutcome::SkippedDirectory);
            }
            LocalEntry::RegularFile(local) => local,
        };

        tracing::debug!("Checking whether '{}' exists in {}", local.name, container);
        let matches = self.remote.list_matches(&local.name, container).await?;

        let Some(newest) = pick_newest(&matches, self.options.tie_break) else {
            return self.create(&local, container).await;
        };

        if has_changed(&local, newest)? {
            self.update(newest, &local).await
        } else {
            tracing::info!("Unchanged: {} (remote {})", local.path.display(), newest.id);
            Ok(SyncOutcome::Unchanged {
                remote_id: newest.id.clone(),
            })
        }
    }

    async fn create(&self, local: &LocalFileRef, container: &ContainerId) -> Result<SyncOutcome> {
        if self.options.dry_run {
            tracing::info!("Would create '{}' in {}", local.name, container);
            return Ok(SyncOutcome::WouldCreate);
        }

        tracing::info!("Creating '{}' in {}", local.name, container);
        let created = self.remote.create_file(local, container).await?;
        Ok(SyncOutcome::Created {
            remote_id: created.id,
        })
    }

    async fn update(&self, newest: &RemoteFileRecord, local: &LocalFileRef) -> Result<SyncOutcome> {
        if self.options.dry_run {
            tracing::info!("Would update '{}' (remote {})", local.name, newest.id);
            return Ok(SyncOutcome::WouldUpdate {
                remote_id: newest.id.clone(),
            });
        }

        tracing::info!("Updating '{}' (remote {})", local.name, newest.id);
        let updated = self.remote.update_file(&newest.id, local).await?;
        Ok(SyncOutcome::Updated {
            remote_id: updated.id,
        })
    }
}
