//! Sync decisions: newest-match selection, change detection and the engine
//! that turns them into create/update/skip actions.

mod change;
mod engine;
mod select;

pub use change::has_changed;
pub use engine::{EngineOptions, SyncEngine, SyncEntry, SyncOutcome, SyncReport};
pub use select::{pick_newest, TieBreak};
