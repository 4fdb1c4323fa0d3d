//! Newest-match selection among remote records sharing a name.

use serde::{Deserialize, Serialize};

use crate::models::RemoteFileRecord;

/// How to choose among records that share the newest modification instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First such record in listing order
    #[default]
    First,
    /// Last such record in listing order
    Last,
    /// Record with the lexicographically smallest identifier
    SmallestId,
}

/// Pick the most recently modified record, or `None` for an empty listing.
///
/// Listing order carries no meaning, so ties on the maximum instant are
/// settled by `tie_break` rather than by position alone.
pub fn pick_newest(
    records: &[RemoteFileRecord],
    tie_break: TieBreak,
) -> Option<&RemoteFileRecord> {
    let newest = records.iter().map(|record| record.modified_time).max()?;
    let mut candidates = records
        .iter()
        .filter(|record| record.modified_time == newest);

    match tie_break {
        TieBreak::First => candidates.next(),
        TieBreak::Last => candidates.last(),
        TieBreak::SmallestId => candidates.min_by(|left, right| left.id.cmp(&right.id)),
    }
}
