//! Staleness check between a local file and its newest remote record.

use crate::models::{LocalFileRef, RemoteFileRecord};
use crate::{Error, Result};

/// Decide whether `remote` is stale relative to `local`.
///
/// A size difference always counts as a change. With equal sizes the local
/// copy must be strictly newer; equal or older timestamps mean unchanged.
/// A remote record without a size is rejected, since listings always ask
/// for it.
pub fn has_changed(local: &LocalFileRef, remote: &RemoteFileRecord) -> Result<bool> {
    let remote_size = remote
        .size
        .ok_or_else(|| Error::MissingRemoteSize(remote.id.clone()))?;

    if remote_size != local.size {
        return Ok(true);
    }

    Ok(local.modified > remote.modified_time)
}
