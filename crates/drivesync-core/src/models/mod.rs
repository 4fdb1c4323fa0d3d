//! Data models for drivesync

mod local_file;
mod remote_file;
mod target;

pub use local_file::{LocalEntry, LocalFileRef};
pub use remote_file::{RemoteFilePage, RemoteFileRecord};
pub use target::{ContainerId, SyncTarget};
