//! drivesync-core - Core library for drivesync
//!
//! Mirrors local files matched by glob patterns into Google Drive folders:
//! configuration, OAuth authorization, the Drive client, and the
//! create/update/skip decision procedure shared by the CLI.

pub mod auth;
pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod remote;
pub mod resolve;
pub mod sync;
pub mod util;

pub use config::SyncConfig;
pub use driver::{Driver, RunReport, TargetOutcome, TargetReport};
pub use error::{Error, Result};
pub use models::{ContainerId, SyncTarget};
