//! Sync target model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of a remote container (folder).
///
/// Always non-empty. The storage root is addressed explicitly with
/// [`ContainerId::ROOT`] instead of an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerId(String);

impl ContainerId {
    /// Alias the Drive API accepts for the user's root folder
    pub const ROOT: &'static str = "root";

    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Config(format!(
                "destination container must not be empty; use '{}' for the root folder",
                Self::ROOT
            )));
        }
        if trimmed.contains('\'') || trimmed.contains('\\') {
            return Err(Error::Config(format!(
                "destination container '{trimmed}' contains quote or backslash characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContainerId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ContainerId> for String {
    fn from(value: ContainerId) -> Self {
        value.0
    }
}

/// A configured pairing of a glob pattern with a destination container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTarget {
    pub pattern: String,
    pub container: ContainerId,
}

impl SyncTarget {
    pub fn new(pattern: impl Into<String>, container: ContainerId) -> Result<Self> {
        let pattern = pattern.into().trim().to_string();
        if pattern.is_empty() {
            return Err(Error::Config("sync pattern must not be empty".to_string()));
        }
        Ok(Self { pattern, container })
    }
}
