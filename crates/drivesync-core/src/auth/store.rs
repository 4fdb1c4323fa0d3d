//! JSON token file persistence.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{AuthError, AuthResult, StoredToken, TokenPersistence};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenPersistence for FileTokenStore {
    fn load_token(&self) -> AuthResult<Option<StoredToken>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AuthError::Storage(format!(
                    "failed to read token at {}: {error}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(error) => {
                // An unreadable token only forces a new consent.
                tracing::warn!(
                    "Ignoring malformed token file {}: {}",
                    self.path.display(),
                    error
                );
                Ok(None)
            }
        }
    }

    fn save_token(&self, token: &StoredToken) -> AuthResult<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                AuthError::Storage(format!(
                    "failed to create token directory {}: {error}",
                    parent.display()
                ))
            })?;
        }

        let serialized = serde_json::to_string_pretty(token)?;
        let write = || -> std::io::Result<()> {
            let mut file = open_owner_only(&self.path)?;
            file.write_all(serialized.as_bytes())?;
            file.sync_all()
        };
        write().map_err(|error| {
            AuthError::Storage(format!(
                "failed to write token at {}: {error}",
                self.path.display()
            ))
        })
    }

    fn clear_token(&self) -> AuthResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AuthError::Storage(format!(
                "failed to remove token at {}: {error}",
                self.path.display()
            ))),
        }
    }

    fn describe(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Open `path` for truncating writes, readable by the owner only.
#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; an existing file keeps its bits.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
