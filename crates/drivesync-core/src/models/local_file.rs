//! Local file model

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// A local regular file with the attributes needed for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileRef {
    /// Path as resolved from the configured pattern
    pub path: PathBuf,
    /// Base name, used as the remote object name
    pub name: String,
    /// Current size in bytes
    pub size: u64,
    /// Last modification instant in UTC
    pub modified: DateTime<Utc>,
}

impl LocalFileRef {
    /// Capture name, size and modification time from `metadata`.
    fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let name = file_name(path)?;
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            modified,
        })
    }
}

/// A resolved path, tagged by what the engine should do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEntry {
    RegularFile(LocalFileRef),
    /// Directories are never mirrored
    Directory(PathBuf),
}

impl LocalEntry {
    /// Classify a resolved path by following symlinks to their target.
    pub async fn classify(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else {
            Ok(Self::RegularFile(LocalFileRef::from_metadata(
                path, &metadata,
            )?))
        }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::NoFileName(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread")]
    async fn classify_distinguishes_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        std::fs::write(&file_path, b"hello").unwrap();

        match LocalEntry::classify(&file_path).await.unwrap() {
            LocalEntry::RegularFile(file) => {
                assert_eq!(file.name, "notes.txt");
                assert_eq!(file.size, 5);
                assert_eq!(file.path, file_path);
            }
            other => panic!("expected a regular file, got {other:?}"),
        }

        let entry = LocalEntry::classify(dir.path()).await.unwrap();
        assert_eq!(entry, LocalEntry::Directory(dir.path().to_path_buf()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn classify_reports_missing_file_as_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalEntry::classify(dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn file_name_rejects_root() {
        let err = file_name(Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::NoFileName(_)));
    }
}
