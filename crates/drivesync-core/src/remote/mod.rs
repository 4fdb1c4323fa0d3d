//! Remote object-storage abstraction.

mod drive;

use async_trait::async_trait;

use crate::models::{ContainerId, LocalFileRef, RemoteFilePage, RemoteFileRecord};
use crate::Result;

pub use drive::{escape_query_literal, DriveClient, DriveConfig};

/// Operations the sync engine needs from a storage backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one page of non-trashed objects named `name` inside `container`.
    async fn list_page(
        &self,
        name: &str,
        container: &ContainerId,
        page_token: Option<&str>,
    ) -> Result<RemoteFilePage>;

    /// Upload `local` as a new object inside `container`.
    async fn create_file(
        &self,
        local: &LocalFileRef,
        container: &ContainerId,
    ) -> Result<RemoteFileRecord>;

    /// Replace the content of object `file_id` with `local`.
    async fn update_file(&self, file_id: &str, local: &LocalFileRef) -> Result<RemoteFileRecord>;

    /// List every match across all pages.
    ///
    /// An empty result means nothing matched; it is not an error.
    async fn list_matches(
        &self,
        name: &str,
        container: &ContainerId,
    ) -> Result<Vec<RemoteFileRecord>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(name, container, page_token.as_deref())
                .await?;
            tracing::debug!(
                "Listed {} record(s) for '{}' in {}",
                page.files.len(),
                name,
                container
            );
            records.extend(page.files);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }
}
