//! Google Drive v3 REST client.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::RemoteStore;
use crate::auth::AccessToken;
use crate::models::{ContainerId, LocalFileRef, RemoteFilePage, RemoteFileRecord};
use crate::util::compact_text;
use crate::{Error, Result};

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
const RECORD_FIELDS: &str = "id,name,size,modifiedTime";
const PAGE_SIZE: &str = "100";

/// Endpoints used by [`DriveClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    pub api_base_url: String,
    pub upload_base_url: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
        }
    }
}

impl DriveConfig {
    /// Point both endpoints at one base URL (test servers, proxies).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(Error::Config(
                "Drive base URL must include http:// or https://".to_string(),
            ));
        }
        Ok(Self {
            api_base_url: format!("{base}/drive/v3"),
            upload_base_url: format!("{base}/upload/drive/v3"),
        })
    }
}

/// Authorized Drive handle; read-only after construction.
#[derive(Clone)]
pub struct DriveClient {
    config: DriveConfig,
    token: AccessToken,
    client: Client,
}

impl DriveClient {
    pub fn new(token: AccessToken) -> Result<Self> {
        Self::with_config(token, DriveConfig::default())
    }

    pub fn with_config(token: AccessToken, config: DriveConfig) -> Result<Self> {
        Ok(Self {
            config,
            token,
            client: Client::builder().build()?,
        })
    }

    fn files_url(&self) -> Result<Url> {
        parse_url(&format!("{}/files", self.config.api_base_url))
    }

    fn upload_url(&self, file_id: Option<&str>) -> Result<Url> {
        let mut url = parse_url(&format!("{}/files", self.config.upload_base_url))?;
        if let Some(file_id) = file_id {
            url.path_segments_mut()
                .map_err(|()| Error::Config("Drive upload URL cannot be a base".to_string()))?
                .push(file_id);
        }
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", RECORD_FIELDS);
        Ok(url)
    }

    async fn multipart_body(
        local: &LocalFileRef,
        metadata: &serde_json::Value,
    ) -> Result<MultipartRelated> {
        let content = tokio::fs::read(&local.path).await?;
        let mime = mime_guess::from_path(&local.path).first_or_octet_stream();
        Ok(MultipartRelated::new(metadata, mime.essence_str(), &content))
    }

    async fn send_upload(
        &self,
        request: reqwest::RequestBuilder,
        body: MultipartRelated,
        operation: &str,
        target: &str,
    ) -> Result<RemoteFileRecord> {
        let response = request
            .bearer_auth(self.token.secret())
            .header(CONTENT_TYPE, body.content_type())
            .body(body.into_bytes())
            .send()
            .await?;
        read_json(response, operation, target).await
    }
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list_page(
        &self,
        name: &str,
        container: &ContainerId,
        page_token: Option<&str>,
    ) -> Result<RemoteFilePage> {
        let query = build_list_query(name, container);
        let fields = format!("nextPageToken,files({RECORD_FIELDS})");
        let mut request = self
            .client
            .get(self.files_url()?)
            .bearer_auth(self.token.secret())
            .query(&[
                ("q", query.as_str()),
                ("spaces", "drive"),
                ("fields", fields.as_str()),
                ("pageSize", PAGE_SIZE),
            ]);
        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }

        let response = request.send().await?;
        read_json(response, "files.list", name).await
    }

    async fn create_file(
        &self,
        local: &LocalFileRef,
        container: &ContainerId,
    ) -> Result<RemoteFileRecord> {
        let metadata = serde_json::json!({
            "name": local.name,
            "parents": [container.as_str()],
        });
        let body = Self::multipart_body(local, &metadata).await?;
        let request = self.client.post(self.upload_url(None)?);
        self.send_upload(request, body, "files.create", &local.name)
            .await
    }

    async fn update_file(&self, file_id: &str, local: &LocalFileRef) -> Result<RemoteFileRecord> {
        if file_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "remote file id must not be empty".to_string(),
            ));
        }
        let metadata = serde_json::json!({ "name": local.name });
        let body = Self::multipart_body(local, &metadata).await?;
        let request = self.client.patch(self.upload_url(Some(file_id))?);
        self.send_upload(request, body, "files.update", file_id)
            .await
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '\'' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn build_list_query(name: &str, container: &ContainerId) -> String {
    format!(
        "name = '{}' and trashed = false and '{}' in parents",
        escape_query_literal(name),
        escape_query_literal(container.as_str())
    )
}

/// `multipart/related` payload carrying JSON metadata followed by file media.
struct MultipartRelated {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartRelated {
    fn new(metadata: &serde_json::Value, media_type: &str, content: &[u8]) -> Self {
        let boundary = format!("drivesync-{}", uuid::Uuid::new_v4().simple());
        let mut bytes = Vec::with_capacity(content.len() + 512);
        bytes.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(
            format!("--{boundary}\r\nContent-Type: {media_type}\r\n\r\n").as_bytes(),
        );
        bytes.extend_from_slice(content);
        bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, bytes }
    }

    fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation: &str,
    target: &str,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Remote(format!(
            "Drive {operation} failed for '{target}': {}",
            parse_api_error(status, &body)
        )));
    }
    Ok(response.json::<T>().await?)
}

#[derive(Debug, Deserialize)]
struct DriveErrorResponse {
    error: Option<DriveErrorBody>,
}

#[derive(Debug, Deserialize)]
struct DriveErrorBody {
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<DriveErrorResponse>(body) {
        if let Some(message) = payload.error.and_then(|error| error.message) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|error| Error::Config(format!("invalid Drive URL '{raw}': {error}")))
}
