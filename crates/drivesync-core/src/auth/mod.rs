//! OAuth authorization for the Drive API.
//!
//! Tokens live in a JSON token file next to the Google client secrets file.
//! A stored token is reused while it is fresh, refreshed when it has expired,
//! and replaced through the installed-app loopback flow when neither works.

mod loopback;
mod store;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{compact_text, normalize_text_option};

pub use loopback::LoopbackListener;
pub use store::FileTokenStore;

const EXPIRY_SKEW_SECONDS: i64 = 60;
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scope granting access to files created by this application.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Auth HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse auth JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Stored refresh token was rejected: {0}")]
    InvalidGrant(String),
    #[error("Token storage error: {0}")]
    Storage(String),
    #[error("Authorization redirect carried an unexpected state parameter")]
    StateMismatch,
    #[error("No usable token at {}; run `drivesync auth login` first", .0.display())]
    InteractionRequired(PathBuf),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Whether the browser consent flow may run when no usable token exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Allowed,
    Forbidden,
}

/// Bearer token handed to the remote client.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AccessToken([REDACTED])")
    }
}

/// OAuth client registration loaded from a Google `credentials.json`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> AuthResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            AuthError::InvalidConfiguration(format!(
                "failed to read credentials at {}: {error}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> AuthResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(raw)?;
        let secrets = file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidConfiguration(
                "credentials file must contain an 'installed' or 'web' client".to_string(),
            )
        })?;
        secrets.validated()
    }

    fn validated(self) -> AuthResult<Self> {
        let client_id = normalize_text_option(Some(self.client_id)).ok_or_else(|| {
            AuthError::InvalidConfiguration("client_id must not be empty".to_string())
        })?;
        let token_uri = normalize_text_option(Some(self.token_uri))
            .unwrap_or_else(default_token_uri);
        if !token_uri.starts_with("https://") && !token_uri.starts_with("http://") {
            return Err(AuthError::InvalidConfiguration(
                "token_uri must include http:// or https://".to_string(),
            ));
        }
        Ok(Self {
            client_id,
            client_secret: self.client_secret.trim().to_string(),
            auth_uri: normalize_text_option(Some(self.auth_uri)).unwrap_or_else(default_auth_uri),
            token_uri,
        })
    }
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Authorized-user token persisted between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// A token without a recorded expiry is treated as still valid.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry <= now + Duration::seconds(EXPIRY_SKEW_SECONDS))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[must_use]
    pub fn covers(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|scope| self.scopes.contains(scope))
    }

    #[must_use]
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(self.token.clone())
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StoredToken")
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

pub trait TokenPersistence: Clone + Send + Sync + 'static {
    fn load_token(&self) -> AuthResult<Option<StoredToken>>;
    fn save_token(&self, token: &StoredToken) -> AuthResult<()>;
    fn clear_token(&self) -> AuthResult<()>;
    /// Human-readable location, used in messages.
    fn describe(&self) -> PathBuf;
}

#[derive(Clone)]
pub struct OAuthClient<S: TokenPersistence> {
    secrets: ClientSecrets,
    client: Client,
    store: S,
}

impl<S: TokenPersistence> OAuthClient<S> {
    pub fn new(secrets: ClientSecrets, store: S) -> AuthResult<Self> {
        Ok(Self {
            secrets: secrets.validated()?,
            client: Client::builder().build()?,
            store,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Return a token for `scopes`, refreshing or re-consenting as needed.
    pub async fn authorize(
        &self,
        scopes: &[String],
        interaction: Interaction,
    ) -> AuthResult<AccessToken> {
        let restored = match self.restore_token(scopes).await {
            Ok(restored) => restored,
            Err(AuthError::InvalidGrant(message)) if interaction == Interaction::Allowed => {
                tracing::warn!("Stored refresh token was rejected: {}", message);
                None
            }
            Err(error) => return Err(error),
        };
        if let Some(token) = restored {
            return Ok(token.access_token());
        }

        match interaction {
            Interaction::Allowed => Ok(self.authorize_interactive(scopes).await?.access_token()),
            Interaction::Forbidden => Err(AuthError::InteractionRequired(self.store.describe())),
        }
    }

    /// Load the stored token and bring it up to date without user interaction.
    ///
    /// Returns `Ok(None)` when there is no token, it lacks a requested scope,
    /// or it has expired without a refresh token. A failed refresh is an
    /// error; [`AuthError::InvalidGrant`] marks a revoked refresh token.
    pub async fn restore_token(&self, scopes: &[String]) -> AuthResult<Option<StoredToken>> {
        let Some(stored) = self.store.load_token()? else {
            return Ok(None);
        };

        if !stored.covers(scopes) {
            tracing::info!("Stored token does not cover requested scopes");
            return Ok(None);
        }
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        let Some(refresh_token) = stored.refresh_token.clone() else {
            return Ok(None);
        };
        let refreshed = self.refresh_token(&refresh_token, &stored).await?;
        self.store.save_token(&refreshed)?;
        Ok(Some(refreshed))
    }

    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        previous: &StoredToken,
    ) -> AuthResult<StoredToken> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "refresh token must not be empty".to_string(),
            ));
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
        ];
        let response = self.post_token_form(&form).await?;
        Ok(response.into_stored_token(
            &self.secrets,
            &previous.scopes,
            previous.refresh_token.clone(),
        ))
    }

    /// Run the installed-app consent flow and persist the resulting token.
    pub async fn authorize_interactive(&self, scopes: &[String]) -> AuthResult<StoredToken> {
        let listener = LoopbackListener::bind().await?;
        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = self.authorization_url(listener.redirect_uri(), scopes, &state)?;

        println!("Please visit this URL to authorize drivesync:\n\n{url}\n");
        tracing::info!(
            "Waiting for authorization redirect on {}",
            listener.redirect_uri()
        );

        let redirect_uri = listener.redirect_uri().to_string();
        let code = listener.wait_for_code(&state).await?;
        let token = self.exchange_code(&code, &redirect_uri, scopes).await?;
        self.store.save_token(&token)?;
        Ok(token)
    }

    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
    ) -> AuthResult<Url> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|error| AuthError::InvalidConfiguration(format!("invalid auth_uri: {error}")))
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> AuthResult<StoredToken> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
        ];
        let response = self.post_token_form(&form).await?;
        Ok(response.into_stored_token(&self.secrets, scopes, None))
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> AuthResult<TokenResponse> {
        let response = self
            .client
            .post(&self.secrets.token_uri)
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = parse_api_error(status, &body);
            if is_invalid_grant(&body) {
                return Err(AuthError::InvalidGrant(message));
            }
            return Err(AuthError::Api(message));
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

/// Authorize against the token and credentials files named in the config.
pub async fn authorize(
    token_path: &Path,
    credentials_path: &Path,
    scopes: &[String],
    interaction: Interaction,
) -> AuthResult<AccessToken> {
    let store = FileTokenStore::new(token_path);

    // A fresh stored token is enough; the client secrets are only needed to refresh.
    if let Some(stored) = store.load_token()? {
        if stored.covers(scopes) && !stored.is_expired() {
            return Ok(stored.access_token());
        }
    }

    let secrets = ClientSecrets::from_file(credentials_path)?;
    OAuthClient::new(secrets, store)?
        .authorize(scopes, interaction)
        .await
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_stored_token(
        self,
        secrets: &ClientSecrets,
        requested_scopes: &[String],
        previous_refresh_token: Option<String>,
    ) -> StoredToken {
        let scopes = self.scope.as_deref().map_or_else(
            || requested_scopes.to_vec(),
            |granted| granted.split_whitespace().map(ToOwned::to_owned).collect(),
        );
        StoredToken {
            token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
            expiry: self
                .expires_in
                .map(|expires_in| Utc::now() + Duration::seconds(expires_in)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

fn is_invalid_grant(body: &str) -> bool {
    serde_json::from_str::<OAuthErrorResponse>(body)
        .is_ok_and(|payload| payload.error.as_deref() == Some("invalid_grant"))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<OAuthErrorResponse>(body) {
        match (payload.error, payload.error_description) {
            (Some(error), Some(description)) => {
                return format!("{error}: {} ({})", description.trim(), status.as_u16());
            }
            (Some(message), None) | (None, Some(message)) => {
                return format!("{} ({})", message.trim(), status.as_u16());
            }
            (None, None) => {}
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn secrets() -> ClientSecrets {
        ClientSecrets::from_json(
            r#"{"installed": {
                "client_id": " id.apps.googleusercontent.com ",
                "client_secret": "shh",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap()
    }

    fn stored(expiry: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            token: "secret-access".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret-client".to_string(),
            scopes: vec![DRIVE_FILE_SCOPE.to_string()],
            expiry,
        }
    }

    #[test]
    fn client_secrets_accept_installed_and_web_layouts() {
        assert_eq!(secrets().client_id, "id.apps.googleusercontent.com");

        let web = ClientSecrets::from_json(r#"{"web": {"client_id": "w", "client_secret": "s"}}"#)
            .unwrap();
        assert_eq!(web.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(web.auth_uri, DEFAULT_AUTH_URI);
    }

    #[test]
    fn client_secrets_require_a_client_section() {
        let err = ClientSecrets::from_json(r#"{"other": {}}"#).unwrap_err();
        assert!(err.to_string().contains("installed"));
    }

    #[test]
    fn token_expiry_uses_skew() {
        let now = Utc::now();
        assert!(stored(Some(now + Duration::seconds(30))).is_expired_at(now));
        assert!(!stored(Some(now + Duration::seconds(3600))).is_expired_at(now));
        assert!(!stored(None).is_expired_at(now));
    }

    #[test]
    fn token_scope_coverage() {
        let token = stored(None);
        assert!(token.covers(&[DRIVE_FILE_SCOPE.to_string()]));
        assert!(token.covers(&[]));
        assert!(!token.covers(&["https://www.googleapis.com/auth/drive".to_string()]));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?} {:?}", stored(None), secrets());
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(!rendered.contains("secret-client"));
        assert!(!rendered.contains("shh"));
        assert!(rendered.contains("[REDACTED]"));
        assert_eq!(format!("{:?}", AccessToken::new("abc")), "AccessToken([REDACTED])");
    }

    #[test]
    fn authorization_url_requests_offline_access() {
        let client = OAuthClient::new(secrets(), FileTokenStore::new("unused.json")).unwrap();
        let url = client
            .authorization_url(
                "http://127.0.0.1:8080/",
                &[DRIVE_FILE_SCOPE.to_string()],
                "state123",
            )
            .unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "id.apps.googleusercontent.com");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(params["scope"], DRIVE_FILE_SCOPE);
        assert_eq!(params["state"], "state123");
        assert_eq!(params["access_type"], "offline");
    }

    #[test]
    fn refresh_response_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new-access".to_string(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
        };
        let token = response.into_stored_token(
            &secrets(),
            &[DRIVE_FILE_SCOPE.to_string()],
            Some("old-refresh".to_string()),
        );
        assert_eq!(token.token, "new-access");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(token.scopes, vec![DRIVE_FILE_SCOPE.to_string()]);
        assert!(!token.is_expired());
    }

    #[test]
    fn granted_scope_string_overrides_requested_scopes() {
        let response = TokenResponse {
            access_token: "a".to_string(),
            expires_in: None,
            refresh_token: Some("r".to_string()),
            scope: Some(format!("{DRIVE_FILE_SCOPE} openid")),
        };
        let token = response.into_stored_token(&secrets(), &[], None);
        assert_eq!(token.scopes, vec![DRIVE_FILE_SCOPE.to_string(), "openid".to_string()]);
        assert_eq!(token.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn parse_api_error_prefers_oauth_fields() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        );
        assert_eq!(message, "invalid_grant: Token has been expired or revoked. (400)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn authorize_uses_fresh_stored_token_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let store = FileTokenStore::new(&token_path);
        store
            .save_token(&stored(Some(Utc::now() + Duration::hours(1))))
            .unwrap();

        let token = authorize(
            &token_path,
            &dir.path().join("missing-credentials.json"),
            &[DRIVE_FILE_SCOPE.to_string()],
            Interaction::Forbidden,
        )
        .await
        .unwrap();
        assert_eq!(token.secret(), "secret-access");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn authorize_without_token_and_interaction_forbidden_fails() {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = dir.path().join("credentials.json");
        std::fs::write(
            &credentials_path,
            r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#,
        )
        .unwrap();

        let err = authorize(
            &dir.path().join("token.json"),
            &credentials_path,
            &[DRIVE_FILE_SCOPE.to_string()],
            Interaction::Forbidden,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::InteractionRequired(_)));
    }

    fn secrets_with_token_uri(token_uri: &str) -> ClientSecrets {
        ClientSecrets {
            token_uri: token_uri.to_string(),
            ..secrets()
        }
    }

    fn store_with_expired_token(dir: &Path) -> FileTokenStore {
        let store = FileTokenStore::new(dir.join("token.json"));
        store
            .save_token(&stored(Some(Utc::now() - Duration::hours(1))))
            .unwrap();
        store
    }

    /// Answer one token request with `status` and a JSON `body`.
    async fn serve_token_error(status: &str, body: &'static str) -> String {
        use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let token_uri = format!("http://{}/token", listener.local_addr().unwrap());
        let status = status.to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).await.unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut form = vec![0u8; content_length];
            reader.read_exact(&mut form).await.unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        token_uri
    }

    #[tokio::test(flavor = "current_thread")]
    async fn restore_token_propagates_unreachable_token_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_expired_token(dir.path());
        let client =
            OAuthClient::new(secrets_with_token_uri("http://127.0.0.1:1/token"), store).unwrap();

        let err = client
            .restore_token(&[DRIVE_FILE_SCOPE.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Http(_)));

        // Interaction cannot paper over a transport failure.
        let err = client
            .authorize(&[DRIVE_FILE_SCOPE.to_string()], Interaction::Allowed)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Http(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn restore_token_reports_revoked_refresh_token() {
        let token_uri = serve_token_error(
            "400 Bad Request",
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_expired_token(dir.path());
        let client = OAuthClient::new(secrets_with_token_uri(&token_uri), store).unwrap();

        let err = client
            .restore_token(&[DRIVE_FILE_SCOPE.to_string()])
            .await
            .unwrap_err();
        match err {
            AuthError::InvalidGrant(message) => {
                assert_eq!(message, "invalid_grant: Token has been expired or revoked. (400)");
            }
            other => panic!("expected InvalidGrant, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn authorize_forbidden_surfaces_revoked_refresh_token() {
        let token_uri = serve_token_error(
            "400 Bad Request",
            r#"{"error": "invalid_grant", "error_description": "Bad Request"}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_expired_token(dir.path());
        let client = OAuthClient::new(secrets_with_token_uri(&token_uri), store).unwrap();

        let err = client
            .authorize(&[DRIVE_FILE_SCOPE.to_string()], Interaction::Forbidden)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn other_token_endpoint_errors_stay_api_errors() {
        let token_uri = serve_token_error(
            "500 Internal Server Error",
            r#"{"error": "internal_failure"}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_expired_token(dir.path());
        let client = OAuthClient::new(secrets_with_token_uri(&token_uri), store).unwrap();

        let err = client
            .restore_token(&[DRIVE_FILE_SCOPE.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Api(_)));
    }
}
