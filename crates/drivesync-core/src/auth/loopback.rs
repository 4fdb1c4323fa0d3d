//! Loopback redirect receiver for the installed-app consent flow.

use reqwest::Url;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use super::{AuthError, AuthResult};

const SUCCESS_BODY: &str =
    "The authentication flow has completed. You may close this window.";
const NOT_FOUND_BODY: &str = "Not found.";

pub struct LoopbackListener {
    listener: TcpListener,
    redirect_uri: String,
}

impl LoopbackListener {
    /// Bind an ephemeral port on the IPv4 loopback interface.
    pub async fn bind() -> AuthResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            redirect_uri: format!("http://127.0.0.1:{port}/"),
        })
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Serve requests until one carries an authorization code or an error.
    pub async fn wait_for_code(self, expected_state: &str) -> AuthResult<String> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            if let Some(outcome) = handle_connection(stream, expected_state).await? {
                return outcome;
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    expected_state: &str,
) -> AuthResult<Option<AuthResult<String>>> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // Drain headers so the browser sees a clean response.
    let mut header = String::new();
    loop {
        header.clear();
        let read = reader.read_line(&mut header).await?;
        if read == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let outcome = parse_redirect_request(&request_line, expected_state);
    let (status, body) = match &outcome {
        Some(Ok(_)) => ("200 OK", SUCCESS_BODY.to_string()),
        Some(Err(error)) => ("400 Bad Request", error.to_string()),
        None => ("404 Not Found", NOT_FOUND_BODY.to_string()),
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(outcome)
}

/// Extract the authorization code from an HTTP request line.
///
/// Returns `None` for requests that are not the OAuth redirect (e.g. favicon).
pub(crate) fn parse_redirect_request(
    request_line: &str,
    expected_state: &str,
) -> Option<AuthResult<String>> {
    let target = request_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://127.0.0.1{target}")).ok()?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(AuthError::Api(format!(
            "authorization was not granted: {error}"
        ))));
    }
    let code = code?;
    if state.as_deref() != Some(expected_state) {
        return Some(Err(AuthError::StateMismatch));
    }
    Some(Ok(code))
}
