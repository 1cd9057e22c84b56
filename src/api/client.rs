use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::models::{
    LoginEnvelope, LoginGrant, Platform, StatusEnvelope, SummarizeEnvelope, SummarizeRequest,
    TaskInfo, ValidateEnvelope, ValidationResult,
};
use super::SummarizerApi;
use crate::session::SessionStorage;

/// HTTP client for the summarization backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStorage,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ValidateBody<'a> {
    url: &'a str,
    platform: Platform,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStorage) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Attach the bearer token when logged in. Requests with a JSON body
    /// already carry the content type from `.json()`.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Download raw bytes from an absolute URL, such as a summary thumbnail.
    /// Non-2xx answers are errors.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Send and decode the JSON envelope whatever the HTTP status.
    /// Returns whether the status was 2xx alongside the body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<(bool, T), ApiError> {
        let resp = self
            .authorize(request)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP request failed: {e}"))?;

        let status = resp.status();
        let text = resp.text().await?;
        let body = serde_json::from_str::<T>(&text).map_err(|e| {
            log::warn!("Undecodable response ({status}): {e}");
            ApiError::Decode {
                status: status.as_u16(),
                message: text,
            }
        })?;
        Ok((status.is_success(), body))
    }
}

impl SummarizerApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginBody { username, password });
        let (ok, body) = self.send::<LoginEnvelope>(request).await?;

        match (ok && body.success, body.user) {
            (true, Some(user)) => Ok(LoginGrant {
                token: body.token,
                user,
            }),
            _ => Err(ApiError::Rejected(
                body.error.unwrap_or_else(|| "Login failed".into()),
            )),
        }
    }

    async fn validate(&self, url: &str, platform: Platform) -> Result<ValidationResult, ApiError> {
        let request = self
            .client
            .post(self.url("/api/validate"))
            .json(&ValidateBody { url, platform });
        let (_, body) = self.send::<ValidateEnvelope>(request).await?;

        Ok(ValidationResult {
            valid: body.success,
            error: body.error,
            data: body.data,
        })
    }

    async fn summarize(&self, request: &SummarizeRequest) -> Result<String, ApiError> {
        let http = self.client.post(self.url("/api/summarize")).json(request);
        let (_, body) = self.send::<SummarizeEnvelope>(http).await?;

        match body.task_id.as_ref() {
            Some(task_id) if body.success => Ok(task_id.clone()),
            _ => Err(ApiError::Rejected(body.reason().unwrap_or_else(|| {
                "Failed to submit summarization request".into()
            }))),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskInfo, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/api/status/{task_id}")))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let (_, body) = self.send::<StatusEnvelope>(request).await?;

        match body.task {
            Some(task) if body.success => Ok(task),
            _ => Err(ApiError::Rejected(
                body.error
                    .unwrap_or_else(|| "Failed to fetch task status".into()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::User;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer one HTTP request with `status` and `body`; the handle yields the
    /// raw request text.
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (base, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Client that never routes loopback traffic through a configured proxy.
    fn local_client(base: impl Into<String>, session: SessionStorage) -> ApiClient {
        ApiClient {
            client: Client::builder().no_proxy().build().unwrap(),
            ..ApiClient::new(base, session)
        }
    }

    fn json_content_types(request: &str) -> usize {
        request
            .to_ascii_lowercase()
            .matches("content-type: application/json")
            .count()
    }

    #[tokio::test]
    async fn login_posts_credentials_as_json() {
        let (base, server) = serve_once(
            200,
            r#"{"success":true,"token":"jwt-1","user":{"username":"ana","role":"admin"}}"#,
        )
        .await;
        let client = local_client(format!("{base}/"), SessionStorage::new());

        let grant = client.login("ana", "pw").await.unwrap();
        assert_eq!(grant.token.as_deref(), Some("jwt-1"));
        assert_eq!(
            grant.user,
            User {
                username: "ana".into(),
                role: "admin".into(),
            }
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/login HTTP/1.1"), "{request}");
        assert_eq!(json_content_types(&request), 1, "{request}");
        assert!(!request.to_ascii_lowercase().contains("authorization:"), "{request}");
        assert!(request.contains(r#""username":"ana""#), "{request}");
        assert!(request.contains(r#""password":"pw""#), "{request}");
    }

    #[tokio::test]
    async fn status_request_carries_bearer_token() {
        let (base, server) = serve_once(
            200,
            r#"{"success":true,"task":{"task_id":"abc","status":"downloading","progress":20,"message":"Fetching","created_at":0,"updated_at":1}}"#,
        )
        .await;
        let session = SessionStorage::new();
        session.set_token("jwt-1");
        let client = local_client(base, session);

        let task = client.task_status("abc").await.unwrap();
        assert_eq!(task.task_id, "abc");
        assert_eq!(task.message, "Fetching");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/status/abc HTTP/1.1"), "{request}");
        assert_eq!(json_content_types(&request), 1, "{request}");
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: bearer jwt-1"),
            "{request}"
        );
    }

    #[tokio::test]
    async fn rejected_login_keeps_server_error() {
        let (base, _server) =
            serve_once(401, r#"{"success":false,"error":"Invalid credentials"}"#).await;
        let client = local_client(base, SessionStorage::new());

        let err = client.login("ana", "bad").await.unwrap_err();
        assert!(matches!(&err, ApiError::Rejected(msg) if msg == "Invalid credentials"), "{err:?}");
    }

    #[tokio::test]
    async fn non_success_status_rejects_login_even_with_user() {
        let (base, _server) = serve_once(
            500,
            r#"{"success":true,"user":{"username":"ana","role":"admin"}}"#,
        )
        .await;
        let client = local_client(base, SessionStorage::new());

        let err = client.login("ana", "pw").await.unwrap_err();
        assert!(matches!(&err, ApiError::Rejected(msg) if msg == "Login failed"), "{err:?}");
    }

    #[tokio::test]
    async fn validation_body_is_read_on_error_status() {
        let (base, server) =
            serve_once(400, r#"{"success":false,"error":"Unsupported URL"}"#).await;
        let client = local_client(base, SessionStorage::new());

        let result = client
            .validate("https://example.com/x", Platform::Rss)
            .await
            .unwrap();
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Unsupported URL"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/validate HTTP/1.1"), "{request}");
        assert!(request.contains(r#""platform":"rss""#), "{request}");
    }

    #[tokio::test]
    async fn summarize_rejection_joins_error_list() {
        let (base, _server) = serve_once(
            422,
            r#"{"success":false,"errors":["source_url is required",{"msg":"bad detail"}]}"#,
        )
        .await;
        let client = local_client(base, SessionStorage::new());
        let request = SummarizeRequest {
            source_url: String::new(),
            episode_name: None,
            detail_level: 0.5,
            platform: Platform::Youtube,
        };

        let err = client.summarize(&request).await.unwrap_err();
        assert!(
            matches!(&err, ApiError::Rejected(msg) if msg == "source_url is required; bad detail"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let (base, _server) = serve_once(502, "<html>Bad Gateway</html>").await;
        let client = local_client(base, SessionStorage::new());

        let err = client.task_status("abc").await.unwrap_err();
        assert!(
            matches!(&err, ApiError::Decode { status: 502, message } if message.contains("Bad Gateway")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn fetch_bytes_returns_body_or_status_error() {
        let (base, _server) = serve_once(200, "\u{89}PNG-data").await;
        let client = local_client(base.clone(), SessionStorage::new());
        let bytes = client.fetch_bytes(&format!("{base}/thumb.png")).await.unwrap();
        assert_eq!(bytes, "\u{89}PNG-data".as_bytes());

        let (base, _server) = serve_once(404, "{}").await;
        let err = client.fetch_bytes(&format!("{base}/missing.png")).await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)), "{err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = local_client(base, SessionStorage::new());

        let err = client.task_status("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)), "{err:?}");
        assert_eq!(err.user_message("Network error"), "Network error");
    }
}
