//! [`HttpClient`]: an authenticated, retrying, rate-limited JSON client
//! bound to a single n8n-compatible server.

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use transfer_shr::redact::mask_tail;
use transfer_spec::{HttpUrl, Workflow};

use super::rate_limiter::RateLimiter;

/// Construction-time and per-request defaults.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_REQUESTS_PER_SECOND: usize = 10;

/// Options accepted by [`HttpClient::new`]; every field defaults to the
/// `DEFAULT_*` constant of the same purpose.
#[derive(Clone, Debug)]
pub struct HttpClientOptions {
    pub max_retries: u32,
    pub timeout: Duration,
    pub max_requests_per_second: usize,
}
impl Default for HttpClientOptions {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES, timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS), max_requests_per_second: DEFAULT_MAX_REQUESTS_PER_SECOND }
    }
}

/// Request/response counters exposed by [`HttpClient::stats`].
#[derive(Debug, Default)]
struct Counters {
    total_requests: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    rate_limited: AtomicU64,
}

/// A point-in-time snapshot of an [`HttpClient`]'s counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HttpClientStats {
    pub total_requests: u64,
    pub successful: u64,
    pub failed: u64,
    pub retried: u64,
    pub rate_limited: u64,
}

/// An authenticated JSON client bound to one server.
///
/// Owns a single pooled `reqwest::Client` (one connector, reused across
/// every request this instance issues) and a [`RateLimiter`] gating the
/// outbound rate. Two independent instances (SOURCE, TARGET) never share
/// rate-limit or retry state.
pub struct HttpClient {
    base_url: HttpUrl,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    timeout: Duration,
    rate_limiter: RateLimiter,
    counters: Counters,
}
impl HttpClient {
    /// Constructs a client bound to `base_url`, authenticating with
    /// `api_key`.
    ///
    /// # Errors
    /// Returns [`HttpClientError::EmptyApiKey`] if `api_key` is blank, or
    /// [`HttpClientError::Transport`] if the underlying connector fails to
    /// build. A malformed `base_url` cannot reach this constructor: callers
    /// are expected to pass an already-validated [`HttpUrl`].
    pub fn new(base_url: HttpUrl, api_key: impl Into<String>, options: HttpClientOptions) -> Result<Self, HttpClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HttpClientError::EmptyApiKey);
        }
        let client = reqwest::Client::builder().build().map_err(HttpClientError::Transport)?;
        Ok(Self {
            base_url,
            api_key,
            client,
            max_retries: options.max_retries.max(1),
            timeout: options.timeout,
            rate_limiter: RateLimiter::new(options.max_requests_per_second),
            counters: Counters::default(),
        })
    }

    /// Fetches every workflow visible to this server.
    ///
    /// Unwraps a `{"data": [...]}` envelope if present, otherwise decodes
    /// the top-level body as a workflow array directly.
    pub async fn get_workflows(&self) -> Result<Vec<Workflow>, HttpClientError> {
        let body = self.request(Method::GET, "/api/v1/workflows", None::<&Value>).await?;
        let array = match body {
            Some(Value::Object(mut map)) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Array(Vec::new())),
            Some(other) => other,
            None => Value::Array(Vec::new()),
        };
        serde_json::from_value(array).map_err(HttpClientError::Decode)
    }

    /// Fetches one workflow by id.
    ///
    /// # Errors
    /// [`HttpClientError::NotFound`] on a 404 response.
    pub async fn get_workflow(&self, id: &str) -> Result<Workflow, HttpClientError> {
        let path = format!("/api/v1/workflows/{id}");
        let body = self.request(Method::GET, &path, None::<&Value>).await?;
        let value = body.ok_or_else(|| HttpClientError::Decode(empty_body_error()))?;
        serde_json::from_value(value).map_err(HttpClientError::Decode)
    }

    /// Creates `workflow` on this server, returning the server's copy
    /// (including its assigned `id`).
    ///
    /// # Errors
    /// [`HttpClientError::InvalidWorkflow`] if `workflow` has an empty name
    /// or no nodes; the request is never sent in that case.
    pub async fn create_workflow(&self, workflow: &Workflow) -> Result<Workflow, HttpClientError> {
        if !workflow.is_creatable() {
            return Err(HttpClientError::InvalidWorkflow);
        }
        let body = self.request(Method::POST, "/api/v1/workflows", Some(workflow)).await?;
        let value = body.ok_or_else(|| HttpClientError::Decode(empty_body_error()))?;
        serde_json::from_value(value).map_err(HttpClientError::Decode)
    }

    /// Probes reachability by calling the list endpoint, classifying
    /// low-level failures into a human suggestion.
    pub async fn test_connection(&self) -> ConnectionTestResult {
        match self.get_workflows().await {
            Ok(_) => ConnectionTestResult { success: true, message: Some("connected".to_string()), error: None, suggestion: None },
            Err(err) => {
                let suggestion = match &err {
                    HttpClientError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN => {
                        "verify the configured API key"
                    },
                    HttpClientError::Timeout => "check network connectivity or increase the timeout",
                    HttpClientError::Transport(_) => "verify the server URL is correct and reachable",
                    _ => "inspect the error for details",
                };
                ConnectionTestResult { success: false, message: None, error: Some(err.to_string()), suggestion: Some(suggestion.to_string()) }
            },
        }
    }

    /// Returns a snapshot of this client's counters.
    #[must_use]
    pub fn stats(&self) -> HttpClientStats {
        HttpClientStats {
            total_requests: self.counters.total_requests.load(Ordering::Relaxed),
            successful: self.counters.successful.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            retried: self.counters.retried.load(Ordering::Relaxed),
            rate_limited: self.counters.rate_limited.load(Ordering::Relaxed),
        }
    }

    /// Resets every counter to zero.
    pub fn reset_stats(&self) {
        self.counters.total_requests.store(0, Ordering::Relaxed);
        self.counters.successful.store(0, Ordering::Relaxed);
        self.counters.failed.store(0, Ordering::Relaxed);
        self.counters.retried.store(0, Ordering::Relaxed);
        self.counters.rate_limited.store(0, Ordering::Relaxed);
    }

    async fn request<B: serde::Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<Value>, HttpClientError> {
        let url = self.base_url.join(path);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if self.rate_limiter.acquire().await {
                self.counters.rate_limited.fetch_add(1, Ordering::Relaxed);
            }
            self.counters.total_requests.fetch_add(1, Ordering::Relaxed);

            debug!("{method} {path} (attempt {attempt}/{}) key=...{}", self.max_retries, mask_tail(&self.api_key));

            let mut req = self.client.request(method.clone(), url.clone()).timeout(self.timeout).header("X-N8N-API-KEY", &self.api_key).header("Accept", "application/json");
            if let Some(body) = body {
                req = req.json(body);
            }

            let outcome = req.send().await;
            match self.classify_attempt(outcome).await {
                Ok(value) => {
                    self.counters.successful.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                },
                Err(Retry::No(err)) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    return Err(err);
                },
                Err(Retry::Yes(err)) => {
                    if attempt >= self.max_retries {
                        self.counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                    self.counters.retried.fetch_add(1, Ordering::Relaxed);
                    let wait = Duration::from_millis(1000 * 2u64.pow(attempt - 1));
                    warn!("{method} {path} failed (attempt {attempt}/{}): {err}; retrying in {}ms", self.max_retries, wait.as_millis());
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }

    async fn classify_attempt(&self, outcome: Result<reqwest::Response, reqwest::Error>) -> Result<Option<Value>, Retry> {
        let resp = match outcome {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => return Err(Retry::Yes(HttpClientError::Timeout)),
            Err(err) if err.is_connect() => return Err(Retry::Yes(HttpClientError::Transport(err))),
            Err(err) => return Err(Retry::No(HttpClientError::Transport(err))),
        };

        let status = resp.status();
        if status.is_success() {
            let bytes = resp.bytes().await.map_err(|err| Retry::No(HttpClientError::Transport(err)))?;
            if bytes.is_empty() {
                return Ok(None);
            }
            return serde_json::from_slice(&bytes).map(Some).map_err(|err| Retry::No(HttpClientError::Decode(err)));
        }

        let retryable = status.as_u16() == 429 || (500..600).contains(&status.as_u16());
        let raw_body = resp.text().await.unwrap_or_default();
        let err = if status == StatusCode::NOT_FOUND {
            HttpClientError::NotFound
        } else {
            HttpClientError::Status { status, body: raw_body }
        };
        if retryable {
            Err(Retry::Yes(err))
        } else {
            Err(Retry::No(err))
        }
    }
}

enum Retry {
    Yes(HttpClientError),
    No(HttpClientError),
}

fn empty_body_error() -> serde_json::Error { serde_json::from_str::<Value>("").unwrap_err() }

/// The outcome of [`HttpClient::test_connection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub suggestion: Option<String>,
}

/// Errors raised while constructing or using an [`HttpClient`].
#[derive(Debug)]
pub enum HttpClientError {
    /// Construction was attempted with a blank API key.
    EmptyApiKey,
    /// A `createWorkflow` call was attempted with a workflow missing a
    /// name or any nodes; rejected before a request was sent.
    InvalidWorkflow,
    /// The requested resource does not exist on the server (404).
    NotFound,
    /// A non-2xx, non-404 response; carries the raw status and body.
    Status { status: StatusCode, body: String },
    /// The per-attempt timeout elapsed.
    Timeout,
    /// A transport-level failure (connect, TLS, DNS, or body I/O).
    Transport(reqwest::Error),
    /// The response body did not decode as the expected JSON shape.
    Decode(serde_json::Error),
}
impl Display for HttpClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::EmptyApiKey => write!(f, "API key must not be empty"),
            Self::InvalidWorkflow => write!(f, "workflow must have a non-empty name and at least one node"),
            Self::NotFound => write!(f, "resource not found"),
            Self::Status { status, body } => write!(f, "server responded {status}: {}", truncate(body, 200)),
            Self::Timeout => write!(f, "request timed out"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Decode(err) => write!(f, "failed to decode response body: {err}"),
        }
    }
}
impl error::Error for HttpClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use transfer_spec::{Node, Workflow};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> HttpClient {
        let base = HttpUrl::parse(server.uri()).unwrap();
        HttpClient::new(base, "n8n_api_testkey", HttpClientOptions::default()).unwrap()
    }

    #[test]
    fn rejects_empty_api_key() {
        let base = HttpUrl::parse("http://localhost:5678").unwrap();
        assert!(matches!(HttpClient::new(base, "", HttpClientOptions::default()), Err(HttpClientError::EmptyApiKey)));
    }

    #[tokio::test]
    async fn unwraps_data_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .and(header("X-N8N-API-KEY", "n8n_api_testkey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let workflows = client.get_workflows().await.unwrap();
        assert!(workflows.is_empty());
        assert_eq!(client.stats().total_requests, 1);
        assert_eq!(client.stats().successful, 1);
    }

    #[tokio::test]
    async fn get_workflow_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/api/v1/workflows/missing")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let client = client_for(&server);
        let err = client.get_workflow("missing").await.unwrap_err();
        assert!(matches!(err, HttpClientError::NotFound));
    }

    #[tokio::test]
    async fn retries_on_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get_workflows().await;
        assert!(result.is_ok());
        assert_eq!(client.stats().retried, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn counts_requests_delayed_by_the_rate_limiter() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/api/v1/workflows")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] }))).mount(&server).await;

        let base = HttpUrl::parse(server.uri()).unwrap();
        let client = HttpClient::new(base, "n8n_api_testkey", HttpClientOptions { max_requests_per_second: 1, ..HttpClientOptions::default() }).unwrap();

        client.get_workflows().await.unwrap();
        client.get_workflows().await.unwrap();

        assert_eq!(client.stats().total_requests, 2);
        assert_eq!(client.stats().rate_limited, 1);
    }

    #[tokio::test]
    async fn rejects_uncreatable_workflow_without_a_request() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let workflow = Workflow { name: String::new(), nodes: vec![], ..Workflow::default() };
        let err = client.create_workflow(&workflow).await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidWorkflow));
        assert_eq!(client.stats().total_requests, 0);
    }

    #[tokio::test]
    async fn creates_workflow_with_at_least_one_node() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/workflows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "created-1", "name": "hello", "nodes": [], "connections": {}, "tags": [], "active": false, "settings": {}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let start_node = Node {
            id: "n1".into(),
            name: "start".into(),
            node_type: "n8n-nodes-base.noOp".into(),
            type_version: 1.0,
            position: (0.0, 0.0),
            parameters: serde_json::Value::Null,
            credentials: None,
        };
        let workflow = Workflow { name: "hello".into(), nodes: vec![start_node], ..Workflow::default() };
        let created = client.create_workflow(&workflow).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("created-1"));
    }
}
