//! HTTP transport seam.
//!
//! The store never talks to `reqwest` directly: requests are described as
//! [`ApiRequest`] values and handed to a [`Transport`]. [`HttpTransport`]
//! sends them over the network; the in-memory backend answers them locally.

use async_trait::async_trait;
use motorpool_core::ApiConfig;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Content type of full-entity bodies.
pub const JSON: &str = "application/json";
/// Content type signalling a merge write.
pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// HTTP methods used by the REST contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fetch
    Get,
    /// Create
    Post,
    /// Full replace
    Put,
    /// Merge write
    Patch,
    /// Remove
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-agnostic description of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API origin, e.g. `api/cars/3`
    pub path: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
    /// Content type of `body`
    pub content_type: Option<&'static str>,
}

impl ApiRequest {
    /// Request without query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body with its content type.
    pub fn with_body(mut self, body: Value, content_type: &'static str) -> Self {
        self.body = Some(body);
        self.content_type = Some(content_type);
        self
    }

    /// First value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and decoded JSON body of an API answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON body; `None` for empty bodies
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Response with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Response without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends [`ApiRequest`]s somewhere and returns whatever status came back.
///
/// Non-2xx answers are still `Ok`: mapping statuses to errors is the
/// caller's concern. `Err` means no usable response was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request.
    async fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse>;
}

/// `reqwest`-backed transport against a configured origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client honoring the configured timeout.
    pub fn new(config: &ApiConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL of a relative API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse> {
        let url = self.url(&request.path);
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &url)
            .header(reqwest::header::ACCEPT, JSON);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| StoreError::InvalidRequest(e.to_string()))?;
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, request.content_type.unwrap_or(JSON))
                .body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        debug!(method = %request.method, url = %url, status, "HTTP exchange complete");

        let success = (200..300).contains(&status);
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Some(value),
                Err(e) if success => return Err(StoreError::Decode(e.to_string())),
                // Error pages are not always JSON; the status alone is enough.
                Err(_) => None,
            }
        };

        Ok(ApiResponse { status, body })
    }
}
