//! The HTTP seam. Dispatch operations only build requests; a [`Transport`]
//! performs them.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{header, Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Result, StreamChatError, TransportError};

// =============================================================================
// Request context
// =============================================================================

/// Per-call cancellation and deadline, forwarded to the transport.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: Option<CancellationToken>,
    timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the in-flight request when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort the in-flight request after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Drive `request` to completion unless the caller cancels or the deadline
    /// passes first. Dropping the future aborts the request.
    pub async fn run<F, T>(&self, request: F) -> std::result::Result<T, TransportError>
    where
        F: Future<Output = std::result::Result<T, TransportError>>,
    {
        let guarded = async {
            match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TransportError::Cancelled),
                    result = request => result,
                },
                None => request.await,
            }
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, guarded)
                .await
                .unwrap_or(Err(TransportError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}

// =============================================================================
// Transport trait
// =============================================================================

/// Performs one request/response cycle against the chat API.
///
/// `path` is relative to the API root (e.g. `users/alice/event`) and already
/// percent-escaped. The response body is returned as raw JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn make_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError>;
}

// =============================================================================
// reqwest implementation
// =============================================================================

#[derive(Serialize, Deserialize)]
struct ServerClaims {
    server: bool,
}

/// Server-side [`Transport`] over HTTPS.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: Client,
    api_key: String,
    base_url: String,
    auth_token: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StreamChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: server_token(&config.api_secret)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Sign the `{"server": true}` token the API expects from backend callers.
fn server_token(api_secret: &str) -> Result<String> {
    if api_secret.is_empty() {
        return Err(StreamChatError::Config("API secret is empty".into()));
    }

    encode(
        &Header::default(),
        &ServerClaims { server: true },
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|e| StreamChatError::Config(format!("Failed to sign server token: {}", e)))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn make_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError> {
        let start = Instant::now();

        let mut request = self
            .http_client
            .request(method.clone(), self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .header(header::AUTHORIZATION, &self.auth_token)
            .header("Stream-Auth-Type", "jwt");

        if let Some(body) = &body {
            request = request.json(body);
        }

        let value = ctx
            .run(async {
                let response = request.send().await.map_err(|e| {
                    warn!(error = %e, path, "Stream Chat request failed");
                    if e.is_timeout() {
                        TransportError::DeadlineExceeded
                    } else {
                        TransportError::Network(e.to_string())
                    }
                })?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    warn!(status = %status, error = %message, path, "Stream Chat API error");
                    return Err(TransportError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| TransportError::Parse(e.to_string()))
            })
            .await?;

        debug!(
            method = %method,
            path,
            duration_ms = start.elapsed().as_millis(),
            "Stream Chat request"
        );

        Ok(value)
    }
}
