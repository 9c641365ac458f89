//! Client configuration loaded from code or environment variables.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::{Result, StreamChatError};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://chat.stream-io-api.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

/// Credentials and endpoint settings for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `STREAM_KEY` and `STREAM_SECRET` (required), plus the optional
    /// `STREAM_CHAT_URL` and `STREAM_CHAT_TIMEOUT` (seconds).
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_key = env::var("STREAM_KEY")
            .map_err(|_| StreamChatError::Config("STREAM_KEY must be set".into()))?;
        let api_secret = env::var("STREAM_SECRET")
            .map_err(|_| StreamChatError::Config("STREAM_SECRET must be set".into()))?;

        let mut config = Self::new(api_key, api_secret);

        if let Ok(url) = env::var("STREAM_CHAT_URL") {
            config.base_url = url;
        }

        if let Ok(raw) = env::var("STREAM_CHAT_TIMEOUT") {
            let secs: u64 = raw.parse().map_err(|_| {
                StreamChatError::Config(format!(
                    "STREAM_CHAT_TIMEOUT must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set a custom base URL (regional endpoints, proxies, local mocks).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
