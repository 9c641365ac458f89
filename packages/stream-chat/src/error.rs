//! Error types for the Stream Chat client.

use thiserror::Error;

/// Result type for Stream Chat client operations.
pub type Result<T> = std::result::Result<T, StreamChatError>;

/// Stream Chat client errors.
#[derive(Debug, Error)]
pub enum StreamChatError {
    /// Caller passed something unusable. Raised before any request is built.
    #[error("{0}")]
    InvalidArgument(String),

    /// Inbound document is not a flat JSON object matching the record schema
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Configuration error (missing credentials, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything the transport returned, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl StreamChatError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Errors produced by a [`Transport`](crate::Transport) round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error (connection failed, timeout at the socket level)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (response body was not the expected JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The caller's cancellation token fired before the response arrived
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the response arrived
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}
