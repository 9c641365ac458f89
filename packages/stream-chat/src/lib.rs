//! Server-side Stream Chat client: events and custom payloads.
//!
//! Entities that accept caller-defined fields (events, users, messages...) are
//! extensible records: a typed schema plus an `extra_data` map, flattened into
//! one JSON object on the wire. See [`extra`] for the codec.
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_chat::{Client, Event, EventType, RequestContext, UserCustomEvent};
//!
//! let client = Client::from_env()?;
//! let ctx = RequestContext::new();
//!
//! // Channel event (event.user is set to "bob" as a side effect)
//! let mut event = Event::new(EventType::TYPING_START);
//! client
//!     .channel("messaging", "general")
//!     .send_event(&ctx, Some(&mut event), "bob")
//!     .await?;
//!
//! // Custom event for every connected client of one user
//! let nudge = UserCustomEvent::new("nudge").with_extra("from", "bob");
//! client.send_user_custom_event(&ctx, "alice", Some(&nudge)).await?;
//! ```
//!
//! # Webhooks
//!
//! ```rust,ignore
//! let event = stream_chat::Event::from_webhook(&body)?;
//! let team = event.extra_data.get("team");
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod extra;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use channel::Channel;
pub use config::ClientConfig;
pub use error::{Result, StreamChatError, TransportError};
pub use event::{Event, EventType, UserCustomEvent};
pub use extra::{ExtensibleRecord, ExtraData};
pub use transport::{HttpTransport, RequestContext, Transport};
pub use types::*;

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Wire envelope for dispatched events: `{"event": ...}`.
#[derive(Serialize)]
pub(crate) struct EventRequest<'a, E> {
    pub event: &'a E,
}

/// Characters left as-is inside a path segment: unreserved characters plus
/// the sub-delimiters that are legal in a segment (`$ & + : = @`).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Percent-encode one path segment. `/`, `?`, `;`, `,`, spaces and non-ASCII
/// bytes are escaped.
pub(crate) fn escape(segment: &str) -> std::borrow::Cow<'_, str> {
    utf8_percent_encode(segment, PATH_SEGMENT).into()
}

/// Top-level client handle. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client backed by [`HttpTransport`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create from environment variables (see [`ClientConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over any transport (proxies, test doubles).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Handle to the channel `channel_type:id`. No request is made.
    pub fn channel(&self, channel_type: impl Into<String>, id: impl Into<String>) -> Channel {
        Channel::new(self.clone(), channel_type.into(), id.into())
    }

    /// Send a custom event to all connected clients of `target_user_id`.
    ///
    /// Fails with `InvalidArgument` before any request when `event` is `None`
    /// or `target_user_id` is empty. The event is not modified.
    pub async fn send_user_custom_event(
        &self,
        ctx: &RequestContext,
        target_user_id: &str,
        event: Option<&UserCustomEvent>,
    ) -> Result<Response> {
        let event = event.ok_or_else(|| StreamChatError::invalid_argument("event is nil"))?;
        if target_user_id.is_empty() {
            return Err(StreamChatError::invalid_argument(
                "targetUserID should not be empty",
            ));
        }

        let path = format!("users/{}/event", escape(target_user_id));

        debug!(target_user_id, event_type = %event.kind, "Sending user custom event");

        self.make_request(ctx, Method::POST, &path, &[], &EventRequest { event })
            .await
    }

    /// Serialize `body`, hand it to the transport, decode the response.
    pub(crate) async fn make_request<B, R>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: &B,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| TransportError::Parse(format!("Failed to serialize request: {}", e)))?;

        let value = self
            .transport
            .make_request(ctx, method, path, query, Some(body))
            .await?;

        serde_json::from_value(value)
            .map_err(|e| TransportError::Parse(format!("Failed to deserialize response: {}", e)).into())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
