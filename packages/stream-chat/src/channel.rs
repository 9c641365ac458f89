//! Channel handle and channel-scoped dispatch.

use reqwest::Method;
use tracing::debug;

use crate::error::{Result, StreamChatError};
use crate::event::Event;
use crate::transport::RequestContext;
use crate::types::{Response, User};
use crate::{escape, Client, EventRequest};

/// A lightweight handle to one channel. Holds no channel state, only the
/// identifiers needed to build routes.
#[derive(Clone)]
pub struct Channel {
    channel_type: String,
    id: String,
    client: Client,
}

impl Channel {
    pub(crate) fn new(client: Client, channel_type: String, id: String) -> Self {
        Self {
            channel_type,
            id,
            client,
        }
    }

    pub fn channel_type(&self) -> &str {
        &self.channel_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Channel id in `type:id` form.
    pub fn cid(&self) -> String {
        format!("{}:{}", self.channel_type, self.id)
    }

    /// Send an event on this channel on behalf of `user_id`.
    ///
    /// **Side effect:** `event.user` is replaced with `User { id: user_id }`
    /// before sending, whatever it held before. The change stays visible to the
    /// caller after the call returns, including when the request fails.
    ///
    /// Passing `None` fails with `InvalidArgument("event is nil")` and sends
    /// nothing.
    pub async fn send_event(
        &self,
        ctx: &RequestContext,
        event: Option<&mut Event>,
        user_id: &str,
    ) -> Result<Response> {
        let event = event.ok_or_else(|| StreamChatError::invalid_argument("event is nil"))?;

        event.user = Some(User::new(user_id));

        let path = format!(
            "channels/{}/{}/event",
            escape(&self.channel_type),
            escape(&self.id)
        );

        debug!(cid = %self.cid(), event_type = %event.kind, "Sending channel event");

        self.client
            .make_request(ctx, Method::POST, &path, &[], &EventRequest { event: &*event })
            .await
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("type", &self.channel_type)
            .field("id", &self.id)
            .finish()
    }
}
