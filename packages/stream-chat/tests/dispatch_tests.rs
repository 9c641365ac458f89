//! End-to-end dispatch through a custom transport: envelopes, routes,
//! guards and cancellation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use stream_chat::{
    Client, Event, EventType, RequestContext, StreamChatError, Transport, TransportError, User,
    UserCustomEvent,
};
use tokio_util::sync::CancellationToken;

/// Arguments captured from a transport call
#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    body: Value,
}

/// Records calls; optionally stalls until the context gives up.
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    stall: bool,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            stall: false,
        })
    }

    fn stalling() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            stall: true,
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn make_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        _query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.unwrap_or(Value::Null),
        });

        let stall = self.stall;
        ctx.run(async move {
            if stall {
                std::future::pending::<()>().await;
            }
            Ok(json!({ "duration": "0.10ms", "echo": true }))
        })
        .await
    }
}

#[tokio::test]
async fn channel_event_is_wrapped_and_routed() {
    let transport = RecordingTransport::new();
    let client = Client::with_transport(transport.clone());

    let mut event = Event::new(EventType::MESSAGE_NEW).with_extra("type", "bogus");
    event.user = Some(User::new("alice"));
    event.extra_data.insert("custom_field".into(), json!({ "nested": [1, 2] }));

    let response = client
        .channel("messaging", "general/team")
        .send_event(&RequestContext::new(), Some(&mut event), "bob")
        .await
        .unwrap();

    assert_eq!(response.duration.as_deref(), Some("0.10ms"));
    assert_eq!(response.extra_data["echo"], true);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].path, "channels/messaging/general%2Fteam/event");
    assert_eq!(
        calls[0].body,
        json!({
            "event": {
                "type": "message.new",
                "user": { "id": "bob" },
                "custom_field": { "nested": [1, 2] }
            }
        })
    );

    // the caller sees the overwrite too
    assert_eq!(event.user.unwrap().id, "bob");
}

#[tokio::test]
async fn transmitted_event_decodes_back_to_the_sent_value() {
    let transport = RecordingTransport::new();
    let client = Client::with_transport(transport.clone());

    let mut event = Event::new("some.future.event")
        .with_extra("score", 10)
        .with_extra("labels", json!(["a", "b"]));

    client
        .channel("team", "room")
        .send_event(&RequestContext::new(), Some(&mut event), "carol")
        .await
        .unwrap();

    let body = transport.calls().remove(0).body;
    let decoded: Event = serde_json::from_value(body["event"].clone()).unwrap();

    assert_eq!(decoded, event);
    assert_eq!(decoded.kind.as_str(), "some.future.event");
}

#[tokio::test]
async fn guards_fire_before_any_request() {
    let transport = RecordingTransport::new();
    let client = Client::with_transport(transport.clone());
    let ctx = RequestContext::new();

    let err = client
        .channel("messaging", "general")
        .send_event(&ctx, None, "bob")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "event is nil");

    let err = client
        .send_user_custom_event(&ctx, "", Some(&UserCustomEvent::new("nudge")))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamChatError::InvalidArgument(_)));
    assert_eq!(err.to_string(), "targetUserID should not be empty");

    let err = client
        .send_user_custom_event(&ctx, "alice", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "event is nil");

    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn user_custom_event_is_wrapped_and_routed() {
    let transport = RecordingTransport::new();
    let client = Client::with_transport(transport.clone());
    let event = UserCustomEvent::new("friendship_request").with_extra("text", "hi");

    client
        .send_user_custom_event(&RequestContext::new(), "user/42", Some(&event))
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].path, "users/user%2F42/event");
    assert_eq!(
        calls[0].body,
        json!({ "event": { "type": "friendship_request", "text": "hi" } })
    );
}

#[tokio::test]
async fn cancellation_is_surfaced_as_transport_error() {
    let transport = RecordingTransport::stalling();
    let client = Client::with_transport(transport.clone());

    let token = CancellationToken::new();
    let ctx = RequestContext::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    let err = client
        .send_user_custom_event(&ctx, "alice", Some(&UserCustomEvent::new("nudge")))
        .await
        .unwrap_err();

    canceller.await.unwrap();
    assert!(matches!(err, StreamChatError::Transport(TransportError::Cancelled)));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_is_surfaced_as_transport_error() {
    let transport = RecordingTransport::stalling();
    let client = Client::with_transport(transport);
    let ctx = RequestContext::new().with_timeout(Duration::from_secs(2));

    let mut event = Event::new(EventType::TYPING_STOP);
    let err = client
        .channel("messaging", "general")
        .send_event(&ctx, Some(&mut event), "bob")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StreamChatError::Transport(TransportError::DeadlineExceeded)
    ));
}
