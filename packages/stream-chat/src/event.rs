//! Chat events: the channel-scoped [`Event`] and the user-scoped [`UserCustomEvent`].
//!
//! Both are extensible records, so caller-defined fields travel alongside the
//! fixed schema in the same flat JSON object.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::extra::{self, extensible_record, ExtraData};
use crate::types::{ChannelData, ChannelMember, Message, Reaction, User};

// =============================================================================
// Event type
// =============================================================================

/// Which kind of event is being sent or received.
///
/// The constants below cover every kind the server emits today, but any string
/// is accepted on the wire so newer kinds decode without error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(Cow<'static, str>);

macro_rules! event_types {
    ($($(#[$doc:meta])* $name:ident = $tag:literal,)+) => {
        impl EventType {
            $(
                $(#[$doc])*
                pub const $name: EventType = EventType(Cow::Borrowed($tag));
            )+

            /// Every tag in the documented catalog.
            pub const KNOWN: &'static [&'static str] = &[$($tag),+];
        }
    };
}

event_types! {
    /// A new message was added.
    MESSAGE_NEW = "message.new",
    MESSAGE_UPDATED = "message.updated",
    MESSAGE_DELETED = "message.deleted",
    /// A user marked the channel as read.
    MESSAGE_READ = "message.read",

    REACTION_NEW = "reaction.new",
    REACTION_DELETED = "reaction.deleted",

    MEMBER_ADDED = "member.added",
    MEMBER_UPDATED = "member.updated",
    MEMBER_REMOVED = "member.removed",

    CHANNEL_CREATED = "channel.created",
    CHANNEL_UPDATED = "channel.updated",
    CHANNEL_DELETED = "channel.deleted",
    CHANNEL_TRUNCATED = "channel.truncated",

    HEALTH_CHECK = "health.check",

    NOTIFICATION_NEW_MESSAGE = "notification.message_new",
    NOTIFICATION_MARK_READ = "notification.mark_read",
    NOTIFICATION_INVITED = "notification.invited",
    NOTIFICATION_INVITE_ACCEPTED = "notification.invite_accepted",
    NOTIFICATION_ADDED_TO_CHANNEL = "notification.added_to_channel",
    NOTIFICATION_REMOVED_FROM_CHANNEL = "notification.removed_from_channel",
    NOTIFICATION_MUTES_UPDATED = "notification.mutes_updated",

    TYPING_START = "typing.start",
    TYPING_STOP = "typing.stop",

    USER_MUTED = "user.muted",
    USER_UNMUTED = "user.unmuted",
    USER_PRESENCE_CHANGED = "user.presence.changed",
    USER_WATCHING_START = "user.watching.start",
    USER_WATCHING_STOP = "user.watching.stop",
    USER_UPDATED = "user.updated",
}

impl EventType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag is part of the documented catalog. Decoding never
    /// depends on this.
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.as_str())
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self(Cow::Borrowed(""))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

// =============================================================================
// Channel event
// =============================================================================

/// An event on a channel: received from a webhook, or sent with
/// [`Channel::send_event`](crate::Channel::send_event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Event {
    /// Channel id in `type:id` form. Filled in by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cid: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "crate::extra::null_as_default")]
    pub kind: EventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<ChannelMember>,

    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub members: Vec<ChannelMember>,

    /// Acting user. Overwritten by `send_event`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// The calling user, as seen by the server
    #[serde(rename = "me", default, skip_serializing_if = "Option::is_none")]
    pub own_user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watcher_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(Event {
    "cid",
    "type",
    "message",
    "reaction",
    "channel",
    "member",
    "members",
    "user",
    "user_id",
    "me",
    "watcher_count",
    "created_at",
});

impl Event {
    pub fn new(kind: impl Into<EventType>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Attach a caller-defined field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }

    /// Channel id (`type:id`) the server stamped on this event, if any.
    pub fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    /// Decode an inbound webhook body.
    pub fn from_webhook(body: &[u8]) -> Result<Self> {
        extra::from_slice(body)
    }
}

// =============================================================================
// User custom event
// =============================================================================

/// A custom event delivered to every connected client of one user.
///
/// `kind` is free-form: built-in event types are not supported here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct UserCustomEvent {
    #[serde(rename = "type", default, deserialize_with = "crate::extra::null_as_default")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(UserCustomEvent { "type", "created_at" });

impl UserCustomEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Attach a caller-defined field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamChatError;
    use crate::extra::ExtensibleRecord;
    use serde_json::json;

    fn extra(value: Value) -> ExtraData {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_event_round_trip_with_disjoint_extra() {
        let mut event = Event::new(EventType::MESSAGE_NEW);
        event.message = Some(Message {
            id: "m1".into(),
            text: "hello".into(),
            ..Default::default()
        });
        event.members = vec![ChannelMember {
            user_id: "alice".into(),
            ..Default::default()
        }];
        event.user_id = Some("alice".into());
        event.watcher_count = Some(4);
        event.created_at = Some("2024-05-06T07:08:09.5Z".parse().unwrap());
        event.extra_data = extra(json!({
            "custom": { "a": [1, 2, 3] },
            "flag": true,
            "note": null
        }));

        let document = extra::encode(&event).unwrap();
        let decoded: Event = extra::decode(Value::Object(document)).unwrap();

        assert_eq!(decoded, event);
    }

    #[test]
    fn test_event_known_field_precedence() {
        let event = Event::new(EventType::MESSAGE_NEW).with_extra("type", "bogus");

        let document = serde_json::to_value(&event).unwrap();
        assert_eq!(document, json!({ "type": "message.new" }));

        let decoded: Event = serde_json::from_value(document).unwrap();
        assert_eq!(decoded.kind, EventType::MESSAGE_NEW);
        assert!(decoded.extra_data.is_empty());
    }

    #[test]
    fn test_unknown_event_type_decodes() {
        let event: Event = serde_json::from_value(json!({ "type": "some.future.event" })).unwrap();

        assert_eq!(event.kind.as_str(), "some.future.event");
        assert!(!event.kind.is_known());
        assert_eq!(serde_json::to_value(&event).unwrap()["type"], "some.future.event");
    }

    #[test]
    fn test_event_type_catalog() {
        assert!(EventType::MESSAGE_NEW.is_known());
        assert!(EventType::from("user.presence.changed").is_known());
        assert_eq!(EventType::KNOWN.len(), 29);
        assert_eq!(EventType::NOTIFICATION_NEW_MESSAGE.to_string(), "notification.message_new");
        assert_eq!(EventType::new("typing.start"), EventType::TYPING_START);
    }

    #[test]
    fn test_event_known_fields_match_schema() {
        let mut event: Event = extra::decode(json!({ "type": "x", "cid": "messaging:general" })).unwrap();
        event.message = Some(Message::default());
        event.reaction = Some(Reaction::default());
        event.channel = Some(ChannelData::default());
        event.member = Some(ChannelMember::default());
        event.members = vec![ChannelMember::default()];
        event.user = Some(User::new("a"));
        event.user_id = Some("a".into());
        event.own_user = Some(User::new("a"));
        event.watcher_count = Some(1);
        event.created_at = Some(Utc::now());

        let keys: Vec<String> = extra::encode(&event).unwrap().keys().cloned().collect();
        assert_eq!(keys, Event::KNOWN_FIELDS);
    }

    #[test]
    fn test_webhook_payload_decodes() {
        let body = br#"{
            "type": "message.new",
            "cid": "messaging:fun",
            "message": { "id": "m1", "text": "hi", "user": { "id": "bob" } },
            "user": { "id": "bob", "role": "user" },
            "me": { "id": "bob" },
            "watcher_count": 2,
            "created_at": "2024-01-02T03:04:05Z",
            "team": "blue",
            "user_id": null
        }"#;

        let event = Event::from_webhook(body).unwrap();

        assert_eq!(event.kind, EventType::MESSAGE_NEW);
        assert_eq!(event.cid(), Some("messaging:fun"));
        assert_eq!(event.message.as_ref().unwrap().text, "hi");
        assert_eq!(event.own_user.as_ref().unwrap().id, "bob");
        assert_eq!(event.watcher_count, Some(2));
        assert_eq!(event.user_id, None);
        assert_eq!(event.extra_data, extra(json!({ "team": "blue" })));
    }

    #[test]
    fn test_webhook_null_known_fields_decode_as_empty() {
        let event = Event::from_webhook(br#"{"type":"member.added","members":null}"#).unwrap();
        assert!(event.members.is_empty());
        assert!(event.extra_data.is_empty());

        let event = Event::from_webhook(
            br#"{"type":"message.new","message":{"id":"m1","text":null,"mentioned_users":null}}"#,
        )
        .unwrap();
        let message = event.message.unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.text, "");
        assert!(message.mentioned_users.is_empty());
        assert!(message.extra_data.is_empty());

        let event = Event::from_webhook(br#"{"type":null,"reaction":{"type":null}}"#).unwrap();
        assert_eq!(event.kind, EventType::default());
        assert_eq!(event.reaction.unwrap().kind, "");
    }

    #[test]
    fn test_webhook_missing_type_and_id_decode_as_empty() {
        let event = Event::from_webhook(br#"{"cid":"messaging:x","team":"blue"}"#).unwrap();
        assert_eq!(event.kind.as_str(), "");
        assert_eq!(event.cid(), Some("messaging:x"));
        assert_eq!(event.extra_data, extra(json!({ "team": "blue" })));

        let event = Event::from_webhook(br#"{"type":"message.new","user":{"name":"anon"}}"#).unwrap();
        let user = event.user.unwrap();
        assert_eq!(user.id, "");
        assert_eq!(user.name.as_deref(), Some("anon"));

        let custom: UserCustomEvent = extra::decode(json!({})).unwrap();
        assert_eq!(custom, UserCustomEvent::default());
    }

    #[test]
    fn test_webhook_nested_error_is_prefixed_once() {
        let err = Event::from_webhook(br#"{"type":"message.new","user":{"id":7}}"#).unwrap_err();

        assert!(matches!(err, StreamChatError::MalformedDocument(_)));
        assert_eq!(err.to_string().matches("Malformed document").count(), 1);
    }

    #[test]
    fn test_webhook_rejects_truncated_body() {
        let err = Event::from_webhook(br#"{"type": "message.new", "cid":"#).unwrap_err();
        assert!(matches!(err, StreamChatError::MalformedDocument(_)));

        let err = Event::from_webhook(b"\"message.new\"").unwrap_err();
        assert!(matches!(err, StreamChatError::MalformedDocument(_)));
    }

    #[test]
    fn test_user_custom_event_round_trip() {
        let event = UserCustomEvent::new("friendship_request")
            .with_extra("message", "Let's be friends!")
            .with_extra("from", json!({ "id": "alice" }));

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"friendship_request","message":"Let's be friends!","from":{"id":"alice"}}"#
        );

        let decoded: UserCustomEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_user_custom_event_type_is_free_form() {
        let decoded: UserCustomEvent = extra::decode(json!({
            "type": "message.new",
            "created_at": null,
            "payload": 1
        }))
        .unwrap();

        assert_eq!(decoded.kind, "message.new");
        assert_eq!(decoded.created_at, None);
        assert_eq!(decoded.extra_data, extra(json!({ "payload": 1 })));
    }
}
