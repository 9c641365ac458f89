//! Entity snapshots embedded in events and API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extra::{extensible_record, ExtraData};

// =============================================================================
// User
// =============================================================================

/// A chat user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct User {
    #[serde(default, deserialize_with = "crate::extra::null_as_default")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Role: "user", "admin", "guest", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invisible: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(User {
    "id",
    "name",
    "image",
    "role",
    "online",
    "invisible",
    "created_at",
    "updated_at",
    "last_active",
});

impl User {
    /// Minimal identity reference: just the user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Message {
    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub text: String,

    /// Rendered HTML, set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Message type: "regular", "system", "reply", ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u32>,

    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mentioned_users: Vec<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(Message {
    "id",
    "text",
    "html",
    "type",
    "user",
    "parent_id",
    "reply_count",
    "mentioned_users",
    "created_at",
    "updated_at",
});

// =============================================================================
// Reaction
// =============================================================================

/// A reaction attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Reaction {
    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub message_id: String,

    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub user_id: String,

    /// Reaction type: "like", "love", ...
    #[serde(rename = "type", default, deserialize_with = "crate::extra::null_as_default")]
    pub kind: String,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(Reaction { "message_id", "user_id", "type" });

// =============================================================================
// Channel snapshot
// =============================================================================

/// Channel state as embedded in events. Not a handle: see [`Channel`](crate::Channel)
/// for sending on a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct ChannelData {
    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub kind: String,

    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub cid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(ChannelData {
    "id",
    "type",
    "cid",
    "created_by",
    "frozen",
    "member_count",
    "created_at",
    "updated_at",
});

/// Channel membership. Fixed schema only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMember {
    #[serde(
        default,
        deserialize_with = "crate::extra::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_moderator: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_accepted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_rejected_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Response
// =============================================================================

/// Generic API response. Anything beyond `duration` lands in `extra_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Response {
    /// Server-side processing time, e.g. "1.23ms"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip)]
    pub extra_data: ExtraData,
}

extensible_record!(Response { "duration" });
