//! Extensible records: a fixed serde schema plus an open bag of extra fields,
//! flattened into a single JSON object on the wire.
//!
//! Every entity that carries caller-defined data (events, users, messages...)
//! implements [`ExtensibleRecord`] through the `extensible_record!` macro. The
//! macro expects the type to derive `Serialize`/`Deserialize` with
//! `#[serde(remote = "Self")]`, which turns the derived code into inherent
//! functions for the known fields only. The real trait impls then route through
//! [`encode`] and [`decode`] so extra data survives any serde round trip,
//! including when the record is nested inside another record.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut event = UserCustomEvent::new("friendship_request");
//! event.extra_data.insert("message".into(), json!("Let's be friends!"));
//!
//! let document = extra::encode(&event)?;
//! assert_eq!(document["type"], "friendship_request");
//! assert_eq!(document["message"], "Let's be friends!");
//!
//! let decoded: UserCustomEvent = extra::decode(serde_json::Value::Object(document))?;
//! assert_eq!(decoded, event);
//! ```

use serde_json::{Map, Value};

use crate::error::{Result, StreamChatError};

/// Caller-defined fields that are not part of a record's fixed schema.
pub type ExtraData = Map<String, Value>;

/// A value with a closed schema plus an arbitrary attribute bag.
pub trait ExtensibleRecord: Sized {
    /// Wire names of every known field, whether or not it is set on a value.
    const KNOWN_FIELDS: &'static [&'static str];

    /// Serialize the known fields only, applying their omit-if-empty rules.
    fn serialize_known(&self) -> serde_json::Result<Value>;

    /// Deserialize the known fields only, ignoring unrecognized keys.
    fn deserialize_known(document: &Value) -> serde_json::Result<Self>;

    fn extra_data(&self) -> &ExtraData;

    fn extra_data_mut(&mut self) -> &mut ExtraData;

    /// Whether `key` is the wire name of one of this record's known fields.
    fn is_known_field(key: &str) -> bool {
        Self::KNOWN_FIELDS.contains(&key)
    }
}

/// Flatten a record into one document.
///
/// Known fields are written first. Extra entries follow, except those whose
/// key collides with a known field: structured data always wins, even when the
/// known field itself was omitted for being empty.
pub fn encode<R: ExtensibleRecord>(record: &R) -> serde_json::Result<Map<String, Value>> {
    let mut document = match record.serialize_known()? {
        Value::Object(map) => map,
        other => {
            return Err(serde::ser::Error::custom(format!(
                "known fields serialized to {} instead of an object",
                describe(&other)
            )))
        }
    };

    for (key, value) in record.extra_data() {
        if R::is_known_field(key) || document.contains_key(key) {
            continue;
        }
        document.insert(key.clone(), value.clone());
    }

    Ok(document)
}

/// Split a document into a record's known fields and its extra data.
///
/// Every key that names a known field is stripped from the extra data, even if
/// the wire value was `null` or otherwise empty.
pub fn decode<R: ExtensibleRecord>(document: Value) -> Result<R> {
    let Value::Object(map) = &document else {
        return Err(StreamChatError::MalformedDocument(format!(
            "expected a JSON object, found {}",
            describe(&document)
        )));
    };

    let mut record = R::deserialize_known(&document)
        .map_err(|e| StreamChatError::MalformedDocument(e.to_string()))?;

    let mut extra = map.clone();
    extra.retain(|key, _| !R::is_known_field(key));
    *record.extra_data_mut() = extra;

    Ok(record)
}

/// Parse raw wire bytes (e.g. a webhook body) and [`decode`] them.
pub fn from_slice<R: ExtensibleRecord>(bytes: &[u8]) -> Result<R> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| StreamChatError::MalformedDocument(e.to_string()))?;
    decode(document)
}

/// `deserialize_with` helper: treat an explicit `null` like an absent field.
///
/// Pair with `#[serde(default)]` on non-`Option` known fields so `"text": null`
/// or `"members": null` decode to the empty value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    let value = <Option<T> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Implement [`ExtensibleRecord`] plus `Serialize`/`Deserialize` for a struct
/// that derives serde with `#[serde(remote = "Self")]` and has an
/// `extra_data: ExtraData` field marked `#[serde(skip)]`.
macro_rules! extensible_record {
    ($type:ty { $($field:literal),+ $(,)? }) => {
        impl $crate::extra::ExtensibleRecord for $type {
            const KNOWN_FIELDS: &'static [&'static str] = &[$($field),+];

            fn serialize_known(&self) -> serde_json::Result<serde_json::Value> {
                <$type>::serialize(self, serde_json::value::Serializer)
            }

            fn deserialize_known(document: &serde_json::Value) -> serde_json::Result<Self> {
                <$type>::deserialize(document)
            }

            fn extra_data(&self) -> &$crate::extra::ExtraData {
                &self.extra_data
            }

            fn extra_data_mut(&mut self) -> &mut $crate::extra::ExtraData {
                &mut self.extra_data
            }
        }

        impl serde::Serialize for $type {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                let document = $crate::extra::encode(self).map_err(serde::ser::Error::custom)?;
                serde::Serialize::serialize(&document, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let document = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                $crate::extra::decode(document).map_err(|e| match e {
                    // nested record: the outer decode adds the prefix once
                    $crate::error::StreamChatError::MalformedDocument(message) => {
                        serde::de::Error::custom(message)
                    }
                    other => serde::de::Error::custom(other),
                })
            }
        }
    };
}

pub(crate) use extensible_record;
