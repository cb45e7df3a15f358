//! Flow messages.
//!
//! A [`Message`] is the unit exchanged between adapters: a payload plus any
//! number of named JSON fields. Fields set by upstream nodes travel through
//! untouched, so a message is always cloned, never shared, when fanned out.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const PAYLOAD: &str = "payload";

/// Message payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload
    #[default]
    Empty,

    /// UTF-8 text
    Text(String),

    /// Raw bytes (serialized as base64 in JSON)
    Bytes(Bytes),

    /// Structured JSON
    Json(Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Bytes to upload for this payload.
    ///
    /// Text is sent as UTF-8 and JSON as its compact serialization.
    pub fn to_bytes(&self) -> Option<Bytes> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(Bytes::from(s.clone().into_bytes())),
            Self::Bytes(b) => Some(b.clone()),
            Self::Json(Value::String(s)) => Some(Bytes::from(s.clone().into_bytes())),
            Self::Json(v) => Some(Bytes::from(v.to_string().into_bytes())),
        }
    }

    /// JSON view of the payload, used for path lookups.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Bytes(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
            Self::Json(v) => v.clone(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// A flow message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    payload: Payload,
    fields: Map<String, Value>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set a named field.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Payload>) {
        self.payload = payload.into();
    }

    /// All fields except the payload.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A field as a non-empty string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Set a named field. Setting `payload` replaces the payload.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        if name == PAYLOAD {
            self.payload = Payload::from(value);
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }

    /// Top-level property lookup including the payload.
    pub fn property(&self, name: &str) -> Option<Value> {
        if name == PAYLOAD {
            match &self.payload {
                Payload::Empty => None,
                other => Some(other.to_value()),
            }
        } else {
            self.fields.get(name).cloned()
        }
    }

    /// Serialize into a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Build a message from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        match &self.payload {
            Payload::Empty => map.serialize_entry(PAYLOAD, &Value::Null)?,
            Payload::Text(s) => map.serialize_entry(PAYLOAD, s)?,
            Payload::Bytes(b) => map.serialize_entry(PAYLOAD, &STANDARD.encode(b))?,
            Payload::Json(v) => map.serialize_entry(PAYLOAD, v)?,
        }
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(mut fields) = value else {
            return Err(D::Error::custom("message must be a JSON object"));
        };
        let payload = fields.remove(PAYLOAD).map(Payload::from).unwrap_or_default();
        Ok(Self { payload, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_payload_through_field() {
        let mut msg = Message::new();
        msg.set("payload", "hello");
        assert_eq!(msg.payload(), &Payload::Text("hello".to_string()));
        assert!(msg.fields().is_empty());
    }

    #[test]
    fn test_get_str_skips_empty_and_non_strings() {
        let msg = Message::new()
            .with_field("bucket", "media")
            .with_field("filename", "")
            .with_field("count", 3);

        assert_eq!(msg.get_str("bucket"), Some("media"));
        assert_eq!(msg.get_str("filename"), None);
        assert_eq!(msg.get_str("count"), None);
        assert_eq!(msg.get_str("missing"), None);
    }

    #[test]
    fn test_json_shape() {
        let msg = Message::new()
            .with_payload("data/report.csv")
            .with_field("event", "add")
            .with_field("topic", "uploads");

        let value = msg.to_json();
        assert_eq!(value["payload"], "data/report.csv");
        assert_eq!(value["event"], "add");
        assert_eq!(value["topic"], "uploads");
    }

    #[test]
    fn test_bytes_payload_is_base64() {
        let msg = Message::new().with_payload(Bytes::from_static(b"\x00\x01hi"));
        let value = msg.to_json();
        assert_eq!(value["payload"], "AAFoaQ==");
    }

    #[test]
    fn test_from_json() {
        let msg = Message::from_json(json!({
            "payload": {"bucket": "media"},
            "correlation": "abc"
        }))
        .unwrap();

        assert_eq!(msg.payload(), &Payload::Json(json!({"bucket": "media"})));
        assert_eq!(msg.get_str("correlation"), Some("abc"));

        assert!(Message::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_payload_to_bytes() {
        assert!(Payload::Empty.to_bytes().is_none());
        assert_eq!(
            Payload::Text("abc".to_string()).to_bytes().unwrap(),
            Bytes::from_static(b"abc")
        );
        assert_eq!(
            Payload::Json(json!({"a": 1})).to_bytes().unwrap(),
            Bytes::from_static(br#"{"a":1}"#)
        );
    }

    #[test]
    fn test_property_includes_payload() {
        let msg = Message::new().with_payload(Payload::Json(json!({"k": "v"})));
        assert_eq!(msg.property("payload"), Some(json!({"k": "v"})));
        assert_eq!(Message::new().property("payload"), None);
    }
}
