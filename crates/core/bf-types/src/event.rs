//! Change events produced by the bucket poller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, Payload};
use crate::object::{ObjectEntry, base_name};

/// Kind of change detected between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single added or deleted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub kind: ChangeKind,
    pub file_base_name: String,
    /// Listing metadata, only present for [`ChangeKind::Add`]
    pub metadata: Option<ObjectEntry>,
}

impl ChangeEvent {
    /// An added key with its listing entry.
    pub fn added(entry: ObjectEntry) -> Self {
        Self {
            key: entry.key.clone(),
            kind: ChangeKind::Add,
            file_base_name: entry.base_name().to_string(),
            metadata: Some(entry),
        }
    }

    /// A key that disappeared since the last snapshot.
    pub fn deleted(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            file_base_name: base_name(&key).to_string(),
            key,
            kind: ChangeKind::Delete,
            metadata: None,
        }
    }

    /// Render this event as an outbound message.
    ///
    /// The trigger message is cloned so pass-through fields reach every event.
    pub fn to_message(&self, trigger: &Message, bucket: &str) -> Message {
        let mut msg = trigger.clone();
        msg.set_payload(Payload::Text(self.key.clone()));
        msg.set("file", self.file_base_name.clone());
        msg.set("event", self.kind.as_str());
        msg.set("bucket", bucket);
        // Deletes keep whatever `data` the trigger carried
        if let Some(entry) = &self.metadata {
            msg.set("data", serde_json::to_value(entry).unwrap_or(Value::Null));
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_event() {
        let event = ChangeEvent::added(ObjectEntry::new("in/2024/a.csv", 10));
        assert_eq!(event.kind, ChangeKind::Add);
        assert_eq!(event.key, "in/2024/a.csv");
        assert_eq!(event.file_base_name, "a.csv");
        assert!(event.metadata.is_some());
    }

    #[test]
    fn test_deleted_event() {
        let event = ChangeEvent::deleted("b.csv");
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.file_base_name, "b.csv");
        assert!(event.metadata.is_none());
    }

    #[test]
    fn test_to_message_copies_pass_through_fields() {
        let trigger = Message::new()
            .with_payload("tick")
            .with_field("correlation", "c-1");

        let msg = ChangeEvent::added(ObjectEntry::new("x/y.csv", 3)).to_message(&trigger, "media");
        assert_eq!(msg.payload(), &Payload::Text("x/y.csv".to_string()));
        assert_eq!(msg.get_str("file"), Some("y.csv"));
        assert_eq!(msg.get_str("event"), Some("add"));
        assert_eq!(msg.get_str("bucket"), Some("media"));
        assert_eq!(msg.get_str("correlation"), Some("c-1"));
        assert_eq!(msg.get("data").unwrap()["Key"], "x/y.csv");

        // The trigger is untouched
        assert_eq!(trigger.payload(), &Payload::Text("tick".to_string()));
        assert!(trigger.get("event").is_none());
    }

    #[test]
    fn test_delete_message_keeps_trigger_data() {
        let trigger = Message::new().with_field("data", "upstream");
        let msg = ChangeEvent::deleted("gone.csv").to_message(&trigger, "media");
        assert_eq!(msg.get_str("event"), Some("delete"));
        assert_eq!(msg.get_str("data"), Some("upstream"));

        let msg = ChangeEvent::deleted("gone.csv").to_message(&Message::new(), "media");
        assert!(msg.get("data").is_none());
    }
}
