/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single mail item.
///
/// Immutable after creation except for the `read` flag. The `id` is
/// generated once and shared by every recipient's copy; each copy still
/// carries an independent `read` flag and deletion lifecycle once it is
/// deposited into a mailbox.
///
/// Timestamps are creation instants and act as a generation-order proxy.
/// They are non-decreasing but not strictly increasing: two messages
/// created in quick succession may carry the same timestamp, and both
/// must survive storage and fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Creates a new message stamped with a fresh v4 id and the current
    /// instant, unread.
    pub fn new(
        sender: impl Into<String>,
        recipients: Vec<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            recipients,
            subject: subject.into(),
            text: text.into(),
            timestamp: Utc::now(),
            read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_is_unread_with_unique_id() {
        let a = Message::new("user1@mail.com", vec!["user2@mail.com".into()], "hi", "body");
        let b = Message::new("user1@mail.com", vec!["user2@mail.com".into()], "hi", "body");

        assert!(!a.read);
        assert_ne!(a.id, b.id);
        assert!(a.timestamp <= b.timestamp);
    }

    #[test]
    fn wire_field_names() {
        let msg = Message::new(
            "user1@mail.com",
            vec!["user2@mail.com".into(), "user3@mail.com".into()],
            "subject line",
            "body text",
        );
        let value = serde_json::to_value(&msg).unwrap();

        for field in ["id", "sender", "recipients", "subject", "text", "timestamp", "read"] {
            assert!(value.get(field).is_some(), "missing wire field: {field}");
        }
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        // Clients may omit subject, text and read; id/sender/timestamp are required.
        let json = r#"{
            "id": "abc-123",
            "sender": "user1@mail.com",
            "recipients": ["user2@mail.com"],
            "timestamp": "2025-06-01T10:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "abc-123");
        assert_eq!(msg.subject, "");
        assert_eq!(msg.text, "");
        assert!(!msg.read);
    }

    #[test]
    fn timestamp_roundtrips_through_json() {
        let msg = Message::new("user1@mail.com", vec![], "", "");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
