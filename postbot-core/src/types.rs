//! Core types: user, chat, message, media descriptors, and conversion traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (channel, group or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// Kind of a media attachment. The lowercase name is the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Document,
    Video,
    Audio,
}

/// One media attachment: kind plus the transport's opaque file handle.
/// Persisted as `{"type": ..., "file_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub file_id: String,
}

/// A media attachment prepared for delivery: descriptor plus optional caption.
/// Only the dispatch side builds these; caption placement is its decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMedia {
    pub kind: MediaKind,
    pub file_id: String,
    pub caption: Option<String>,
}

impl OutboundMedia {
    /// Pairs a stored descriptor with the caption it should carry.
    pub fn new(item: &MediaItem, caption: Option<String>) -> Self {
        Self {
            kind: item.kind,
            file_id: item.file_id.clone(),
            caption,
        }
    }
}

/// Origin of a message forwarded from a channel (used for the chat-ID lookup reply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardedChat {
    pub id: i64,
    pub name: String,
}

/// A single incoming message with user, chat, text content, and attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    /// Text body; for media messages this is the caption (may be empty).
    pub content: String,
    /// One descriptor per attachment carried by the event.
    pub media: Vec<MediaItem>,
    /// Set when the message was forwarded from a channel.
    pub forwarded_from: Option<ForwardedChat>,
    pub created_at: DateTime<Utc>,
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_wire_field_names() {
        let item = MediaItem {
            kind: MediaKind::Photo,
            file_id: "AgACAgIAAxkBAAI".to_string(),
        };
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["type"], "photo");
        assert_eq!(json["file_id"], "AgACAgIAAxkBAAI");
    }

    #[test]
    fn test_media_kind_wire_names() {
        for (kind, name) in [
            (MediaKind::Photo, "\"photo\""),
            (MediaKind::Document, "\"document\""),
            (MediaKind::Video, "\"video\""),
            (MediaKind::Audio, "\"audio\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).expect("serialize"), name);
            let parsed: MediaKind = serde_json::from_str(name).expect("parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_outbound_media_copies_descriptor() {
        let item = MediaItem {
            kind: MediaKind::Video,
            file_id: "vid-1".to_string(),
        };
        let outbound = OutboundMedia::new(&item, Some("caption".to_string()));
        assert_eq!(outbound.kind, MediaKind::Video);
        assert_eq!(outbound.file_id, "vid-1");
        assert_eq!(outbound.caption.as_deref(), Some("caption"));
    }
}
