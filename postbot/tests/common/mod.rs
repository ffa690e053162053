//! Shared test fixtures.

pub mod recording_bot;

use chrono::Utc;
use postbot_core::{Chat, ForwardedChat, MediaItem, Message, User};

pub const ADMIN_ID: i64 = 7001;
pub const PRIVATE_CHAT_ID: i64 = 7001;

/// A private-chat text message from `user_id`.
pub fn text_message(user_id: i64, content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: user_id,
            username: Some("op".to_string()),
            first_name: Some("Op".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: PRIVATE_CHAT_ID,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        media: Vec::new(),
        forwarded_from: None,
        created_at: Utc::now(),
    }
}

/// A private-chat media message from `user_id` with an empty caption.
pub fn media_message(user_id: i64, media: Vec<MediaItem>) -> Message {
    Message {
        media,
        ..text_message(user_id, "")
    }
}

/// A message `user_id` forwarded from a channel.
pub fn forwarded_message(user_id: i64, origin: ForwardedChat) -> Message {
    Message {
        forwarded_from: Some(origin),
        ..text_message(user_id, "forwarded post body")
    }
}
