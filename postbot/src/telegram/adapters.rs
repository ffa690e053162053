//! Wrappers converting teloxide types into transport-agnostic core types.

use postbot_core::{
    Chat, ForwardedChat, MediaItem, MediaKind, Message, ToCoreMessage, ToCoreUser, User,
};
use teloxide::types::MessageOrigin;

/// Wrapper to convert a teloxide user to a core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl ToCoreUser for TelegramUserWrapper<'_> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wrapper to convert a teloxide message to a core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl ToCoreMessage for TelegramMessageWrapper<'_> {
    fn to_core(&self) -> Message {
        let msg = self.0;
        let user = match msg.from.as_ref() {
            Some(user) => TelegramUserWrapper(user).to_core(),
            // Channel posts carry no sender; id 0 never matches the operator.
            None => User {
                id: 0,
                username: None,
                first_name: None,
                last_name: None,
            },
        };
        Message {
            id: msg.id.to_string(),
            user,
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: chat_type_name(&msg.chat).to_string(),
            },
            content: msg.text().or_else(|| msg.caption()).unwrap_or("").to_string(),
            media: collect_media(msg),
            forwarded_from: forwarded_chat(msg),
            created_at: msg.date,
        }
    }
}

fn chat_type_name(chat: &teloxide::types::Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    }
}

/// Attachment descriptors of a message. A photo message yields one
/// descriptor per resolution Telegram offers.
fn collect_media(msg: &teloxide::types::Message) -> Vec<MediaItem> {
    let mut media = Vec::new();
    if let Some(photos) = msg.photo() {
        for photo in photos {
            media.push(MediaItem {
                kind: MediaKind::Photo,
                file_id: photo.file.id.to_string(),
            });
        }
    }
    if let Some(document) = msg.document() {
        media.push(MediaItem {
            kind: MediaKind::Document,
            file_id: document.file.id.to_string(),
        });
    }
    if let Some(video) = msg.video() {
        media.push(MediaItem {
            kind: MediaKind::Video,
            file_id: video.file.id.to_string(),
        });
    }
    if let Some(audio) = msg.audio() {
        media.push(MediaItem {
            kind: MediaKind::Audio,
            file_id: audio.file.id.to_string(),
        });
    }
    media
}

/// Source chat of a message forwarded from a channel. Other forward origins
/// (users, hidden users, anonymous group admins) are not interesting here.
fn forwarded_chat(msg: &teloxide::types::Message) -> Option<ForwardedChat> {
    match msg.forward_origin()? {
        MessageOrigin::Channel { chat, .. } => Some(ForwardedChat {
            id: chat.id.0,
            name: chat
                .title()
                .map(str::to_string)
                .or_else(|| chat.username().map(str::to_string))
                .unwrap_or_else(|| chat.id.0.to_string()),
        }),
        _ => None,
    }
}
