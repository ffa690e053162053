//! Bot abstraction for outbound delivery.
//!
//! [`Bot`] is transport-agnostic; the teloxide implementation lives in the
//! application crate so this one stays free of transport dependencies.

use crate::error::Result;
use crate::types::{Chat, Message, OutboundMedia};
use async_trait::async_trait;

/// Abstraction for sending messages and media. Implementations map to a
/// transport (e.g. Telegram); handlers and the dispatch engine hold it as
/// `Arc<dyn Bot>` so tests can substitute a recording implementation.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Sends a single media attachment with its native kind and optional caption.
    async fn send_media(&self, chat: &Chat, media: &OutboundMedia) -> Result<()>;
    /// Sends several attachments as one grouped delivery (an album). The
    /// caller decides which item carries the caption.
    async fn send_media_group(&self, chat: &Chat, media: &[OutboundMedia]) -> Result<()>;
}
