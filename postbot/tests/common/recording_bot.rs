//! A [`Bot`] implementation that records outbound calls for assertions.

use async_trait::async_trait;
use postbot_core::{Bot, Chat, Message, OutboundMedia, PostbotError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One call made through the [`Bot`] trait.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Media { chat_id: i64, media: OutboundMedia },
    MediaGroup { chat_id: i64, media: Vec<OutboundMedia> },
}

pub struct RecordingBot {
    sender: mpsc::UnboundedSender<Sent>,
    fail_marker: Option<String>,
}

impl RecordingBot {
    /// New bot plus the receiver carrying everything it "sent".
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<Sent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                sender,
                fail_marker: None,
            }),
            receiver,
        )
    }

    /// Like [`Self::with_receiver`], but any send whose text or caption
    /// contains `marker` fails with a delivery error and is not recorded.
    pub fn failing_on(marker: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<Sent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                sender,
                fail_marker: Some(marker.to_string()),
            }),
            receiver,
        )
    }

    fn check(&self, text: Option<&str>) -> Result<()> {
        if let (Some(marker), Some(text)) = (&self.fail_marker, text) {
            if text.contains(marker.as_str()) {
                return Err(PostbotError::Bot("simulated delivery failure".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.check(Some(text))?;
        self.sender
            .send(Sent::Text {
                chat_id: chat.id,
                text: text.to_string(),
            })
            .ok();
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_media(&self, chat: &Chat, media: &OutboundMedia) -> Result<()> {
        self.check(media.caption.as_deref())?;
        self.sender
            .send(Sent::Media {
                chat_id: chat.id,
                media: media.clone(),
            })
            .ok();
        Ok(())
    }

    async fn send_media_group(&self, chat: &Chat, media: &[OutboundMedia]) -> Result<()> {
        for item in media {
            self.check(item.caption.as_deref())?;
        }
        self.sender
            .send(Sent::MediaGroup {
                chat_id: chat.id,
                media: media.to_vec(),
            })
            .ok();
        Ok(())
    }
}

/// Everything recorded so far, in send order.
pub fn drain(receiver: &mut mpsc::UnboundedReceiver<Sent>) -> Vec<Sent> {
    let mut sent = Vec::new();
    while let Ok(item) = receiver.try_recv() {
        sent.push(item);
    }
    sent
}
