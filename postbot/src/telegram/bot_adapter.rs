//! [`Bot`] implementation backed by a teloxide bot.

use async_trait::async_trait;
use postbot_core::{Bot, Chat, MediaKind, Message, OutboundMedia, PostbotError, Result};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, FileId, InputFile, InputMedia, InputMediaAudio, InputMediaDocument, InputMediaPhoto,
    InputMediaVideo,
};

/// Telegram bot adapter wrapping a teloxide [`teloxide::Bot`].
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn input_file(file_id: &str) -> InputFile {
    InputFile::file_id(FileId(file_id.to_string()))
}

fn to_input_media(media: &OutboundMedia) -> InputMedia {
    let input = input_file(&media.file_id);
    match media.kind {
        MediaKind::Photo => {
            let mut photo = InputMediaPhoto::new(input);
            if let Some(caption) = &media.caption {
                photo = photo.caption(caption.clone());
            }
            InputMedia::Photo(photo)
        }
        MediaKind::Document => {
            let mut document = InputMediaDocument::new(input);
            if let Some(caption) = &media.caption {
                document = document.caption(caption.clone());
            }
            InputMedia::Document(document)
        }
        MediaKind::Video => {
            let mut video = InputMediaVideo::new(input);
            if let Some(caption) = &media.caption {
                video = video.caption(caption.clone());
            }
            InputMedia::Video(video)
        }
        MediaKind::Audio => {
            let mut audio = InputMediaAudio::new(input);
            if let Some(caption) = &media.caption {
                audio = audio.caption(caption.clone());
            }
            InputMedia::Audio(audio)
        }
    }
}

#[async_trait]
impl Bot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map(|_| ())
            .map_err(|e| PostbotError::Bot(e.to_string()))
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_media(&self, chat: &Chat, media: &OutboundMedia) -> Result<()> {
        let input = input_file(&media.file_id);
        match media.kind {
            MediaKind::Photo => {
                let mut request = self.bot.send_photo(ChatId(chat.id), input);
                if let Some(caption) = &media.caption {
                    request = request.caption(caption.clone());
                }
                request
                    .await
                    .map(|_| ())
                    .map_err(|e| PostbotError::Bot(e.to_string()))
            }
            MediaKind::Document => {
                let mut request = self.bot.send_document(ChatId(chat.id), input);
                if let Some(caption) = &media.caption {
                    request = request.caption(caption.clone());
                }
                request
                    .await
                    .map(|_| ())
                    .map_err(|e| PostbotError::Bot(e.to_string()))
            }
            MediaKind::Video => {
                let mut request = self.bot.send_video(ChatId(chat.id), input);
                if let Some(caption) = &media.caption {
                    request = request.caption(caption.clone());
                }
                request
                    .await
                    .map(|_| ())
                    .map_err(|e| PostbotError::Bot(e.to_string()))
            }
            MediaKind::Audio => {
                let mut request = self.bot.send_audio(ChatId(chat.id), input);
                if let Some(caption) = &media.caption {
                    request = request.caption(caption.clone());
                }
                request
                    .await
                    .map(|_| ())
                    .map_err(|e| PostbotError::Bot(e.to_string()))
            }
        }
    }

    async fn send_media_group(&self, chat: &Chat, media: &[OutboundMedia]) -> Result<()> {
        let group: Vec<InputMedia> = media.iter().map(to_input_media).collect();
        self.bot
            .send_media_group(ChatId(chat.id), group)
            .await
            .map(|_| ())
            .map_err(|e| PostbotError::Bot(e.to_string()))
    }
}
