//! Due-post delivery.
//!
//! [`DispatchEngine::run_once`] loads the schedule, sends every post whose
//! time has come to the target channel, and writes back only the posts that
//! must stay: the not-yet-due ones and any whose delivery failed. Failed
//! posts are retried on the next run.

use chrono::{DateTime, Utc};
use postbot_core::{Bot, Chat, OutboundMedia, PostbotError, Result};
use postbot_store::{ScheduleStore, ScheduledPost};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Pause after a grouped-media send, to stay under Telegram rate limits.
const GROUP_SEND_PAUSE: Duration = Duration::from_secs(1);

/// Counters for one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Sends due posts from a [`ScheduleStore`] to one target chat.
pub struct DispatchEngine {
    bot: Arc<dyn Bot>,
    store: Arc<ScheduleStore>,
    target: Chat,
    group_pause: Duration,
}

impl DispatchEngine {
    pub fn new(bot: Arc<dyn Bot>, store: Arc<ScheduleStore>, target_chat_id: i64) -> Self {
        Self {
            bot,
            store,
            target: Chat {
                id: target_chat_id,
                chat_type: "channel".to_string(),
            },
            group_pause: GROUP_SEND_PAUSE,
        }
    }

    /// Override the post-group pacing delay. Tests run with `Duration::ZERO`.
    pub fn with_group_pause(mut self, pause: Duration) -> Self {
        self.group_pause = pause;
        self
    }

    /// One dispatch pass over the schedule.
    ///
    /// The schedule file is rewritten only when at least one post left it,
    /// so a run that delivers nothing never touches the file.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<DispatchSummary> {
        let posts = self.store.load();
        if posts.is_empty() {
            info!("No posts pending");
            return Ok(DispatchSummary::default());
        }

        let now = Utc::now();
        let total = posts.len();
        let mut summary = DispatchSummary::default();
        let mut kept: Vec<ScheduledPost> = Vec::new();

        for post in posts {
            if !is_due(&post, now) {
                kept.push(post);
                continue;
            }
            match self.deliver(&post).await {
                Ok(()) => {
                    info!(
                        post_id = %post.id,
                        dispatch_at = %post.dispatch_at,
                        "Post delivered"
                    );
                    summary.sent += 1;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        post_id = %post.id,
                        "Failed to deliver post, keeping it for the next run"
                    );
                    summary.failed += 1;
                    kept.push(post);
                }
            }
        }

        if kept.len() != total {
            self.store
                .save(&kept)
                .map_err(|e| PostbotError::Store(e.to_string()))?;
        }
        summary.pending = kept.len();
        info!(
            sent = summary.sent,
            failed = summary.failed,
            pending = summary.pending,
            "Dispatch pass finished"
        );
        Ok(summary)
    }

    async fn deliver(&self, post: &ScheduledPost) -> Result<()> {
        match post.media.len() {
            0 => {
                self.bot
                    .send_message(&self.target, &post.message_text)
                    .await
            }
            1 => {
                let media = OutboundMedia::new(&post.media[0], Some(post.message_text.clone()));
                self.bot.send_media(&self.target, &media).await
            }
            _ => {
                // Caption goes on the first item only; Telegram renders it
                // once under the whole album.
                let media: Vec<OutboundMedia> = post
                    .media
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let caption = (i == 0).then(|| post.message_text.clone());
                        OutboundMedia::new(item, caption)
                    })
                    .collect();
                self.bot.send_media_group(&self.target, &media).await?;
                tokio::time::sleep(self.group_pause).await;
                Ok(())
            }
        }
    }
}

/// A post whose time has arrived is due; the boundary instant itself counts.
fn is_due(post: &ScheduledPost, now: DateTime<Utc>) -> bool {
    post.dispatch_at <= now
}
