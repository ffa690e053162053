//! The scheduling conversation.
//!
//! [`ScheduleHandler`] receives every inbound message, keeps non-operators
//! out, and drives the draft flow: `/schedule <time>` starts a draft, the
//! next text message becomes the post body, media messages attach files, and
//! `/done` persists the finished post to the schedule store.

use crate::draft::{DraftTable, FinishOutcome};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use postbot_core::{Bot, Message, Result};
use postbot_store::{AppendOutcome, ScheduleStore, ScheduledPost};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

// ---------- User-facing messages (shown in Telegram) ----------

const MSG_ADMIN_ONLY: &str = "This command is available to the operator only.";
const MSG_SCHEDULE_USAGE: &str =
    "Format: /schedule YYYY-MM-DD HH:MM\nFor example: /schedule 2025-11-24 18:30";
const MSG_BAD_DATE: &str = "Invalid date format. Use YYYY-MM-DD HH:MM.";
const MSG_PAST_DATE: &str = "The time must be in the future.";
const MSG_TEXT_SAVED: &str = "Text saved. Send photos or files to attach, then /done to finish.";
const MSG_TEXT_FIRST: &str = "Send the post text first.";
const MSG_NO_DRAFT: &str = "No draft in progress. Start with /schedule.";
const MSG_DUPLICATE: &str = "This post is already scheduled.";
const MSG_SAVE_FAILED: &str = "Could not save the post. Try /done again.";
const MSG_CANCELLED: &str = "Draft discarded.";
const MSG_NOTHING_PENDING: &str = "No posts scheduled.";

/// Format schedule times are typed in and shown in (operator timezone).
pub const SCHEDULE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Max characters of post text shown per line in `/status`.
const STATUS_PREVIEW_LEN: usize = 40;

/// Handles every message the bot receives.
pub struct ScheduleHandler {
    bot: Arc<dyn Bot>,
    store: Arc<ScheduleStore>,
    drafts: Arc<DraftTable>,
    admin_id: i64,
    timezone_offset: FixedOffset,
}

impl ScheduleHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        store: Arc<ScheduleStore>,
        drafts: Arc<DraftTable>,
        admin_id: i64,
        timezone_offset: FixedOffset,
    ) -> Self {
        Self {
            bot,
            store,
            drafts,
            admin_id,
            timezone_offset,
        }
    }

    /// Route one inbound message.
    ///
    /// Non-operators get a refusal for commands and silence otherwise.
    /// For the operator: forwarded messages answer with the source chat id
    /// (the way the target channel id is discovered), media messages attach
    /// to the draft, commands drive the flow, plain text becomes the body.
    #[instrument(skip(self, message))]
    pub async fn handle_message(&self, message: &Message) -> Result<()> {
        if message.user.id != self.admin_id {
            if message.content.trim_start().starts_with('/') {
                info!(
                    user_id = message.user.id,
                    "Rejecting command from non-operator"
                );
                self.bot.reply_to(message, MSG_ADMIN_ONLY).await?;
            }
            return Ok(());
        }

        if let Some(origin) = &message.forwarded_from {
            info!(chat_id = origin.id, "Reporting forwarded chat id");
            let reply = format!("ID of forwarded chat '{}': {}", origin.name, origin.id);
            return self.bot.reply_to(message, &reply).await;
        }

        if !message.media.is_empty() {
            return self.on_media(message).await;
        }

        if let Some(command) = parse_command(&message.content) {
            return match command {
                Command::Schedule(arg) => self.cmd_schedule(message, arg).await,
                Command::Status => self.cmd_status(message).await,
                Command::Done => self.cmd_done(message).await,
                Command::Cancel => self.cmd_cancel(message).await,
                Command::Unknown(name) => {
                    debug!(command = name, "Ignoring unknown command");
                    Ok(())
                }
            };
        }

        self.on_text(message).await
    }

    async fn cmd_schedule(&self, message: &Message, arg: Option<&str>) -> Result<()> {
        let dispatch_at = match parse_schedule_arg(arg, self.timezone_offset, Utc::now()) {
            Ok(dispatch_at) => dispatch_at,
            Err(ScheduleArgError::Missing) => {
                return self.bot.reply_to(message, MSG_SCHEDULE_USAGE).await;
            }
            Err(ScheduleArgError::BadFormat) => {
                return self.bot.reply_to(message, MSG_BAD_DATE).await;
            }
            Err(ScheduleArgError::Past) => {
                return self.bot.reply_to(message, MSG_PAST_DATE).await;
            }
        };

        // Replaces any draft already in progress for this user.
        self.drafts.begin(message.user.id, dispatch_at);
        info!(
            user_id = message.user.id,
            dispatch_at = %dispatch_at,
            "Draft started"
        );
        let local = dispatch_at.with_timezone(&self.timezone_offset);
        let reply = format!(
            "Scheduling a post for {}. Now send the post text.",
            local.format(SCHEDULE_DATE_FORMAT)
        );
        self.bot.reply_to(message, &reply).await
    }

    async fn on_text(&self, message: &Message) -> Result<()> {
        if self.drafts.set_text(message.user.id, &message.content) {
            info!(user_id = message.user.id, "Draft text captured");
            self.bot.reply_to(message, MSG_TEXT_SAVED).await
        } else {
            debug!(user_id = message.user.id, "Ignoring text outside a draft");
            Ok(())
        }
    }

    async fn on_media(&self, message: &Message) -> Result<()> {
        match self.drafts.push_media(message.user.id, &message.media) {
            Some(total) => {
                info!(
                    user_id = message.user.id,
                    added = message.media.len(),
                    total,
                    "Draft media attached"
                );
                let reply = format!("Attached. {} media item(s) in the draft; /done to finish.", total);
                self.bot.reply_to(message, &reply).await
            }
            None => {
                debug!(user_id = message.user.id, "Ignoring media outside a draft");
                Ok(())
            }
        }
    }

    async fn cmd_done(&self, message: &Message) -> Result<()> {
        let user_id = message.user.id;
        match self.drafts.finish(user_id) {
            FinishOutcome::Ready(draft) => {
                let post = ScheduledPost::new(
                    draft.dispatch_at,
                    draft.message_text.clone(),
                    draft.media.clone(),
                );
                match self.store.append(post) {
                    Ok(AppendOutcome::Appended(pending)) => {
                        info!(
                            user_id,
                            dispatch_at = %draft.dispatch_at,
                            pending,
                            "Post scheduled"
                        );
                        let local = draft.dispatch_at.with_timezone(&self.timezone_offset);
                        let reply = format!(
                            "Post scheduled for {}. {} post(s) pending.",
                            local.format(SCHEDULE_DATE_FORMAT),
                            pending
                        );
                        self.bot.reply_to(message, &reply).await
                    }
                    Ok(AppendOutcome::Duplicate) => {
                        info!(user_id, "Duplicate post not scheduled");
                        self.bot.reply_to(message, MSG_DUPLICATE).await
                    }
                    Err(e) => {
                        error!(error = %e, user_id, "Failed to save scheduled post");
                        // Keep the draft so the operator can retry /done.
                        self.drafts.restore(user_id, draft);
                        self.bot.reply_to(message, MSG_SAVE_FAILED).await
                    }
                }
            }
            FinishOutcome::TextMissing => self.bot.reply_to(message, MSG_TEXT_FIRST).await,
            FinishOutcome::NoDraft => self.bot.reply_to(message, MSG_NO_DRAFT).await,
        }
    }

    async fn cmd_cancel(&self, message: &Message) -> Result<()> {
        if self.drafts.cancel(message.user.id) {
            info!(user_id = message.user.id, "Draft cancelled");
            self.bot.reply_to(message, MSG_CANCELLED).await
        } else {
            self.bot.reply_to(message, MSG_NO_DRAFT).await
        }
    }

    async fn cmd_status(&self, message: &Message) -> Result<()> {
        let mut posts = self.store.load();
        if posts.is_empty() {
            return self.bot.reply_to(message, MSG_NOTHING_PENDING).await;
        }
        posts.sort_by_key(|post| post.dispatch_at);

        let mut reply = format!("{} pending post(s):", posts.len());
        for post in &posts {
            let local = post.dispatch_at.with_timezone(&self.timezone_offset);
            reply.push_str(&format!(
                "\n{} - {}",
                local.format(SCHEDULE_DATE_FORMAT),
                preview(&post.message_text)
            ));
        }
        self.bot.reply_to(message, &reply).await
    }
}

enum Command<'a> {
    Schedule(Option<&'a str>),
    Status,
    Done,
    Cancel,
    Unknown(&'a str),
}

/// Split a text message into a command and its argument tail.
///
/// Accepts the `/command@BotName` form Telegram uses in group chats.
fn parse_command(content: &str) -> Option<Command<'_>> {
    let content = content.trim_start();
    if !content.starts_with('/') {
        return None;
    }
    let (head, rest) = match content.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest)),
        None => (content, None),
    };
    let name = head.split('@').next().unwrap_or(head);
    Some(match name {
        "/schedule" => Command::Schedule(rest),
        "/status" | "/schedule_status" => Command::Status,
        "/done" => Command::Done,
        "/cancel" => Command::Cancel,
        _ => Command::Unknown(name),
    })
}

enum ScheduleArgError {
    Missing,
    BadFormat,
    Past,
}

/// Parse the `/schedule` argument as a local wall-clock time and convert it
/// to UTC. Times at or before `now` are rejected.
fn parse_schedule_arg(
    arg: Option<&str>,
    tz: FixedOffset,
    now: DateTime<Utc>,
) -> std::result::Result<DateTime<Utc>, ScheduleArgError> {
    let raw = arg
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or(ScheduleArgError::Missing)?;
    let naive = NaiveDateTime::parse_from_str(raw, SCHEDULE_DATE_FORMAT)
        .map_err(|_| ScheduleArgError::BadFormat)?;
    let local = tz
        .from_local_datetime(&naive)
        .single()
        .ok_or(ScheduleArgError::BadFormat)?;
    let dispatch_at = local.with_timezone(&Utc);
    if dispatch_at <= now {
        return Err(ScheduleArgError::Past);
    }
    Ok(dispatch_at)
}

/// One status line worth of post text: newlines flattened, long text cut at
/// [`STATUS_PREVIEW_LEN`] characters with an ellipsis.
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let mut preview: String = flat.chars().take(STATUS_PREVIEW_LEN).collect();
    if flat.chars().count() > STATUS_PREVIEW_LEN {
        preview.push('…');
    }
    preview
}
