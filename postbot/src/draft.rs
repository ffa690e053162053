//! In-memory draft state for the scheduling conversation.
//!
//! One draft per operator user id. The flow is `/schedule <time>` (creates an
//! [`DraftState::AwaitingText`] entry), then the post text (moves to
//! [`DraftState::CollectingMedia`]), then any number of media messages, then
//! `/done` or `/cancel`. Drafts live only as long as the process; a restart
//! discards them.

use chrono::{DateTime, Utc};
use postbot_core::MediaItem;
use postbot_store::DEFAULT_POST_TEXT;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A post under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub dispatch_at: DateTime<Utc>,
    pub message_text: String,
    pub media: Vec<MediaItem>,
}

/// Where a draft is in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftState {
    /// `/schedule` accepted; waiting for the post text.
    AwaitingText { dispatch_at: DateTime<Utc> },
    /// Text captured; media may still arrive until `/done`.
    CollectingMedia(Draft),
}

/// Result of [`DraftTable::finish`].
#[derive(Debug, Clone, PartialEq)]
pub enum FinishOutcome {
    /// The draft was complete and has been removed from the table.
    Ready(Draft),
    /// A draft exists but no text was sent yet; the draft is kept.
    TextMissing,
    /// No draft in progress for this user.
    NoDraft,
}

/// Drafts keyed by operator user id, shared between handler invocations.
#[derive(Debug, Default)]
pub struct DraftTable {
    entries: Mutex<HashMap<i64, DraftState>>,
}

impl DraftTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<i64, DraftState>> {
        // A poisoned lock only means another handler panicked mid-update;
        // the map itself is still usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new draft, replacing any draft the user already had.
    pub fn begin(&self, user_id: i64, dispatch_at: DateTime<Utc>) {
        self.entries()
            .insert(user_id, DraftState::AwaitingText { dispatch_at });
    }

    /// Record the post text. Returns false when no draft is awaiting text.
    ///
    /// Whitespace-only text falls back to [`DEFAULT_POST_TEXT`]; once text is
    /// set, later text messages are ignored.
    pub fn set_text(&self, user_id: i64, text: &str) -> bool {
        let mut entries = self.entries();
        match entries.get(&user_id) {
            Some(DraftState::AwaitingText { dispatch_at }) => {
                let message_text = if text.trim().is_empty() {
                    DEFAULT_POST_TEXT.to_string()
                } else {
                    text.to_string()
                };
                let draft = Draft {
                    dispatch_at: *dispatch_at,
                    message_text,
                    media: Vec::new(),
                };
                entries.insert(user_id, DraftState::CollectingMedia(draft));
                true
            }
            _ => false,
        }
    }

    /// Attach media descriptors to a draft that already has text.
    ///
    /// Returns the new media total, or `None` when the user has no draft in
    /// the collecting stage.
    pub fn push_media(&self, user_id: i64, items: &[MediaItem]) -> Option<usize> {
        let mut entries = self.entries();
        match entries.get_mut(&user_id) {
            Some(DraftState::CollectingMedia(draft)) => {
                draft.media.extend_from_slice(items);
                Some(draft.media.len())
            }
            _ => None,
        }
    }

    /// Close out the draft on `/done`.
    pub fn finish(&self, user_id: i64) -> FinishOutcome {
        let mut entries = self.entries();
        match entries.remove(&user_id) {
            Some(DraftState::CollectingMedia(draft)) => FinishOutcome::Ready(draft),
            Some(state @ DraftState::AwaitingText { .. }) => {
                entries.insert(user_id, state);
                FinishOutcome::TextMissing
            }
            None => FinishOutcome::NoDraft,
        }
    }

    /// Drop the user's draft. Returns false when there was nothing to drop.
    pub fn cancel(&self, user_id: i64) -> bool {
        self.entries().remove(&user_id).is_some()
    }

    /// Put a finished draft back, e.g. when persisting it failed and the
    /// operator should retry `/done`.
    pub fn restore(&self, user_id: i64, draft: Draft) {
        self.entries()
            .insert(user_id, DraftState::CollectingMedia(draft));
    }
}
