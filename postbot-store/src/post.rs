//! Scheduled post model for persistence and delivery.
//!
//! Maps to one record in the schedule file and is used by ScheduleStore and
//! the dispatch engine.

use chrono::{DateTime, Utc};
use postbot_core::MediaItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback post text when the operator provides none (and for legacy records
/// persisted without a text field).
pub const DEFAULT_POST_TEXT: &str = "Hello";

/// One post waiting for delivery.
///
/// `dispatch_at` is always UTC; operator-facing conversions happen at the
/// edges. `id` exists for log correlation only and never participates in
/// duplicate detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: String,
    pub dispatch_at: DateTime<Utc>,
    pub message_text: String,
    pub media: Vec<MediaItem>,
}

impl ScheduledPost {
    /// Creates a new post with a generated UUID.
    pub fn new(dispatch_at: DateTime<Utc>, message_text: String, media: Vec<MediaItem>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dispatch_at,
            message_text,
            media,
        }
    }

    /// Duplicate-detection key: same instant, same text, same media in the
    /// same order.
    pub fn same_content(&self, other: &ScheduledPost) -> bool {
        self.dispatch_at == other.dispatch_at
            && self.message_text == other.message_text
            && self.media == other.media
    }
}
