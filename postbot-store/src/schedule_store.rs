//! Schedule store: the JSON file holding the pending post list.
//!
//! Reads tolerate every shape the file has historically had: the current
//! list format, the legacy single-record format (migrated on sight), and
//! damaged content (healed by discarding). Writes go through a temp sibling
//! plus an atomic rename so a concurrent reader never observes a torn file.
//! External: callers use load/save/append.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use postbot_core::MediaItem;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::post::{ScheduledPost, DEFAULT_POST_TEXT};

/// Result of an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Post stored; carries the new pending count.
    Appended(usize),
    /// An identical post (same time, text and media) is already pending;
    /// nothing was written.
    Duplicate,
}

/// A current-format record as it sits on disk, before validation. Optional
/// fields keep one damaged record from poisoning the whole list.
#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    id: Option<String>,
    dispatch_at: String,
    #[serde(default)]
    message_text: Option<String>,
    #[serde(default)]
    media: Vec<MediaItem>,
    /// Legacy leftover; a record marked sent must not ride along.
    #[serde(default)]
    sent: bool,
}

/// The pre-list single-record format: `{dispatch_at, sent, message_text?}`.
#[derive(Debug, Deserialize)]
struct LegacyRecord {
    dispatch_at: String,
    #[serde(default)]
    sent: bool,
    #[serde(default)]
    message_text: Option<String>,
}

/// JSON-file-backed store for the pending post list.
///
/// A missing file and an empty list are the same state: saving an empty list
/// deletes the file, loading a missing file yields an empty list.
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the pending list. Never fails: a missing file is an empty list,
    /// unreadable or malformed content is logged and healed, a legacy record
    /// is migrated, and individually damaged records are skipped.
    pub fn load(&self) -> Vec<ScheduledPost> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read schedule file, treating as empty"
                );
                return Vec::new();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Schedule file is not valid JSON, discarding it"
                );
                self.discard_file();
                return Vec::new();
            }
        };

        match value {
            Value::Array(items) => self.parse_posts(items),
            Value::Object(_) => self.migrate_legacy(value),
            _ => {
                warn!(
                    path = %self.path.display(),
                    "Schedule file holds neither a list nor a legacy record, discarding it"
                );
                self.discard_file();
                Vec::new()
            }
        }
    }

    /// Replaces the stored list. An empty list deletes the backing file;
    /// anything else is written to a temp sibling and renamed over the
    /// target, so a crash mid-write leaves the previous version intact.
    pub fn save(&self, posts: &[ScheduledPost]) -> Result<(), StoreError> {
        if posts.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => debug!(path = %self.path.display(), "Removed empty schedule file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(posts)?;
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        debug!(
            path = %self.path.display(),
            count = posts.len(),
            "Saved schedule"
        );
        Ok(())
    }

    /// Appends one post unless an identical one is already pending.
    pub fn append(&self, post: ScheduledPost) -> Result<AppendOutcome, StoreError> {
        let mut posts = self.load();
        if posts.iter().any(|existing| existing.same_content(&post)) {
            debug!(post_id = %post.id, "Identical post already scheduled, skipping append");
            return Ok(AppendOutcome::Duplicate);
        }
        posts.push(post);
        self.save(&posts)?;
        Ok(AppendOutcome::Appended(posts.len()))
    }

    fn parse_posts(&self, items: Vec<Value>) -> Vec<ScheduledPost> {
        let total = items.len();
        let mut posts = Vec::with_capacity(total);
        for item in items {
            if let Some(post) = parse_post(item) {
                posts.push(post);
            }
        }
        let skipped = total - posts.len();
        if skipped > 0 {
            warn!(
                path = %self.path.display(),
                skipped,
                kept = posts.len(),
                "Skipped unreadable schedule records"
            );
        }
        posts
    }

    /// Normalizes a legacy single-record file into the list format. A record
    /// that was already sent, or whose dispatch time cannot be read, is
    /// removed rather than carried forward.
    fn migrate_legacy(&self, value: Value) -> Vec<ScheduledPost> {
        let legacy: LegacyRecord = match serde_json::from_value(value) {
            Ok(legacy) => legacy,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Schedule file holds an unrecognized object, discarding it"
                );
                self.discard_file();
                return Vec::new();
            }
        };

        if legacy.sent {
            info!(
                path = %self.path.display(),
                "Legacy schedule record was already sent, removing it"
            );
            self.discard_file();
            return Vec::new();
        }

        let dispatch_at = match parse_dispatch_at(&legacy.dispatch_at) {
            Some(dispatch_at) => dispatch_at,
            None => {
                warn!(
                    path = %self.path.display(),
                    dispatch_at = %legacy.dispatch_at,
                    "Legacy schedule record has an unreadable dispatch time, removing it"
                );
                self.discard_file();
                return Vec::new();
            }
        };

        let message_text = legacy
            .message_text
            .unwrap_or_else(|| DEFAULT_POST_TEXT.to_string());
        let post = ScheduledPost::new(dispatch_at, message_text, Vec::new());
        info!(post_id = %post.id, "Migrated legacy schedule record to the list format");
        if let Err(e) = self.save(std::slice::from_ref(&post)) {
            // The next load repeats the migration; this read still returns
            // the migrated post.
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist migrated schedule"
            );
        }
        vec![post]
    }

    fn discard_file(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove schedule file"
                );
            }
        }
    }
}

fn parse_post(item: Value) -> Option<ScheduledPost> {
    let raw: RawPost = serde_json::from_value(item).ok()?;
    if raw.sent {
        return None;
    }
    let dispatch_at = parse_dispatch_at(&raw.dispatch_at)?;
    Some(ScheduledPost {
        id: raw.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        dispatch_at,
        message_text: raw
            .message_text
            .unwrap_or_else(|| DEFAULT_POST_TEXT.to_string()),
        media: raw.media,
    })
}

/// Parses a stored dispatch time. Accepts RFC 3339 with any offset; a naive
/// timestamp (legacy writers stored those) is taken as UTC.
fn parse_dispatch_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
