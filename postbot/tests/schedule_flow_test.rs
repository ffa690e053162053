//! End-to-end tests for the scheduling conversation: full handler, real
//! store on disk, recording bot.

mod common;

use chrono::{DateTime, FixedOffset, Utc};
use common::recording_bot::{drain, RecordingBot, Sent};
use common::{forwarded_message, media_message, text_message, ADMIN_ID};
use postbot::{DraftTable, ScheduleHandler};
use postbot_core::{ForwardedChat, MediaItem, MediaKind};
use postbot_store::{ScheduleStore, ScheduledPost};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn setup(dir: &TempDir) -> (Arc<ScheduleStore>, ScheduleHandler, mpsc::UnboundedReceiver<Sent>) {
    let store = Arc::new(ScheduleStore::new(dir.path().join("schedule.json")));
    let (bot, receiver) = RecordingBot::with_receiver();
    let handler = ScheduleHandler::new(
        bot,
        store.clone(),
        Arc::new(DraftTable::new()),
        ADMIN_ID,
        FixedOffset::east_opt(3 * 3600).unwrap(),
    );
    (store, handler, receiver)
}

fn last_reply(receiver: &mut mpsc::UnboundedReceiver<Sent>) -> String {
    match drain(receiver).pop() {
        Some(Sent::Text { text, .. }) => text,
        other => panic!("expected a text reply, got {:?}", other),
    }
}

fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn photo(file_id: &str) -> MediaItem {
    MediaItem {
        kind: MediaKind::Photo,
        file_id: file_id.to_string(),
    }
}

#[tokio::test]
async fn test_full_draft_becomes_scheduled_post() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2050-01-15 18:30"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Scheduling a post for 2050-01-15 18:30"));

    handler
        .handle_message(&text_message(ADMIN_ID, "Release day!"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Text saved"));

    handler
        .handle_message(&media_message(ADMIN_ID, vec![photo("a")]))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("1 media item(s)"));
    handler
        .handle_message(&media_message(ADMIN_ID, vec![photo("b")]))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("2 media item(s)"));

    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    let reply = last_reply(&mut rx);
    assert!(reply.contains("Post scheduled for 2050-01-15 18:30"), "reply: {reply}");
    assert!(reply.contains("1 post(s) pending"), "reply: {reply}");

    // 18:30 at +03:00 is 15:30 UTC
    let posts = store.load();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].dispatch_at, ts("2050-01-15T15:30:00Z"));
    assert_eq!(posts[0].message_text, "Release day!");
    assert_eq!(posts[0].media, vec![photo("a"), photo("b")]);
}

#[tokio::test]
async fn test_identical_draft_is_rejected_as_duplicate() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    for _ in 0..2 {
        handler
            .handle_message(&text_message(ADMIN_ID, "/schedule 2050-01-15 18:30"))
            .await
            .unwrap();
        handler
            .handle_message(&text_message(ADMIN_ID, "Release day!"))
            .await
            .unwrap();
        handler
            .handle_message(&text_message(ADMIN_ID, "/done"))
            .await
            .unwrap();
    }

    assert!(last_reply(&mut rx).contains("already scheduled"));
    assert_eq!(store.load().len(), 1);
}

#[tokio::test]
async fn test_done_without_draft_and_before_text() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("No draft in progress"));

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2050-01-15 18:30"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Send the post text first"));

    // the draft survived; finishing still works
    handler
        .handle_message(&text_message(ADMIN_ID, "Late text"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Post scheduled"));
    assert_eq!(store.load().len(), 1);
}

#[tokio::test]
async fn test_cancel_discards_draft() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2050-01-15 18:30"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "Never mind"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "/cancel"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Draft discarded"));

    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("No draft in progress"));
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn test_status_lists_pending_in_time_order() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    // saved out of order on purpose
    store
        .save(&[
            ScheduledPost::new(ts("2050-03-01T15:30:00Z"), "Later post".to_string(), vec![]),
            ScheduledPost::new(ts("2050-02-01T06:00:00Z"), "a".repeat(50), vec![]),
        ])
        .unwrap();

    handler
        .handle_message(&text_message(ADMIN_ID, "/status"))
        .await
        .unwrap();
    let reply = last_reply(&mut rx);

    assert!(reply.starts_with("2 pending post(s):"), "reply: {reply}");
    // local times at +03:00, earliest first
    let first = reply.find("2050-02-01 09:00").expect("earlier post listed");
    let second = reply.find("2050-03-01 18:30").expect("later post listed");
    assert!(first < second, "reply: {reply}");
    // 50 chars of text got truncated
    assert!(reply.contains('…'), "reply: {reply}");
}

#[tokio::test]
async fn test_status_alias_and_empty_schedule() {
    let dir = TempDir::new().unwrap();
    let (_store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule_status"))
        .await
        .unwrap();
    assert_eq!(last_reply(&mut rx), "No posts scheduled.");
}

#[tokio::test]
async fn test_non_operator_is_kept_out() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(4242, "/schedule 2050-01-15 18:30"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("operator only"));

    // plain text from a stranger gets no reply at all
    handler
        .handle_message(&text_message(4242, "just chatting"))
        .await
        .unwrap();
    assert!(drain(&mut rx).is_empty());

    // and no draft was created on their behalf
    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("No draft in progress"));
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn test_schedule_argument_errors() {
    let dir = TempDir::new().unwrap();
    let (_store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Format: /schedule YYYY-MM-DD HH:MM"));

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule banana"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Invalid date format"));

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2020-01-01 10:00"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("must be in the future"));
}

#[tokio::test]
async fn test_forwarded_channel_message_reports_chat_id() {
    let dir = TempDir::new().unwrap();
    let (_store, handler, mut rx) = setup(&dir);

    let origin = ForwardedChat {
        id: -1001234567890,
        name: "Release Feed".to_string(),
    };
    handler
        .handle_message(&forwarded_message(ADMIN_ID, origin))
        .await
        .unwrap();

    assert_eq!(
        last_reply(&mut rx),
        "ID of forwarded chat 'Release Feed': -1001234567890"
    );
}

#[tokio::test]
async fn test_second_schedule_restarts_the_draft() {
    let dir = TempDir::new().unwrap();
    let (store, handler, mut rx) = setup(&dir);

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2050-01-15 18:30"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "old text"))
        .await
        .unwrap();
    handler
        .handle_message(&media_message(ADMIN_ID, vec![photo("old")]))
        .await
        .unwrap();

    handler
        .handle_message(&text_message(ADMIN_ID, "/schedule 2050-06-01 12:00"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "new text"))
        .await
        .unwrap();
    handler
        .handle_message(&text_message(ADMIN_ID, "/done"))
        .await
        .unwrap();
    assert!(last_reply(&mut rx).contains("Post scheduled"));

    let posts = store.load();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].dispatch_at, ts("2050-06-01T09:00:00Z"));
    assert_eq!(posts[0].message_text, "new text");
    assert!(posts[0].media.is_empty());
}
