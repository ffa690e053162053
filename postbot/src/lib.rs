//! # Postbot application
//!
//! Telegram channel-post scheduler: the conversation handler assembles posts
//! (dispatch time, text, media) draft by draft, the store keeps them in one
//! JSON file, and a cron-driven dispatch run delivers the due ones.
//! Core types live in postbot-core, persistence in postbot-store; the
//! teloxide layer is confined to the `telegram` module.

pub mod config;
pub mod dispatch;
pub mod draft;
pub mod handlers;
pub mod runner;
pub mod telegram;

pub use config::Config;
pub use dispatch::{DispatchEngine, DispatchSummary};
pub use draft::{Draft, DraftState, DraftTable, FinishOutcome};
pub use handlers::ScheduleHandler;
pub use runner::{run_bot, run_dispatch};
pub use telegram::{run_polling, TelegramBotAdapter, TelegramMessageWrapper, TelegramUserWrapper};
