//! # postbot-core
//!
//! Core types and traits for the post scheduler: [`Bot`], message, user and media
//! types, the error taxonomy, and tracing initialization. Transport-agnostic;
//! the teloxide layer lives in the `postbot` application crate.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{PostbotError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, ForwardedChat, MediaItem, MediaKind, Message, OutboundMedia, ToCoreMessage, ToCoreUser,
    User,
};
