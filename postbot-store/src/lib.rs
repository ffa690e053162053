//! Store crate: durable persistence for scheduled posts.
//!
//! ## Modules
//!
//! - [`error`] – Store error types
//! - [`post`] – ScheduledPost model
//! - [`schedule_store`] – ScheduleStore (JSON file, atomic replace, legacy migration)

pub mod error;
pub mod post;
pub mod schedule_store;


pub use error::StoreError;
pub use post::{ScheduledPost, DEFAULT_POST_TEXT};
pub use schedule_store::{AppendOutcome, ScheduleStore};
