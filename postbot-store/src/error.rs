//! Store error types.
//!
//! Only the write path fails; load recovers from every damaged-file shape
//! internally and never returns an error.

use thiserror::Error;

/// Errors that can occur when writing the schedule file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
