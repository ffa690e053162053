use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostbotError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Bot error: {0}")]
    Bot(String),
}

pub type Result<T> = std::result::Result<T, PostbotError>;
