//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Query failure when interacting with `SQLite`.
    Db(String),
    /// Transactional execution write failure; the session survives for retry.
    Persistence(String),
    /// Telegram API or delivery failure.
    Telegram(String),
    /// User is absent or inactive and may not use the bot.
    AccessDenied(String),
    /// Equipment, checklist, or checklist items do not exist.
    NotFound(String),
    /// User-supplied content rejected (e.g. oversized photo).
    Validation(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::Persistence(msg) => write!(f, "persistence: {msg}"),
            Self::Telegram(msg) => write!(f, "telegram: {msg}"),
            Self::AccessDenied(msg) => write!(f, "access denied: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<teloxide::RequestError> for AppError {
    fn from(err: teloxide::RequestError) -> Self {
        Self::Telegram(err.to_string())
    }
}
