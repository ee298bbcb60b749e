//! Configuration parsing, validation, and credential loading.
//!
//! Everything except the bot token comes from environment variables with
//! defaults matching the original deployment. The token is loaded at runtime
//! via OS keychain with an env-var fallback and is never read from a file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::{AppError, Result};

/// Token value left behind by the setup instructions; refusing it avoids
/// running against a non-existent bot.
pub const TOKEN_PLACEHOLDER: &str = "SEU_TOKEN_AQUI";

const DEFAULT_DB_PATH: &str = "db.sqlite3";
const DEFAULT_MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SESSION_TIMEOUT_MS: u64 = 2 * 60 * 60 * 1000;

/// Global configuration assembled from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the ERP `SQLite` database file.
    pub db_path: PathBuf,
    /// Maximum accepted photo size in bytes.
    pub max_photo_bytes: u64,
    /// Idle timeout after which a session is evicted.
    pub session_timeout: Duration,
    /// Telegram bot token (populated by [`Config::load_credentials`]).
    pub bot_token: String,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable fails to parse or validation
    /// fails.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Split out from [`Config::from_env`] so tests can supply variables
    /// without mutating the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable fails to parse or validation
    /// fails.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("DB_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let max_photo_bytes = parse_var(&lookup, "MAX_FILE_SIZE", DEFAULT_MAX_PHOTO_BYTES)?;
        let timeout_ms = parse_var(&lookup, "SESSION_TIMEOUT", DEFAULT_SESSION_TIMEOUT_MS)?;

        let config = Self {
            db_path,
            max_photo_bytes,
            session_timeout: Duration::from_millis(timeout_ms),
            bot_token: String::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the Telegram bot token from OS keychain with env-var fallback.
    ///
    /// Tries the `nr12-checklist-bot` keyring service first, then falls back
    /// to the `TELEGRAM_BOT_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides a token, or if
    /// the token is empty or still the setup placeholder.
    pub async fn load_credentials(&mut self) -> Result<()> {
        let token = load_credential("telegram_bot_token", "TELEGRAM_BOT_TOKEN").await?;
        if token.trim().is_empty() || token == TOKEN_PLACEHOLDER {
            return Err(AppError::Config(
                "telegram bot token is missing or still the placeholder".into(),
            ));
        }
        self.bot_token = token;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_photo_bytes == 0 {
            return Err(AppError::Config(
                "MAX_FILE_SIZE must be greater than zero".into(),
            ));
        }
        if self.session_timeout.is_zero() {
            return Err(AppError::Config(
                "SESSION_TIMEOUT must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Try OS keychain first via spawn_blocking (keyring is synchronous I/O).
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("nr12-checklist-bot", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    // Fallback to environment variable.
    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
