#![forbid(unsafe_code)]

//! `nr12-checklist-bot` — Telegram checklist bot binary.
//!
//! Bootstraps configuration, opens the ERP database, starts the idle
//! session reaper, and runs the Telegram long-polling dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use nr12_checklist_bot::orchestrator::{reaper, SessionStore};
use nr12_checklist_bot::persistence::{db, Database};
use nr12_checklist_bot::telegram::{self, views, AppState};
use nr12_checklist_bot::{AppError, Config, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "nr12-checklist-bot", about = "NR12 checklist bot for Telegram", version, long_about = None)]
struct Cli {
    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the database path from the environment.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("nr12-checklist-bot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = Config::from_env()?;
    if let Some(path) = args.db_path {
        config.db_path = path;
    }
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    startup_probe(&db).await;

    // ── Start session reaper ────────────────────────────
    let bot = Bot::new(config.bot_token.clone());
    if let Err(err) = telegram::commands::register_menu(&bot).await {
        warn!(%err, "command menu registration failed");
    }
    let sessions = Arc::new(SessionStore::new());
    let ct = CancellationToken::new();
    let reaper_handle = reaper::spawn_reaper_task(
        bot.clone(),
        Arc::clone(&sessions),
        config.session_timeout,
        reaper::REAPER_INTERVAL,
        ct.clone(),
    );
    info!("session reaper started");

    // ── Run the dispatcher until ctrl-c ─────────────────
    let state = AppState {
        config: Arc::clone(&config),
        db: Arc::clone(&db),
        sessions: Arc::clone(&sessions),
    };
    info!("bot dispatcher starting");
    Dispatcher::builder(bot.clone(), telegram::schema())
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!(?upd, "unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text("update handler error"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("shutdown requested");
    ct.cancel();

    graceful_shutdown(&bot, &sessions).await;

    db.close().await;
    if let Err(err) = reaper_handle.await {
        error!(%err, "reaper task join failed");
    }
    info!("nr12-checklist-bot shut down");

    Ok(())
}

/// Warn each chat with an in-flight checklist that the bot is going down.
/// Best effort; nothing is persisted.
async fn graceful_shutdown(bot: &Bot, sessions: &SessionStore) {
    let active = sessions.active_chats().await;
    if active.is_empty() {
        return;
    }
    info!(sessions = active.len(), "notifying active chats of shutdown");
    for chat_id in active {
        if let Err(err) = bot
            .send_message(ChatId(chat_id), views::maintenance_message())
            .await
        {
            warn!(chat_id, %err, "maintenance notice failed");
        }
    }
}

/// Log how many NR12-active equipment rows the database exposes, mostly to
/// catch pointing the bot at the wrong file.
async fn startup_probe(db: &Database) {
    let count: std::result::Result<(i64,), sqlx::Error> =
        sqlx::query_as("SELECT COUNT(*) FROM equipment WHERE nr12_active = 1")
            .fetch_one(db)
            .await;
    match count {
        Ok((count,)) if count > 0 => info!(count, "NR12-active equipment found"),
        Ok(_) => warn!("no NR12-active equipment in database"),
        Err(err) => warn!(%err, "equipment probe failed"),
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
