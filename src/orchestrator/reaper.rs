//! Idle session eviction.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::orchestrator::SessionStore;
use crate::telegram::views;

/// How often the store is swept for idle sessions.
pub const REAPER_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawn the background sweep evicting sessions idle past `timeout`.
///
/// Evicted chats get a best-effort notice; delivery failure never blocks
/// the sweep. The task runs until `cancel` fires.
pub fn spawn_reaper_task(
    bot: Bot,
    sessions: Arc<SessionStore>,
    timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip the immediate first tick.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("session reaper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    sweep(&bot, &sessions, timeout).await;
                }
            }
        }
    })
}

async fn sweep(bot: &Bot, sessions: &SessionStore, timeout: Duration) {
    let expired = sessions.take_expired(timeout).await;
    if expired.is_empty() {
        debug!("no idle sessions to evict");
        return;
    }
    info!(evicted = expired.len(), "evicting idle sessions");
    for session in expired {
        let chat_id = ChatId(session.chat_id);
        let notice = views::session_evicted_message(&session.snapshot.equipment.name);
        if let Err(err) = bot
            .send_message(chat_id, notice)
            .parse_mode(ParseMode::Markdown)
            .await
        {
            warn!(chat_id = session.chat_id, %err, "eviction notice failed");
        }
    }
}
