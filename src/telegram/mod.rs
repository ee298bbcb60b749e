//! Telegram transport: dispatch tree, command/message/callback handlers,
//! and chat rendering.

pub mod callbacks;
pub mod commands;
pub mod messages;
pub mod views;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::debug;

use crate::config::Config;
use crate::models::user::{Permissions, UserRecord};
use crate::orchestrator::SessionStore;
use crate::persistence::{Database, UserRepo};
use crate::{access, AppError, Result};

/// Shared handler state injected through the dispatcher dependency map.
#[derive(Clone)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<Config>,
    /// Database pool.
    pub db: Arc<Database>,
    /// Active checklist sessions.
    pub sessions: Arc<SessionStore>,
}

/// Build the update dispatch tree: commands, then plain messages, then
/// callback queries.
pub fn schema() -> UpdateHandler<AppError> {
    let command_branch = teloxide::filter_command::<commands::Command, _>()
        .endpoint(commands::handle_command);
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(command_branch)
                .endpoint(messages::handle_message),
        )
        .branch(Update::filter_callback_query().endpoint(callbacks::handle_callback))
}

/// Username used for registry lookups; falls back to the first name for
/// accounts without a public username.
#[must_use]
pub fn lookup_name(user: &User) -> String {
    user.username
        .clone()
        .unwrap_or_else(|| user.first_name.clone())
}

/// Run the permission gate for an interaction.
///
/// Sends the denial reason to the chat and returns `None` when access is
/// refused; otherwise returns the matched record and its capabilities.
///
/// # Errors
///
/// Returns `AppError::Telegram` if the denial reply cannot be sent.
pub async fn authorize(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    user: &User,
) -> Result<Option<(UserRecord, Permissions)>> {
    let repo = UserRepo::new(state.db.clone());
    let decision = access::check_access(&repo, chat_id.0, &lookup_name(user)).await;
    if !decision.allowed {
        debug!(chat_id = chat_id.0, "interaction denied");
        bot.send_message(chat_id, decision.reason).await?;
        return Ok(None);
    }
    match (decision.user, decision.permissions) {
        (Some(record), Some(permissions)) => Ok(Some((record, permissions))),
        _ => Ok(None),
    }
}
