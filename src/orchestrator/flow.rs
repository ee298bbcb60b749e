//! Checklist interaction flow.
//!
//! Each function advances the per-chat session in response to one inbound
//! event and sends the matching chat replies. The flow is event-gated: the
//! next item is presented immediately after a conforming or skipped
//! verdict, while a non-conforming verdict withholds it until a photo
//! arrives or the inspector explicitly continues without one.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use tracing::{error, info, warn};

use crate::models::session::{ChecklistSession, UserInfo, VerdictOutcome};
use crate::models::verdict::VerdictStatus;
use crate::orchestrator::CreateOutcome;
use crate::persistence::{EquipmentRepo, ExecutionRepo};
use crate::telegram::views;
use crate::telegram::AppState;
use crate::{AppError, Result};

/// Start a checklist for an equipment id typed into the chat.
///
/// Lookup failures of any kind are rendered to the chat; only send
/// failures propagate.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn begin(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    user_id: String,
    user_info: UserInfo,
    equipment_id: i64,
) -> Result<()> {
    let repo = EquipmentRepo::new(state.db.clone());
    let snapshot = match repo.load_checklist_for(equipment_id).await {
        Ok(snapshot) => snapshot,
        Err(AppError::NotFound(reason)) => {
            info!(chat_id = chat_id.0, equipment_id, reason, "checklist start rejected");
            bot.send_message(
                chat_id,
                format!(
                    "\u{26a0}\u{fe0f} Equipamento *{equipment_id}* não encontrado ou sem \
                     checklist configurado.\n\nUse /equipments para ver a lista."
                ),
            )
            .parse_mode(ParseMode::Markdown)
            .await?;
            return Ok(());
        }
        Err(err) => {
            // Query failures get a chat reply too; only logging them would
            // leave the operator staring at silence.
            error!(chat_id = chat_id.0, equipment_id, %err, "equipment lookup failed");
            bot.send_message(chat_id, views::equipment_lookup_failed_message())
                .await?;
            return Ok(());
        }
    };

    let session = ChecklistSession::new(chat_id.0, user_id, user_info, snapshot);
    let session_id = session.session_id.clone();
    let started = views::checklist_started_message(&session.snapshot);
    match state.sessions.create(session).await {
        CreateOutcome::Busy(existing) => {
            bot.send_message(chat_id, views::busy_message(&existing.snapshot.equipment.name))
                .parse_mode(ParseMode::Markdown)
                .await?;
            return Ok(());
        }
        CreateOutcome::Created => {
            info!(chat_id = chat_id.0, equipment_id, %session_id, "checklist started");
        }
    }

    bot.send_message(chat_id, started)
        .parse_mode(ParseMode::Markdown)
        .await?;
    present_current_item(bot, state, chat_id).await
}

/// Send the item at the cursor, or finalize when the checklist is done.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn present_current_item(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    let Some(session) = state.sessions.snapshot(chat_id.0).await else {
        bot.send_message(chat_id, views::no_session_message()).await?;
        return Ok(());
    };
    match session.current_item() {
        Some(item) => {
            bot.send_message(chat_id, views::item_message(item, session.progress()))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(views::verdict_keyboard())
                .await?;
            Ok(())
        }
        None => finalize(bot, state, chat_id).await,
    }
}

/// Record a verdict pressed on an item keyboard.
///
/// The pressed item message is edited into an acknowledgment so its
/// keyboard disappears and cannot be pressed twice.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn process_verdict(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    origin: Option<MessageId>,
    status: VerdictStatus,
) -> Result<()> {
    let recorded = state
        .sessions
        .with_mut(chat_id.0, |session| {
            let outcome = session.record_verdict(status);
            let description = session
                .responses
                .last()
                .map(|response| response.item_description.clone());
            (outcome, description)
        })
        .await;

    let Some((outcome, description)) = recorded else {
        bot.send_message(chat_id, views::session_expired_message()).await?;
        return Ok(());
    };

    match outcome {
        VerdictOutcome::Paused => {
            bot.send_message(chat_id, views::paused_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(())
        }
        VerdictOutcome::AlreadyComplete => {
            // All items answered; a photo may still be outstanding.
            let photo_pending = state
                .sessions
                .with_mut(chat_id.0, |session| session.pending_photo_item.is_some())
                .await
                .unwrap_or(false);
            if photo_pending {
                bot.send_message(chat_id, views::photo_prompt_message())
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(views::continue_keyboard())
                    .await?;
                Ok(())
            } else {
                finalize(bot, state, chat_id).await
            }
        }
        VerdictOutcome::Recorded { needs_photo, completed } => {
            if let (Some(message_id), Some(description)) = (origin, description) {
                let ack = views::verdict_ack(&description, status.label());
                if let Err(err) = bot
                    .edit_message_text(chat_id, message_id, ack)
                    .parse_mode(ParseMode::Markdown)
                    .await
                {
                    warn!(chat_id = chat_id.0, %err, "verdict ack edit failed");
                }
            }
            if needs_photo {
                bot.send_message(chat_id, views::photo_prompt_message())
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(views::continue_keyboard())
                    .await?;
                Ok(())
            } else if completed {
                finalize(bot, state, chat_id).await
            } else {
                present_current_item(bot, state, chat_id).await
            }
        }
    }
}

/// Attach an inbound photo to the pending non-conformity.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn handle_photo(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    file_id: String,
    caption: Option<String>,
    size_bytes: u64,
) -> Result<()> {
    let max_bytes = state.config.max_photo_bytes;
    let attached = state
        .sessions
        .with_mut(chat_id.0, |session| {
            session.attach_photo(file_id, caption, size_bytes, max_bytes)
        })
        .await;

    match attached {
        None => {
            bot.send_message(chat_id, views::no_session_message()).await?;
            Ok(())
        }
        Some(Err(AppError::Validation(reason))) => {
            info!(chat_id = chat_id.0, reason, "photo rejected");
            bot.send_message(chat_id, views::photo_too_large_message(max_bytes))
                .await?;
            Ok(())
        }
        Some(Err(err)) => Err(err),
        Some(Ok(item_index)) => {
            bot.send_message(chat_id, views::photo_received_message(item_index + 1))
                .await?;
            present_current_item(bot, state, chat_id).await
        }
    }
}

/// Resume the flow after the inspector chose to skip photo documentation.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn continue_after_nok(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    let cleared = state
        .sessions
        .with_mut(chat_id.0, ChecklistSession::clear_pending_photo)
        .await;
    if cleared.is_none() {
        bot.send_message(chat_id, views::session_expired_message()).await?;
        return Ok(());
    }
    present_current_item(bot, state, chat_id).await
}

/// Persist the finished session and report the result.
///
/// On write failure the session stays in the store untouched and the chat
/// gets a retry button, so no answers are lost.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn finalize(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    let Some(session) = state.sessions.snapshot(chat_id.0).await else {
        bot.send_message(chat_id, views::no_session_message()).await?;
        return Ok(());
    };

    let repo = ExecutionRepo::new(state.db.clone());
    match repo.persist(&session).await {
        Ok(summary) => {
            state.sessions.remove(chat_id.0).await;
            bot.send_message(chat_id, views::summary_message(&session, summary))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(views::new_checklist_keyboard())
                .await?;
            Ok(())
        }
        Err(err) => {
            error!(chat_id = chat_id.0, session_id = %session.session_id, %err, "execution save failed");
            bot.send_message(chat_id, views::save_failed_message())
                .parse_mode(ParseMode::Markdown)
                .reply_markup(views::retry_keyboard())
                .await?;
            Ok(())
        }
    }
}

/// Discard the chat's session without persisting anything.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn cancel(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    match state.sessions.remove(chat_id.0).await {
        Some(session) => {
            info!(chat_id = chat_id.0, session_id = %session.session_id, "checklist cancelled");
            bot.send_message(chat_id, views::cancelled_message(&session.snapshot.equipment.name))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        None => {
            bot.send_message(chat_id, views::no_session_message()).await?;
        }
    }
    Ok(())
}

/// Report the session's progress and per-status counts.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn send_status(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    match state.sessions.snapshot(chat_id.0).await {
        Some(session) => {
            let elapsed = session.duration_minutes(Utc::now());
            bot.send_message(chat_id, views::status_message(&session, elapsed))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        None => {
            bot.send_message(chat_id, views::no_session_message()).await?;
        }
    }
    Ok(())
}

/// Suspend item advancement until `/continue`.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn pause(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    match state.sessions.with_mut(chat_id.0, ChecklistSession::pause).await {
        Some(true) => {
            bot.send_message(chat_id, views::paused_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Some(false) => {
            bot.send_message(chat_id, "O checklist já está pausado.").await?;
        }
        None => {
            bot.send_message(chat_id, views::no_session_message()).await?;
        }
    }
    Ok(())
}

/// Resume a paused session and re-present the current item.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn resume(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    match state.sessions.with_mut(chat_id.0, ChecklistSession::resume).await {
        None => {
            bot.send_message(chat_id, views::no_session_message()).await?;
            Ok(())
        }
        Some(false) => {
            bot.send_message(chat_id, "O checklist não está pausado.").await?;
            Ok(())
        }
        Some(true) => {
            bot.send_message(chat_id, views::resumed_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
            present_current_item(bot, state, chat_id).await
        }
    }
}

/// Arm observation capture: the next text message becomes a note.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn request_observation(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    let armed = state
        .sessions
        .with_mut(chat_id.0, |session| {
            session.awaiting_observation = true;
            session.touch();
        })
        .await;
    if armed.is_none() {
        bot.send_message(chat_id, views::no_session_message()).await?;
        return Ok(());
    }
    bot.send_message(chat_id, views::observation_prompt_message()).await?;
    Ok(())
}

/// Store an observation captured from a text message, then put the current
/// item back in front of the inspector.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn record_observation(
    bot: &Bot,
    state: &AppState,
    chat_id: ChatId,
    text: String,
) -> Result<()> {
    let stored = state
        .sessions
        .with_mut(chat_id.0, |session| {
            session.awaiting_observation = false;
            session.add_observation(text);
            session.pending_photo_item.is_some() || session.is_complete()
        })
        .await;
    let Some(flow_held) = stored else {
        bot.send_message(chat_id, views::no_session_message()).await?;
        return Ok(());
    };
    bot.send_message(chat_id, views::observation_recorded_message()).await?;
    // Don't jump past an outstanding photo prompt or re-trigger finalize.
    if flow_held {
        return Ok(());
    }
    present_current_item(bot, state, chat_id).await
}
