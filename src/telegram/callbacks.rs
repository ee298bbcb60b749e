//! Inline-keyboard callback handling.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, warn};

use crate::models::verdict::VerdictStatus;
use crate::orchestrator::flow;
use crate::telegram::{authorize, commands, views, AppState};
use crate::Result;

/// Handle one inline-keyboard press.
///
/// The query is acknowledged up front so the client stops its spinner even
/// when the action itself fails later.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure or `AppError::Db` on
/// lookup failure.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: AppState) -> Result<()> {
    if let Err(err) = bot.answer_callback_query(q.id.clone()).await {
        warn!(%err, "callback acknowledgment failed");
    }

    let Some(message) = &q.message else {
        debug!("callback without originating message, ignoring");
        return Ok(());
    };
    let chat_id = message.chat.id;
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    if authorize(&bot, &state, chat_id, &q.from).await?.is_none() {
        return Ok(());
    }

    if let Some(status) = VerdictStatus::from_callback(data) {
        return flow::process_verdict(&bot, &state, chat_id, Some(message.id), status).await;
    }

    match data {
        "item_continue" => flow::continue_after_nok(&bot, &state, chat_id).await,
        "pause_checklist" => flow::pause(&bot, &state, chat_id).await,
        "add_observation" => flow::request_observation(&bot, &state, chat_id).await,
        "show_status" => flow::send_status(&bot, &state, chat_id).await,
        "retry_save" => flow::finalize(&bot, &state, chat_id).await,
        "list_equipments" => commands::send_equipment_list(&bot, &state, chat_id).await,
        "view_reports" => {
            bot.send_message(chat_id, views::reports_placeholder_message())
                .await?;
            Ok(())
        }
        "help" => {
            bot.send_message(chat_id, views::help_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(())
        }
        "new_checklist" => {
            bot.send_message(
                chat_id,
                "Digite o *ID do equipamento* para iniciar um novo checklist.",
            )
            .parse_mode(ParseMode::Markdown)
            .await?;
            Ok(())
        }
        other => {
            debug!(chat_id = chat_id.0, data = other, "unknown callback data");
            Ok(())
        }
    }
}
