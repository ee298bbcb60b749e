//! Plain message handling: photos, observation capture, and equipment id
//! entry.

use teloxide::prelude::*;
use tracing::debug;

use crate::models::session::UserInfo;
use crate::models::user::UserRecord;
use crate::orchestrator::flow;
use crate::telegram::{authorize, AppState};
use crate::Result;

/// Handle a non-command message after the permission gate.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure or `AppError::Db` on
/// lookup failure.
pub async fn handle_message(bot: Bot, msg: Message, state: AppState) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let Some((record, _permissions)) = authorize(&bot, &state, chat_id, user).await? else {
        return Ok(());
    };

    if let Some(sizes) = msg.photo() {
        // Telegram sends ascending resolutions; keep the largest.
        if let Some(photo) = sizes.last() {
            return flow::handle_photo(
                &bot,
                &state,
                chat_id,
                photo.file.id.clone(),
                msg.caption().map(ToOwned::to_owned),
                u64::from(photo.file.size),
            )
            .await;
        }
        return Ok(());
    }

    let Some(text) = msg.text() else {
        debug!(chat_id = chat_id.0, "ignoring unsupported message kind");
        return Ok(());
    };
    // Unknown slash commands fall through the command filter; ignore them
    // rather than treating them as free text.
    if text.starts_with('/') {
        return Ok(());
    }

    let awaiting = state
        .sessions
        .with_mut(chat_id.0, |session| session.awaiting_observation)
        .await
        .unwrap_or(false);
    if awaiting {
        return flow::record_observation(&bot, &state, chat_id, text.to_owned()).await;
    }

    if let Ok(equipment_id) = text.trim().parse::<i64>() {
        let user_id = user.id.0.to_string();
        let info = session_user_info(&record, user);
        return flow::begin(&bot, &state, chat_id, user_id, info, equipment_id).await;
    }

    bot.send_message(
        chat_id,
        "Não entendi. Digite o *ID do equipamento* para iniciar um checklist, \
         ou use /help.",
    )
    .parse_mode(teloxide::types::ParseMode::Markdown)
    .await?;
    Ok(())
}

/// Inspector identity for a new session: registry names first, Telegram
/// profile as fallback.
fn session_user_info(record: &UserRecord, user: &teloxide::types::User) -> UserInfo {
    UserInfo {
        username: record.username.clone().or_else(|| user.username.clone()),
        first_name: record
            .first_name
            .clone()
            .or_else(|| Some(user.first_name.clone())),
        last_name: record.last_name.clone().or_else(|| user.last_name.clone()),
    }
}
