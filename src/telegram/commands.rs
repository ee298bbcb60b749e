//! Slash command handling.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use crate::orchestrator::flow;
use crate::persistence::EquipmentRepo;
use crate::telegram::{authorize, views, AppState};
use crate::Result;

const EQUIPMENT_LIST_LIMIT: i64 = 10;

/// Commands the bot registers with Telegram.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Start the bot and show the main menu.
    Start,
    /// List NR12-active equipment.
    Equipments,
    /// Show progress of the current checklist.
    Status,
    /// Discard the current checklist.
    Cancel,
    /// Resume a paused checklist.
    Continue,
    /// Show usage help.
    Help,
}

/// Register the command menu with Telegram so clients offer completion.
///
/// # Errors
///
/// Returns `AppError::Telegram` on API failure.
pub async fn register_menu(bot: &Bot) -> Result<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Handle one slash command after the permission gate.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure or `AppError::Db` on
/// lookup failure.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: AppState,
) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let Some((record, permissions)) = authorize(&bot, &state, chat_id, user).await? else {
        return Ok(());
    };
    info!(chat_id = chat_id.0, ?cmd, user_id = record.id, "command received");

    match cmd {
        Command::Start => {
            let first_name = record
                .first_name
                .clone()
                .unwrap_or_else(|| user.first_name.clone());
            bot.send_message(chat_id, views::welcome_message(&first_name))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(views::main_menu_keyboard(permissions))
                .await?;
        }
        Command::Equipments => {
            send_equipment_list(&bot, &state, chat_id).await?;
        }
        Command::Status => flow::send_status(&bot, &state, chat_id).await?,
        Command::Cancel => flow::cancel(&bot, &state, chat_id).await?,
        Command::Continue => flow::resume(&bot, &state, chat_id).await?,
        Command::Help => {
            bot.send_message(chat_id, views::help_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
    }
    Ok(())
}

/// Query and render the NR12-active equipment list.
///
/// A failed query is reported to the chat, not just to the log.
///
/// # Errors
///
/// Returns `AppError::Telegram` on send failure.
pub async fn send_equipment_list(bot: &Bot, state: &AppState, chat_id: ChatId) -> Result<()> {
    let repo = EquipmentRepo::new(state.db.clone());
    match repo.list_nr12_active(EQUIPMENT_LIST_LIMIT).await {
        Ok(listings) => {
            bot.send_message(chat_id, views::equipment_list_message(&listings))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Err(err) => {
            error!(chat_id = chat_id.0, %err, "equipment listing failed");
            bot.send_message(chat_id, views::equipment_list_failed_message())
                .await?;
        }
    }
    Ok(())
}
