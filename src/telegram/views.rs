//! Chat message and inline-keyboard builders.
//!
//! Everything here is a pure function from domain state to user-facing
//! text (Portuguese) or keyboard markup, so the flow layer stays free of
//! string assembly and each rendering is unit-testable.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::equipment::{ChecklistItem, ChecklistSnapshot, EquipmentListing};
use crate::models::session::{ChecklistSession, Progress};
use crate::models::user::Permissions;
use crate::persistence::ExecutionSummary;

const PROGRESS_BAR_WIDTH: usize = 10;

/// Ten-segment progress bar, e.g. `███░░░░░░░`.
#[must_use]
pub fn progress_bar(current: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (current * PROGRESS_BAR_WIDTH) / total
    };
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    let mut bar = String::with_capacity(PROGRESS_BAR_WIDTH * 3);
    for _ in 0..filled {
        bar.push('\u{2588}');
    }
    for _ in filled..PROGRESS_BAR_WIDTH {
        bar.push('\u{2591}');
    }
    bar
}

/// Greeting sent on `/start` after the permission gate passes.
#[must_use]
pub fn welcome_message(first_name: &str) -> String {
    format!(
        "\u{1f44b} Olá, *{first_name}*!\n\n\
         Bem-vindo ao *Bot de Checklist NR12*.\n\n\
         Para iniciar uma inspeção, digite o *ID do equipamento* \
         ou use os botões abaixo.",
    )
}

/// Main menu keyboard; report button only for users allowed to view reports.
#[must_use]
pub fn main_menu_keyboard(permissions: Permissions) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![InlineKeyboardButton::callback(
        "\u{1f4cb} Equipamentos",
        "list_equipments",
    )]];
    if permissions.can_view_reports {
        rows.push(vec![InlineKeyboardButton::callback(
            "\u{1f4ca} Relatórios",
            "view_reports",
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback("\u{2753} Ajuda", "help")]);
    InlineKeyboardMarkup::new(rows)
}

/// `/help` text listing commands and the inspection flow.
#[must_use]
pub fn help_message() -> String {
    "\u{2753} *Ajuda — Bot de Checklist NR12*\n\n\
     *Comandos:*\n\
     /start — iniciar o bot\n\
     /equipments — listar equipamentos ativos\n\
     /status — progresso do checklist atual\n\
     /continue — retomar um checklist pausado\n\
     /cancel — cancelar o checklist atual\n\
     /help — esta mensagem\n\n\
     *Fluxo de inspeção:*\n\
     1. Digite o ID do equipamento\n\
     2. Responda cada item com \u{2705}, \u{274c} ou \u{23ed}\u{fe0f}\n\
     3. Em caso de não conformidade, envie uma foto\n\
     4. Ao final, o resultado é gravado no ERP"
        .to_owned()
}

/// Listing of NR12-active equipment for `/equipments`.
#[must_use]
pub fn equipment_list_message(listings: &[EquipmentListing]) -> String {
    if listings.is_empty() {
        return "\u{1f4cb} Nenhum equipamento ativo para NR12 encontrado.".to_owned();
    }
    let mut text = String::from("\u{1f4cb} *Equipamentos ativos para NR12:*\n\n");
    for item in listings {
        text.push_str(&format!("*{}* — {}\n", item.id, item.name));
        let detail: Vec<&str> = [item.brand.as_deref(), item.model.as_deref(), item.category.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !detail.is_empty() {
            text.push_str(&format!("   _{}_\n", detail.join(" / ")));
        }
    }
    text.push_str("\nDigite o *ID* do equipamento para iniciar o checklist.");
    text
}

/// Header sent once when a checklist starts.
#[must_use]
pub fn checklist_started_message(snapshot: &ChecklistSnapshot) -> String {
    let equipment = &snapshot.equipment;
    let mut text = format!(
        "\u{1f527} *Checklist iniciado*\n\n\
         *Equipamento:* {}\n",
        equipment.name
    );
    if let Some(brand) = &equipment.brand {
        text.push_str(&format!("*Marca:* {brand}\n"));
    }
    if let Some(model) = &equipment.model {
        text.push_str(&format!("*Modelo:* {model}\n"));
    }
    if let Some(serial) = &equipment.serial_number {
        text.push_str(&format!("*Nº de série:* {serial}\n"));
    }
    if let Some(category) = &equipment.category {
        text.push_str(&format!("*Categoria:* {category}\n"));
    }
    text.push_str(&format!(
        "\n*Checklist:* {}\n*Itens:* {}",
        snapshot.checklist.name,
        snapshot.total_items()
    ));
    text
}

/// One checklist item with its position and progress bar.
#[must_use]
pub fn item_message(item: &ChecklistItem, progress: Progress) -> String {
    let mut text = format!(
        "\u{1f4dd} *Item {}/{}*\n{} {}%\n\n*{}*",
        progress.current + 1,
        progress.total,
        progress_bar(progress.current, progress.total),
        progress.percentage,
        item.description
    );
    if let Some(instructions) = &item.instructions {
        text.push_str(&format!("\n\n_{instructions}_"));
    }
    if !item.is_mandatory {
        text.push_str("\n\n(item opcional)");
    }
    text
}

/// Verdict keyboard shown under every item.
#[must_use]
pub fn verdict_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("\u{2705} Conforme", "item_ok"),
            InlineKeyboardButton::callback("\u{274c} Não conforme", "item_nok"),
            InlineKeyboardButton::callback("\u{23ed}\u{fe0f} Pular", "item_skip"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{1f4ac} Observação", "add_observation"),
            InlineKeyboardButton::callback("\u{23f8}\u{fe0f} Pausar", "pause_checklist"),
            InlineKeyboardButton::callback("\u{1f4ca} Status", "show_status"),
        ],
    ])
}

/// Acknowledgment replacing the item message after a verdict.
#[must_use]
pub fn verdict_ack(item_description: &str, status_label: &str) -> String {
    format!("{status_label}\n_{item_description}_")
}

/// Photo request sent after a NOK verdict.
#[must_use]
pub fn photo_prompt_message() -> String {
    "\u{1f4f8} *Não conformidade registrada.*\n\n\
     Envie uma *foto* do problema para documentar, \
     ou continue sem foto."
        .to_owned()
}

/// Keyboard allowing the inspector to proceed without a photo.
#[must_use]
pub fn continue_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{27a1}\u{fe0f} Continuar sem foto",
        "item_continue",
    )]])
}

/// Confirmation after a photo is attached.
#[must_use]
pub fn photo_received_message(item_number: usize) -> String {
    format!("\u{1f4f8} Foto registrada para o item {item_number}.")
}

/// Rejection for an oversized photo.
#[must_use]
pub fn photo_too_large_message(max_bytes: u64) -> String {
    let max_mb = max_bytes / (1024 * 1024);
    format!(
        "\u{26a0}\u{fe0f} Foto muito grande. O limite é de {max_mb} MB. \
         Envie uma foto menor."
    )
}

/// Prompt sent after the observation button is pressed.
#[must_use]
pub fn observation_prompt_message() -> String {
    "\u{1f4ac} Digite sua observação como mensagem de texto.".to_owned()
}

/// Confirmation after an observation is recorded.
#[must_use]
pub fn observation_recorded_message() -> String {
    "\u{1f4ac} Observação registrada.".to_owned()
}

/// Final summary after a successful save.
#[must_use]
pub fn summary_message(session: &ChecklistSession, summary: ExecutionSummary) -> String {
    let stats = session.stats();
    let mut text = format!(
        "\u{2705} *Checklist concluído!*\n\n\
         *Equipamento:* {}\n\
         *Execução:* #{}\n\n\
         \u{2705} Conformes: {}\n\
         \u{274c} Não conformes: {}\n\
         \u{23ed}\u{fe0f} Pulados: {}\n\
         \u{1f4f8} Fotos: {}\n\
         \u{1f4ac} Observações: {}\n\n\
         *Taxa de conformidade:* {}%\n\
         *Duração:* {} min",
        session.snapshot.equipment.name,
        summary.execution_id,
        stats.ok,
        stats.nok,
        stats.skipped,
        session.photos.len(),
        session.observations.len(),
        summary.completion_rate,
        summary.duration_minutes
    );
    if stats.nok > 0 {
        text.push_str(
            "\n\n\u{26a0}\u{fe0f} *Atenção:* não conformidades registradas. \
             Acione a manutenção.",
        );
    }
    text
}

/// Keyboard offering to start another checklist after a save.
#[must_use]
pub fn new_checklist_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1f195} Novo checklist",
        "new_checklist",
    )]])
}

/// Error notice when the execution write fails; the session is kept.
#[must_use]
pub fn save_failed_message() -> String {
    "\u{26a0}\u{fe0f} *Erro ao salvar o checklist.*\n\n\
     Suas respostas foram preservadas. Tente salvar novamente."
        .to_owned()
}

/// Keyboard offering a manual retry of the failed save.
#[must_use]
pub fn retry_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1f504} Tentar novamente",
        "retry_save",
    )]])
}

/// `/status` rendering of the current session.
#[must_use]
pub fn status_message(session: &ChecklistSession, elapsed_minutes: i64) -> String {
    let progress = session.progress();
    let stats = session.stats();
    let state = if session.is_paused {
        "\u{23f8}\u{fe0f} Pausado"
    } else {
        "\u{25b6}\u{fe0f} Em andamento"
    };
    format!(
        "\u{1f4ca} *Status do checklist*\n\n\
         *Equipamento:* {}\n\
         *Estado:* {}\n\
         *Progresso:* {}/{} ({}%)\n{}\n\n\
         \u{2705} {}  \u{274c} {}  \u{23ed}\u{fe0f} {}\n\
         \u{1f4f8} Fotos: {}  \u{1f4ac} Observações: {}\n\
         \u{23f1} Tempo decorrido: {} min",
        session.snapshot.equipment.name,
        state,
        progress.current,
        progress.total,
        progress.percentage,
        progress_bar(progress.current, progress.total),
        stats.ok,
        stats.nok,
        stats.skipped,
        session.photos.len(),
        session.observations.len(),
        elapsed_minutes
    )
}

/// Notice after pausing.
#[must_use]
pub fn paused_message() -> String {
    "\u{23f8}\u{fe0f} *Checklist pausado.*\n\nUse /continue para retomar.".to_owned()
}

/// Notice after resuming.
#[must_use]
pub fn resumed_message() -> String {
    "\u{25b6}\u{fe0f} *Checklist retomado.*".to_owned()
}

/// Notice after `/cancel`.
#[must_use]
pub fn cancelled_message(equipment_name: &str) -> String {
    format!(
        "\u{1f6ab} *Checklist cancelado.*\n\n\
         A inspeção de *{equipment_name}* foi descartada sem gravação."
    )
}

/// Reply when there is no active session for a session-bound action.
#[must_use]
pub fn no_session_message() -> String {
    "Nenhum checklist em andamento. Digite o ID de um equipamento para iniciar.".to_owned()
}

/// Reply when a button belongs to an expired or finished session.
#[must_use]
pub fn session_expired_message() -> String {
    "\u{231b} Sessão expirada. Digite o ID de um equipamento para iniciar um novo checklist.".to_owned()
}

/// Notice sent by the idle reaper before evicting a session.
#[must_use]
pub fn session_evicted_message(equipment_name: &str) -> String {
    format!(
        "\u{231b} *Sessão encerrada por inatividade.*\n\n\
         O checklist de *{equipment_name}* foi descartado sem gravação. \
         Digite o ID do equipamento para iniciar novamente."
    )
}

/// Reply when a chat tries to start a second checklist.
#[must_use]
pub fn busy_message(equipment_name: &str) -> String {
    format!(
        "\u{26a0}\u{fe0f} Já existe um checklist em andamento para *{equipment_name}*.\n\n\
         Use /status para ver o progresso ou /cancel para descartá-lo."
    )
}

/// Error notice when the equipment lookup itself fails (not a missing id).
#[must_use]
pub fn equipment_lookup_failed_message() -> String {
    "\u{26a0}\u{fe0f} Erro ao buscar equipamento. Tente novamente.".to_owned()
}

/// Error notice when the equipment listing query fails.
#[must_use]
pub fn equipment_list_failed_message() -> String {
    "\u{26a0}\u{fe0f} Erro ao buscar equipamentos. Tente novamente.".to_owned()
}

/// Placeholder reply for the reports button.
#[must_use]
pub fn reports_placeholder_message() -> String {
    "\u{1f4ca} Relatórios estão disponíveis no painel do ERP.".to_owned()
}

/// Maintenance notice sent to active chats during shutdown.
#[must_use]
pub fn maintenance_message() -> String {
    "\u{1f6e0} O bot está entrando em manutenção. \
     Seu checklist em andamento foi interrompido; \
     inicie novamente mais tarde."
        .to_owned()
}
