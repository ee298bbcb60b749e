//! Permission gate in front of every bot interaction.
//!
//! Access is fail-closed: a database error during the lookup denies access
//! rather than letting the interaction through.

use tracing::{debug, warn};

use crate::models::user::{Permissions, Role, UserRecord};
use crate::persistence::UserRepo;

/// Result of an authorization check.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    /// Whether the interaction may proceed.
    pub allowed: bool,
    /// User-facing denial reason (Portuguese), empty when allowed.
    pub reason: String,
    /// The matched user record, when one exists.
    pub user: Option<UserRecord>,
    /// Capabilities derived from the user role, when allowed.
    pub permissions: Option<Permissions>,
}

impl AccessDecision {
    fn denied(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: reason.to_owned(),
            user: None,
            permissions: None,
        }
    }
}

/// Check whether the sender of an interaction is a registered, active user.
///
/// Matches by chat identifier or username. A registered user whose chat id
/// is not yet linked gets it linked on first contact, so later lookups hit
/// the unique `telegram_id` column directly.
pub async fn check_access(repo: &UserRepo, chat_id: i64, username: &str) -> AccessDecision {
    let chat_key = chat_id.to_string();
    let record = match repo.find_by_chat_or_username(&chat_key, username).await {
        Ok(record) => record,
        Err(err) => {
            warn!(chat_id, username, %err, "user lookup failed, denying access");
            return AccessDecision::denied("Erro na verificação de permissões. Tente novamente.");
        }
    };

    let Some(user) = record else {
        debug!(chat_id, username, "unregistered user");
        return AccessDecision::denied(
            "\u{26d4} Acesso negado. Usuário não cadastrado no ERP.\n\nSolicite seu cadastro ao administrador do sistema.",
        );
    };

    if !user.is_active || !user.bot_enabled {
        debug!(chat_id, username, user_id = user.id, "inactive user");
        return AccessDecision::denied(
            "\u{26d4} Acesso negado. Usuário inativo.\n\nContate o administrador do sistema.",
        );
    }

    if user.telegram_id.is_none() {
        if let Err(err) = repo.link_chat_id(user.id, &chat_key).await {
            warn!(user_id = user.id, %err, "chat id link failed");
        }
    }

    let role = Role::parse(user.role.as_deref());
    AccessDecision {
        allowed: true,
        reason: String::new(),
        permissions: Some(Permissions::for_role(role)),
        user: Some(user),
    }
}
