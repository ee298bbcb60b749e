//! User records and derived bot capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ERP user row as stored in `telegram_users`.
///
/// Two independent active flags exist (`is_active` from the ERP account,
/// `bot_enabled` for bot usage); both must be set for access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Primary key.
    pub id: i64,
    /// External Telegram chat identifier, when linked.
    pub telegram_id: Option<String>,
    /// ERP username.
    pub username: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// ERP account active flag.
    pub is_active: bool,
    /// Bot usage enabled flag.
    pub bot_enabled: bool,
    /// Raw role string (e.g. "Administrador Bot", "operator").
    pub role: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Enumerated role derived from the stored role string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrative role.
    Admin,
    /// Regular inspector role.
    Operator,
}

impl Role {
    /// Derive the role from the stored string.
    ///
    /// Role names are localized free text in the ERP ("Administrador Bot"),
    /// so any case-insensitive occurrence of "admin" maps to [`Role::Admin`];
    /// everything else, including an absent role, is [`Role::Operator`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.to_lowercase().contains("admin") => Self::Admin,
            _ => Self::Operator,
        }
    }
}

/// Capability set granted to an authorized user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    /// May start checklist executions.
    pub can_create_checklist: bool,
    /// May view execution reports.
    pub can_view_reports: bool,
    /// Has the administrative role.
    pub is_admin: bool,
}

impl Permissions {
    /// Derive the capability set for a role.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            can_create_checklist: true,
            can_view_reports: true,
            is_admin: role == Role::Admin,
        }
    }
}
