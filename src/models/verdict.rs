//! Verdict status recorded for a single checklist item.

use serde::{Deserialize, Serialize};

/// Outcome recorded for one checklist item (conforme / não conforme / pulado).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Item conforms.
    Ok,
    /// Item does not conform; photo documentation is requested.
    Nok,
    /// Item was skipped by the inspector.
    Skip,
}

impl VerdictStatus {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Nok => "nok",
            Self::Skip => "skip",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ok" => Some(Self::Ok),
            "nok" => Some(Self::Nok),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// Map inline-keyboard callback data to a verdict.
    #[must_use]
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "item_ok" => Some(Self::Ok),
            "item_nok" => Some(Self::Nok),
            "item_skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// User-facing label shown in chat acknowledgments.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "\u{2705} CONFORME",
            Self::Nok => "\u{274c} NÃO CONFORME",
            Self::Skip => "\u{23ed}\u{fe0f} PULADO",
        }
    }
}
