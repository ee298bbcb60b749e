//! Equipment and checklist snapshot types.
//!
//! A [`ChecklistSnapshot`] is assembled once when a session starts and is
//! fully self-contained: the session never re-queries the database mid-flow.

use serde::{Deserialize, Serialize};

/// Equipment metadata joined with its category name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentInfo {
    /// Primary key.
    pub id: i64,
    /// Equipment display name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Manufacturer brand.
    pub brand: Option<String>,
    /// Model designation.
    pub model: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Category name, when the equipment is categorized.
    pub category: Option<String>,
}

/// Checklist header associated with an equipment category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistInfo {
    /// Primary key.
    pub id: i64,
    /// Checklist display name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// One inspection item within a checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Primary key.
    pub id: i64,
    /// Explicit presentation order.
    pub order_index: i64,
    /// What to inspect.
    pub description: String,
    /// Optional inspection instructions.
    pub instructions: Option<String>,
    /// Whether the item is mandatory under NR12.
    pub is_mandatory: bool,
}

/// Immutable equipment + checklist snapshot loaded at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistSnapshot {
    /// Equipment under inspection.
    pub equipment: EquipmentInfo,
    /// Checklist header.
    pub checklist: ChecklistInfo,
    /// Items ordered by `order_index`, ties broken by retrieval order.
    pub items: Vec<ChecklistItem>,
}

impl ChecklistSnapshot {
    /// Number of items in the checklist.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.items.len()
    }
}

/// Compact equipment row for the `/equipments` listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentListing {
    /// Primary key.
    pub id: i64,
    /// Equipment display name.
    pub name: String,
    /// Manufacturer brand.
    pub brand: Option<String>,
    /// Model designation.
    pub model: Option<String>,
    /// Category name.
    pub category: Option<String>,
}
