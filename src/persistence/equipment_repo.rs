//! Read access to equipment, checklists, and checklist items.

use std::sync::Arc;

use crate::models::equipment::{
    ChecklistInfo, ChecklistItem, ChecklistSnapshot, EquipmentInfo, EquipmentListing,
};
use crate::persistence::Database;
use crate::{AppError, Result};

/// Repository over the ERP equipment catalog. Cheap to clone.
#[derive(Clone)]
pub struct EquipmentRepo {
    pool: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct EquipmentRow {
    id: i64,
    name: String,
    description: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    category: Option<String>,
}

impl EquipmentRow {
    fn into_info(self) -> EquipmentInfo {
        EquipmentInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            brand: self.brand,
            model: self.model,
            serial_number: self.serial_number,
            category: self.category,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChecklistRow {
    id: i64,
    name: String,
    description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_index: i64,
    description: String,
    instructions: Option<String>,
    is_mandatory: i64,
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    name: String,
    brand: Option<String>,
    model: Option<String>,
    category: Option<String>,
}

impl EquipmentRepo {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: Arc<Database>) -> Self {
        Self { pool }
    }

    /// Assemble the full snapshot for an equipment: metadata, the checklist
    /// for its category, and the ordered items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the equipment is missing or not
    /// NR12-active, when its category has no checklist, or when the
    /// checklist has no items. Returns `AppError::Db` on query failure.
    pub async fn load_checklist_for(&self, equipment_id: i64) -> Result<ChecklistSnapshot> {
        let equipment: Option<EquipmentRow> = sqlx::query_as(
            "SELECT e.id, e.name, e.description, e.brand, e.model,
                    e.serial_number, c.name AS category
             FROM equipment e
             LEFT JOIN equipment_categories c ON c.id = e.category_id
             WHERE e.id = ?1 AND e.nr12_active = 1",
        )
        .bind(equipment_id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        let equipment = equipment
            .ok_or_else(|| {
                AppError::NotFound(format!("equipment {equipment_id} not found or not NR12-active"))
            })?
            .into_info();

        // One checklist per category; ties broken by lowest id.
        let checklist: Option<ChecklistRow> = sqlx::query_as(
            "SELECT id, name, description
             FROM checklists
             WHERE category_id = (SELECT category_id FROM equipment WHERE id = ?1)
             ORDER BY id
             LIMIT 1",
        )
        .bind(equipment_id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        let checklist = checklist.ok_or_else(|| {
            AppError::NotFound(format!(
                "no checklist configured for the category of equipment {equipment_id}"
            ))
        })?;

        let item_rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, order_index, description, instructions, is_mandatory
             FROM checklist_items
             WHERE checklist_id = ?1
             ORDER BY order_index, id",
        )
        .bind(checklist.id)
        .fetch_all(self.pool.as_ref())
        .await?;
        if item_rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "checklist {} has no items",
                checklist.id
            )));
        }

        Ok(ChecklistSnapshot {
            equipment,
            checklist: ChecklistInfo {
                id: checklist.id,
                name: checklist.name,
                description: checklist.description,
            },
            items: item_rows
                .into_iter()
                .map(|row| ChecklistItem {
                    id: row.id,
                    order_index: row.order_index,
                    description: row.description,
                    instructions: row.instructions,
                    is_mandatory: row.is_mandatory != 0,
                })
                .collect(),
        })
    }

    /// List NR12-active equipment for the `/equipments` command, sorted by
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on query failure.
    pub async fn list_nr12_active(&self, limit: i64) -> Result<Vec<EquipmentListing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            "SELECT e.id, e.name, e.brand, e.model, c.name AS category
             FROM equipment e
             LEFT JOIN equipment_categories c ON c.id = e.category_id
             WHERE e.nr12_active = 1
             ORDER BY e.name
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| EquipmentListing {
                id: row.id,
                name: row.name,
                brand: row.brand,
                model: row.model,
                category: row.category,
            })
            .collect())
    }
}
