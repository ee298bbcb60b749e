//! Schema bootstrap for the ERP tables the bot reads and writes.
//!
//! `CREATE TABLE IF NOT EXISTS` throughout, so running against an
//! existing ERP database is a no-op.

use tracing::debug;

use crate::persistence::Database;
use crate::Result;

const DDL: &str = r"
CREATE TABLE IF NOT EXISTS telegram_users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id TEXT UNIQUE,
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    bot_enabled INTEGER NOT NULL DEFAULT 1,
    role TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS equipment_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS equipment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    brand TEXT,
    model TEXT,
    serial_number TEXT,
    category_id INTEGER REFERENCES equipment_categories(id),
    nr12_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS checklists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    category_id INTEGER REFERENCES equipment_categories(id)
);

CREATE TABLE IF NOT EXISTS checklist_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checklist_id INTEGER NOT NULL REFERENCES checklists(id),
    order_index INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL,
    instructions TEXT,
    is_mandatory INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS checklist_executions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL UNIQUE,
    equipment_id INTEGER NOT NULL REFERENCES equipment(id),
    checklist_id INTEGER NOT NULL REFERENCES checklists(id),
    user_telegram_id TEXT NOT NULL,
    user_name TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL DEFAULT 0,
    total_items INTEGER NOT NULL DEFAULT 0,
    ok_items INTEGER NOT NULL DEFAULT 0,
    nok_items INTEGER NOT NULL DEFAULT 0,
    skipped_items INTEGER NOT NULL DEFAULT 0,
    completion_rate INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'completed',
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS checklist_responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    execution_id INTEGER NOT NULL REFERENCES checklist_executions(id),
    item_index INTEGER NOT NULL,
    item_description TEXT NOT NULL,
    status TEXT NOT NULL,
    response_time TEXT NOT NULL,
    observations TEXT
);

CREATE TABLE IF NOT EXISTS checklist_photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    execution_id INTEGER NOT NULL REFERENCES checklist_executions(id),
    item_index INTEGER NOT NULL,
    file_id TEXT NOT NULL,
    file_path TEXT NOT NULL,
    caption TEXT,
    size_bytes INTEGER NOT NULL DEFAULT 0,
    taken_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_responses_execution
    ON checklist_responses(execution_id);
CREATE INDEX IF NOT EXISTS idx_photos_execution
    ON checklist_photos(execution_id);
CREATE INDEX IF NOT EXISTS idx_items_checklist
    ON checklist_items(checklist_id, order_index);
";

/// Create any missing tables and indexes.
///
/// # Errors
///
/// Returns `AppError::Db` on DDL failure.
pub async fn bootstrap_schema(pool: &Database) -> Result<()> {
    sqlx::raw_sql(DDL).execute(pool).await?;
    debug!("schema bootstrap complete");
    Ok(())
}
