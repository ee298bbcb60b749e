//! SQLite pool construction.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::persistence::schema;
use crate::Result;

/// Shared handle to the ERP database.
pub type Database = SqlitePool;

/// Open (creating if missing) the database file at `path` and bootstrap
/// the schema.
///
/// # Errors
///
/// Returns `AppError::Db` if the pool cannot be created or the schema
/// bootstrap fails.
pub async fn connect(path: &Path) -> Result<Database> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    schema::bootstrap_schema(&pool).await?;
    info!(path = %path.display(), "database ready");
    Ok(pool)
}

/// Open an in-memory database for tests.
///
/// A single connection is mandatory: every in-memory SQLite connection
/// owns a separate database.
///
/// # Errors
///
/// Returns `AppError::Db` if the pool cannot be created or the schema
/// bootstrap fails.
pub async fn connect_memory() -> Result<Database> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}
