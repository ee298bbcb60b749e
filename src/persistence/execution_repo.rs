//! Transactional write of a completed checklist execution.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::models::session::ChecklistSession;
use crate::persistence::Database;
use crate::{AppError, Result};

/// Outcome of a successful execution write, echoed back to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Primary key of the inserted execution row.
    pub execution_id: i64,
    /// Conformity rate in percent.
    pub completion_rate: u32,
    /// Inspection duration in minutes.
    pub duration_minutes: i64,
}

/// Repository writing executions, responses, and photos. Cheap to clone.
#[derive(Clone)]
pub struct ExecutionRepo {
    pool: Arc<Database>,
}

impl ExecutionRepo {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: Arc<Database>) -> Self {
        Self { pool }
    }

    /// Persist a finished session as one execution row plus its responses
    /// and photos, all inside a single transaction.
    ///
    /// The session itself is not consumed: on failure the caller keeps it
    /// alive and may retry, which re-runs the whole insert. The UNIQUE
    /// constraint on `session_id` makes an accidental double save fail
    /// loudly instead of duplicating data.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` on any insert failure; the
    /// transaction is rolled back and no partial rows remain.
    pub async fn persist(&self, session: &ChecklistSession) -> Result<ExecutionSummary> {
        let finished_at = Utc::now();
        let stats = session.stats();
        let duration_minutes = session.duration_minutes(finished_at);
        let notes = if session.observations.is_empty() {
            None
        } else {
            Some(
                session
                    .observations
                    .iter()
                    .map(|obs| obs.text.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };
        let user_name = display_name(session);

        let mut tx = self.pool.begin().await.map_err(persistence_err)?;

        let result = sqlx::query(
            "INSERT INTO checklist_executions
                (session_id, equipment_id, checklist_id, user_telegram_id, user_name,
                 start_time, end_time, duration_minutes, total_items,
                 ok_items, nok_items, skipped_items, completion_rate, notes, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 'completed')",
        )
        .bind(&session.session_id)
        .bind(session.snapshot.equipment.id)
        .bind(session.snapshot.checklist.id)
        .bind(&session.user_id)
        .bind(&user_name)
        .bind(session.start_time.to_rfc3339())
        .bind(finished_at.to_rfc3339())
        .bind(duration_minutes)
        .bind(i64::try_from(stats.total).unwrap_or(i64::MAX))
        .bind(i64::try_from(stats.ok).unwrap_or(i64::MAX))
        .bind(i64::try_from(stats.nok).unwrap_or(i64::MAX))
        .bind(i64::try_from(stats.skipped).unwrap_or(i64::MAX))
        .bind(i64::from(stats.completion_rate))
        .bind(notes)
        .execute(&mut *tx)
        .await
        .map_err(persistence_err)?;
        let execution_id = result.last_insert_rowid();

        for response in &session.responses {
            // Notes entered while this item was current travel with its row.
            let item_notes = item_observations(session, response.item_index);
            sqlx::query(
                "INSERT INTO checklist_responses
                    (execution_id, item_index, item_description, status,
                     response_time, observations)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(execution_id)
            .bind(i64::try_from(response.item_index).unwrap_or(i64::MAX))
            .bind(&response.item_description)
            .bind(response.status.as_str())
            .bind(response.timestamp.to_rfc3339())
            .bind(item_notes)
            .execute(&mut *tx)
            .await
            .map_err(persistence_err)?;
        }

        for photo in &session.photos {
            let file_path = format!("photos/{}_{}.jpg", session.session_id, photo.item_index);
            sqlx::query(
                "INSERT INTO checklist_photos
                    (execution_id, item_index, file_id, file_path, caption,
                     size_bytes, taken_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(execution_id)
            .bind(i64::try_from(photo.item_index).unwrap_or(i64::MAX))
            .bind(&photo.file_id)
            .bind(file_path)
            .bind(&photo.caption)
            .bind(i64::try_from(photo.size_bytes).unwrap_or(i64::MAX))
            .bind(photo.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(persistence_err)?;
        }

        tx.commit().await.map_err(persistence_err).inspect_err(|err| {
            error!(session_id = %session.session_id, %err, "execution commit failed");
        })?;

        info!(
            session_id = %session.session_id,
            execution_id,
            responses = session.responses.len(),
            photos = session.photos.len(),
            "execution persisted"
        );
        Ok(ExecutionSummary {
            execution_id,
            completion_rate: stats.completion_rate,
            duration_minutes,
        })
    }
}

fn item_observations(session: &ChecklistSession, item_index: usize) -> Option<String> {
    let notes: Vec<&str> = session
        .observations
        .iter()
        .filter(|obs| obs.item_index == item_index)
        .map(|obs| obs.text.as_str())
        .collect();
    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}

fn display_name(session: &ChecklistSession) -> String {
    let info = &session.user_info;
    match (&info.first_name, &info.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.clone(),
        _ => info.username.clone().unwrap_or_else(|| session.user_id.clone()),
    }
}

fn persistence_err(err: sqlx::Error) -> AppError {
    AppError::Persistence(err.to_string())
}
