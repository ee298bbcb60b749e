//! Checklist session model and state machine.
//!
//! One session exists per chat while an inspection is in progress. The
//! session owns the immutable [`ChecklistSnapshot`] and a cursor over its
//! items; verdicts, observations, and photos accumulate as append-only
//! sequences until the session is finalized, cancelled, or evicted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::equipment::{ChecklistItem, ChecklistSnapshot};
use crate::models::verdict::VerdictStatus;
use crate::{AppError, Result};

/// Identity details of the inspecting Telegram user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    /// Telegram username, when set.
    pub username: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

/// One recorded verdict. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    /// Index of the item the verdict applies to.
    pub item_index: usize,
    /// Item description captured at verdict time.
    pub item_description: String,
    /// Recorded verdict.
    pub status: VerdictStatus,
    /// When the verdict was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Free-text note tagged with the item index active at entry time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    /// Cursor value when the note was entered.
    pub item_index: usize,
    /// Note text.
    pub text: String,
    /// When the note was entered.
    pub timestamp: DateTime<Utc>,
}

/// Photo attached to a non-conforming item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Index of the item the photo documents.
    pub item_index: usize,
    /// Telegram file identifier.
    pub file_id: String,
    /// Optional caption sent with the photo.
    pub caption: Option<String>,
    /// File size in bytes as reported by Telegram.
    pub size_bytes: u64,
    /// When the photo arrived.
    pub timestamp: DateTime<Utc>,
}

/// Cursor position expressed as progress through the checklist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    /// Items answered so far.
    pub current: usize,
    /// Total item count.
    pub total: usize,
    /// `round(current / total * 100)`, 0 when the checklist is empty.
    pub percentage: u32,
}

/// Per-status counts and completion rate for a finished (or running) session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Verdicts recorded.
    pub total: usize,
    /// Conforming items.
    pub ok: usize,
    /// Non-conforming items.
    pub nok: usize,
    /// Skipped items.
    pub skipped: usize,
    /// `round(ok / total * 100)`, 0 when no verdicts exist.
    pub completion_rate: u32,
}

/// Result of recording a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictOutcome {
    /// Verdict appended and cursor advanced.
    Recorded {
        /// A NOK verdict was recorded; a photo should be collected before
        /// the next item is presented.
        needs_photo: bool,
        /// The cursor reached the end of the checklist.
        completed: bool,
    },
    /// Session is paused; the verdict was ignored.
    Paused,
    /// All items were already answered; nothing was recorded.
    AlreadyComplete,
}

/// Mutable per-chat state for one in-progress NR12 inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistSession {
    /// Telegram chat the session belongs to.
    pub chat_id: i64,
    /// External user identifier of the inspector.
    pub user_id: String,
    /// Inspector identity details.
    pub user_info: UserInfo,
    /// Immutable equipment + checklist snapshot.
    pub snapshot: ChecklistSnapshot,
    /// Cursor into `snapshot.items`; `items.len()` signals completion.
    pub current_item_index: usize,
    /// Verdicts, one appended per advance.
    pub responses: Vec<ItemResponse>,
    /// Free-text notes.
    pub observations: Vec<Observation>,
    /// Attached photos.
    pub photos: Vec<PhotoRecord>,
    /// Whether item advancement is suspended.
    pub is_paused: bool,
    /// The next free-text message is captured as an observation.
    pub awaiting_observation: bool,
    /// Item awaiting photo documentation after a NOK verdict.
    pub pending_photo_item: Option<usize>,
    /// Session start instant.
    pub start_time: DateTime<Utc>,
    /// Last inbound event instant; drives idle eviction.
    pub last_activity: DateTime<Utc>,
    /// External key persisted with the execution, derived from the chat
    /// identifier and creation instant.
    pub session_id: String,
}

impl ChecklistSession {
    /// Start a new session at cursor 0.
    #[must_use]
    pub fn new(chat_id: i64, user_id: String, user_info: UserInfo, snapshot: ChecklistSnapshot) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            user_id,
            user_info,
            snapshot,
            current_item_index: 0,
            responses: Vec::new(),
            observations: Vec::new(),
            photos: Vec::new(),
            is_paused: false,
            awaiting_observation: false,
            pending_photo_item: None,
            start_time: now,
            last_activity: now,
            session_id: format!("{chat_id}_{}", now.timestamp_millis()),
        }
    }

    /// Refresh the last-activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// The item the cursor points at, or `None` once the checklist is done.
    #[must_use]
    pub fn current_item(&self) -> Option<&ChecklistItem> {
        self.snapshot.items.get(self.current_item_index)
    }

    /// Whether every item has received a verdict.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_item_index >= self.snapshot.items.len()
    }

    /// Record a verdict for the current item and advance the cursor.
    ///
    /// Ignored (reported, not fatal) while paused. A NOK verdict marks the
    /// answered item as the pending photo target; any other verdict clears
    /// the target.
    pub fn record_verdict(&mut self, status: VerdictStatus) -> VerdictOutcome {
        if self.is_paused {
            return VerdictOutcome::Paused;
        }
        // Stale keyboard presses can arrive after the last item was answered.
        let Some(item) = self.snapshot.items.get(self.current_item_index) else {
            return VerdictOutcome::AlreadyComplete;
        };

        let item_index = self.current_item_index;
        self.responses.push(ItemResponse {
            item_index,
            item_description: item.description.clone(),
            status,
            timestamp: Utc::now(),
        });
        self.current_item_index += 1;
        self.pending_photo_item = if status == VerdictStatus::Nok {
            Some(item_index)
        } else {
            None
        };
        self.touch();

        VerdictOutcome::Recorded {
            needs_photo: status == VerdictStatus::Nok,
            completed: self.is_complete(),
        }
    }

    /// Append a free-text observation tagged with the current cursor.
    pub fn add_observation(&mut self, text: impl Into<String>) {
        self.observations.push(Observation {
            item_index: self.current_item_index,
            text: text.into(),
            timestamp: Utc::now(),
        });
        self.touch();
    }

    /// Attach a photo, associating it with the pending NOK item.
    ///
    /// When no photo is pending (spontaneous upload), the photo falls back
    /// to the most recently answered item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `size_bytes` exceeds `max_bytes`.
    pub fn attach_photo(
        &mut self,
        file_id: String,
        caption: Option<String>,
        size_bytes: u64,
        max_bytes: u64,
    ) -> Result<usize> {
        if size_bytes > max_bytes {
            return Err(AppError::Validation(format!(
                "photo of {size_bytes} bytes exceeds the {max_bytes} byte limit"
            )));
        }
        let item_index = self
            .pending_photo_item
            .take()
            .unwrap_or_else(|| self.current_item_index.saturating_sub(1));
        self.photos.push(PhotoRecord {
            item_index,
            file_id,
            caption,
            size_bytes,
            timestamp: Utc::now(),
        });
        self.touch();
        Ok(item_index)
    }

    /// Drop the pending photo obligation (operator chose to continue).
    ///
    /// Returns whether an obligation existed.
    pub fn clear_pending_photo(&mut self) -> bool {
        self.touch();
        self.pending_photo_item.take().is_some()
    }

    /// Suspend item advancement. Returns `false` when already paused.
    pub fn pause(&mut self) -> bool {
        self.touch();
        if self.is_paused {
            return false;
        }
        self.is_paused = true;
        true
    }

    /// Resume item advancement. Returns `false` when not paused.
    pub fn resume(&mut self) -> bool {
        self.touch();
        if !self.is_paused {
            return false;
        }
        self.is_paused = false;
        true
    }

    /// Current progress through the checklist.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let total = self.snapshot.items.len();
        Progress {
            current: self.current_item_index,
            total,
            percentage: rounded_percentage(self.current_item_index, total),
        }
    }

    /// Per-status counts over the recorded verdicts.
    #[must_use]
    pub fn stats(&self) -> ExecutionStats {
        let total = self.responses.len();
        let ok = self.count_status(VerdictStatus::Ok);
        let nok = self.count_status(VerdictStatus::Nok);
        let skipped = self.count_status(VerdictStatus::Skip);
        ExecutionStats {
            total,
            ok,
            nok,
            skipped,
            completion_rate: rounded_percentage(ok, total),
        }
    }

    /// Minutes elapsed between session start and `end`, rounded.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn duration_minutes(&self, end: DateTime<Utc>) -> i64 {
        let seconds = end.signed_duration_since(self.start_time).num_seconds();
        (seconds as f64 / 60.0).round() as i64
    }

    /// Whether the session has been idle for longer than `timeout`.
    #[must_use]
    pub fn is_expired(&self, timeout: Duration) -> bool {
        Utc::now()
            .signed_duration_since(self.last_activity)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    fn count_status(&self, status: VerdictStatus) -> usize {
        self.responses.iter().filter(|r| r.status == status).count()
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
