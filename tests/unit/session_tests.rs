//! Unit tests for the checklist session state machine.

use std::time::Duration;

use chrono::Utc;
use nr12_checklist_bot::models::equipment::{
    ChecklistInfo, ChecklistItem, ChecklistSnapshot, EquipmentInfo,
};
use nr12_checklist_bot::models::session::{ChecklistSession, UserInfo, VerdictOutcome};
use nr12_checklist_bot::models::verdict::VerdictStatus;
use nr12_checklist_bot::AppError;

fn snapshot_with_items(count: usize) -> ChecklistSnapshot {
    ChecklistSnapshot {
        equipment: EquipmentInfo {
            id: 7,
            name: "Prensa Hidráulica".to_owned(),
            description: None,
            brand: Some("Marca X".to_owned()),
            model: Some("PH-200".to_owned()),
            serial_number: None,
            category: Some("Prensas".to_owned()),
        },
        checklist: ChecklistInfo {
            id: 3,
            name: "Checklist NR12 Prensas".to_owned(),
            description: None,
        },
        items: (0..count)
            .map(|index| ChecklistItem {
                id: i64::try_from(index).unwrap() + 1,
                order_index: i64::try_from(index).unwrap(),
                description: format!("Item {index}"),
                instructions: None,
                is_mandatory: true,
            })
            .collect(),
    }
}

fn session_with_items(count: usize) -> ChecklistSession {
    ChecklistSession::new(
        42,
        "1001".to_owned(),
        UserInfo {
            username: Some("inspector".to_owned()),
            first_name: Some("Ana".to_owned()),
            last_name: None,
        },
        snapshot_with_items(count),
    )
}

#[test]
fn session_id_embeds_chat_id() {
    let session = session_with_items(1);
    assert!(session.session_id.starts_with("42_"));
}

#[test]
fn ok_verdict_appends_and_advances() {
    let mut session = session_with_items(3);
    let outcome = session.record_verdict(VerdictStatus::Ok);
    assert_eq!(
        outcome,
        VerdictOutcome::Recorded { needs_photo: false, completed: false }
    );
    assert_eq!(session.current_item_index, 1);
    assert_eq!(session.responses.len(), 1);
    assert_eq!(session.responses[0].item_index, 0);
    assert_eq!(session.responses[0].item_description, "Item 0");
    assert!(session.pending_photo_item.is_none());
}

#[test]
fn nok_verdict_requests_photo_for_answered_item() {
    let mut session = session_with_items(3);
    session.record_verdict(VerdictStatus::Ok);
    let outcome = session.record_verdict(VerdictStatus::Nok);
    assert_eq!(
        outcome,
        VerdictOutcome::Recorded { needs_photo: true, completed: false }
    );
    // The pending photo targets the item just answered, not the cursor.
    assert_eq!(session.pending_photo_item, Some(1));
    assert_eq!(session.current_item_index, 2);
}

#[test]
fn later_verdict_clears_stale_photo_obligation() {
    let mut session = session_with_items(3);
    session.record_verdict(VerdictStatus::Nok);
    assert_eq!(session.pending_photo_item, Some(0));
    session.record_verdict(VerdictStatus::Ok);
    assert!(session.pending_photo_item.is_none());
}

#[test]
fn final_verdict_reports_completion() {
    let mut session = session_with_items(2);
    session.record_verdict(VerdictStatus::Ok);
    let outcome = session.record_verdict(VerdictStatus::Skip);
    assert_eq!(
        outcome,
        VerdictOutcome::Recorded { needs_photo: false, completed: true }
    );
    assert!(session.is_complete());
    assert!(session.current_item().is_none());
}

#[test]
fn verdict_past_the_end_records_nothing() {
    let mut session = session_with_items(1);
    session.record_verdict(VerdictStatus::Ok);
    let outcome = session.record_verdict(VerdictStatus::Ok);
    assert_eq!(outcome, VerdictOutcome::AlreadyComplete);
    assert_eq!(session.responses.len(), 1);
    assert_eq!(session.current_item_index, 1);
}

#[test]
fn paused_session_ignores_verdicts() {
    let mut session = session_with_items(3);
    assert!(session.pause());
    let outcome = session.record_verdict(VerdictStatus::Ok);
    assert_eq!(outcome, VerdictOutcome::Paused);
    assert_eq!(session.current_item_index, 0);
    assert!(session.responses.is_empty());
}

#[test]
fn pause_and_resume_report_state_changes() {
    let mut session = session_with_items(1);
    assert!(!session.resume());
    assert!(session.pause());
    assert!(!session.pause());
    assert!(session.resume());
    assert!(!session.is_paused);
}

#[test]
fn photo_attaches_to_pending_item() {
    let mut session = session_with_items(3);
    session.record_verdict(VerdictStatus::Nok);
    let index = session
        .attach_photo("file-abc".to_owned(), Some("trinca".to_owned()), 512, 1024)
        .expect("photo");
    assert_eq!(index, 0);
    assert!(session.pending_photo_item.is_none());
    assert_eq!(session.photos.len(), 1);
    assert_eq!(session.photos[0].file_id, "file-abc");
}

#[test]
fn spontaneous_photo_falls_back_to_last_answered_item() {
    let mut session = session_with_items(3);
    session.record_verdict(VerdictStatus::Ok);
    session.record_verdict(VerdictStatus::Ok);
    let index = session
        .attach_photo("file-xyz".to_owned(), None, 10, 1024)
        .expect("photo");
    assert_eq!(index, 1);
}

#[test]
fn oversized_photo_is_rejected() {
    let mut session = session_with_items(1);
    session.record_verdict(VerdictStatus::Nok);
    let err = session
        .attach_photo("file-big".to_owned(), None, 2048, 1024)
        .expect_err("must reject");
    assert!(matches!(err, AppError::Validation(_)));
    assert!(session.photos.is_empty());
    // The obligation survives a rejected upload.
    assert_eq!(session.pending_photo_item, Some(0));
}

#[test]
fn clear_pending_photo_reports_whether_one_existed() {
    let mut session = session_with_items(2);
    assert!(!session.clear_pending_photo());
    session.record_verdict(VerdictStatus::Nok);
    assert!(session.clear_pending_photo());
    assert!(!session.clear_pending_photo());
}

#[test]
fn observations_tag_the_current_cursor() {
    let mut session = session_with_items(3);
    session.record_verdict(VerdictStatus::Ok);
    session.add_observation("ruído no motor");
    assert_eq!(session.observations.len(), 1);
    assert_eq!(session.observations[0].item_index, 1);
    assert_eq!(session.observations[0].text, "ruído no motor");
}

#[test]
fn progress_tracks_cursor() {
    let mut session = session_with_items(4);
    assert_eq!(session.progress().percentage, 0);
    session.record_verdict(VerdictStatus::Ok);
    let progress = session.progress();
    assert_eq!(progress.current, 1);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.percentage, 25);
}

#[test]
fn progress_of_empty_checklist_is_zero() {
    let session = session_with_items(0);
    assert_eq!(session.progress().percentage, 0);
    assert!(session.is_complete());
}

#[test]
fn stats_count_each_status() {
    let mut session = session_with_items(4);
    session.record_verdict(VerdictStatus::Ok);
    session.record_verdict(VerdictStatus::Nok);
    session.record_verdict(VerdictStatus::Skip);
    session.record_verdict(VerdictStatus::Ok);
    let stats = session.stats();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.ok, 2);
    assert_eq!(stats.nok, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.completion_rate, 50);
}

#[test]
fn completion_rate_rounds_to_an_integer() {
    let mut session = session_with_items(4);
    session.record_verdict(VerdictStatus::Ok);
    session.record_verdict(VerdictStatus::Nok);
    session.record_verdict(VerdictStatus::Ok);
    session.record_verdict(VerdictStatus::Ok);
    // 3 ok out of 4 responses.
    assert_eq!(session.stats().completion_rate, 75);
    assert!(session.stats().completion_rate <= 100);
}

#[test]
fn completion_rate_is_zero_without_responses() {
    let session = session_with_items(3);
    assert_eq!(session.stats().completion_rate, 0);
}

#[test]
fn duration_rounds_to_minutes() {
    let session = session_with_items(1);
    let end = session.start_time + chrono::Duration::seconds(150);
    assert_eq!(session.duration_minutes(end), 3);
    assert_eq!(session.duration_minutes(session.start_time), 0);
}

#[test]
fn fresh_session_is_not_expired() {
    let session = session_with_items(1);
    assert!(!session.is_expired(Duration::from_secs(3600)));
}

#[test]
fn idle_session_expires() {
    let mut session = session_with_items(1);
    session.last_activity = Utc::now() - chrono::Duration::hours(3);
    assert!(session.is_expired(Duration::from_secs(7200)));
    session.touch();
    assert!(!session.is_expired(Duration::from_secs(7200)));
}
