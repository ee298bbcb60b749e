//! Unit tests for the in-memory session store.

use std::time::Duration;

use chrono::Utc;
use nr12_checklist_bot::models::equipment::{
    ChecklistInfo, ChecklistItem, ChecklistSnapshot, EquipmentInfo,
};
use nr12_checklist_bot::models::session::{ChecklistSession, UserInfo};
use nr12_checklist_bot::models::verdict::VerdictStatus;
use nr12_checklist_bot::orchestrator::{CreateOutcome, SessionStore};

fn sample_session(chat_id: i64) -> ChecklistSession {
    ChecklistSession::new(
        chat_id,
        "2002".to_owned(),
        UserInfo::default(),
        ChecklistSnapshot {
            equipment: EquipmentInfo {
                id: 1,
                name: "Serra Fita".to_owned(),
                description: None,
                brand: None,
                model: None,
                serial_number: None,
                category: None,
            },
            checklist: ChecklistInfo {
                id: 1,
                name: "Checklist Serra".to_owned(),
                description: None,
            },
            items: vec![ChecklistItem {
                id: 1,
                order_index: 0,
                description: "Proteção da lâmina".to_owned(),
                instructions: None,
                is_mandatory: true,
            }],
        },
    )
}

#[tokio::test]
async fn create_stores_first_session() {
    let store = SessionStore::new();
    assert!(matches!(
        store.create(sample_session(1)).await,
        CreateOutcome::Created
    ));
    assert!(store.contains(1).await);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn second_create_for_same_chat_is_busy() {
    let store = SessionStore::new();
    store.create(sample_session(1)).await;
    match store.create(sample_session(1)).await {
        CreateOutcome::Busy(existing) => {
            assert_eq!(existing.chat_id, 1);
        }
        CreateOutcome::Created => panic!("second session must be rejected"),
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn different_chats_are_independent() {
    let store = SessionStore::new();
    store.create(sample_session(1)).await;
    store.create(sample_session(2)).await;
    assert_eq!(store.len().await, 2);
    let mut chats = store.active_chats().await;
    chats.sort_unstable();
    assert_eq!(chats, vec![1, 2]);
}

#[tokio::test]
async fn with_mut_mutates_under_the_lock() {
    let store = SessionStore::new();
    store.create(sample_session(5)).await;
    let outcome = store
        .with_mut(5, |session| session.record_verdict(VerdictStatus::Ok))
        .await;
    assert!(outcome.is_some());
    let session = store.snapshot(5).await.expect("session");
    assert_eq!(session.responses.len(), 1);
}

#[tokio::test]
async fn with_mut_on_missing_chat_returns_none() {
    let store = SessionStore::new();
    let outcome = store.with_mut(99, |_| ()).await;
    assert!(outcome.is_none());
}

#[tokio::test]
async fn remove_returns_the_session() {
    let store = SessionStore::new();
    store.create(sample_session(7)).await;
    let removed = store.remove(7).await.expect("session");
    assert_eq!(removed.chat_id, 7);
    assert!(!store.contains(7).await);
    assert!(store.remove(7).await.is_none());
}

#[tokio::test]
async fn take_expired_evicts_only_idle_sessions() {
    let store = SessionStore::new();
    let mut stale = sample_session(1);
    stale.last_activity = Utc::now() - chrono::Duration::hours(5);
    store.create(stale).await;
    store.create(sample_session(2)).await;

    let expired = store.take_expired(Duration::from_secs(7200)).await;
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].chat_id, 1);
    assert!(!store.contains(1).await);
    assert!(store.contains(2).await);
}

#[tokio::test]
async fn paused_sessions_are_evicted_too() {
    let store = SessionStore::new();
    let mut stale = sample_session(3);
    stale.pause();
    stale.last_activity = Utc::now() - chrono::Duration::hours(5);
    store.create(stale).await;

    let expired = store.take_expired(Duration::from_secs(7200)).await;
    assert_eq!(expired.len(), 1);
    assert!(expired[0].is_paused);
    assert!(!store.contains(3).await);
}

#[tokio::test]
async fn empty_store_reports_empty() {
    let store = SessionStore::new();
    assert!(store.is_empty().await);
    assert!(store.take_expired(Duration::from_secs(1)).await.is_empty());
}
