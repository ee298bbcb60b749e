//! Integration tests for the transactional execution write.

use std::sync::Arc;

use nr12_checklist_bot::models::verdict::VerdictStatus;
use nr12_checklist_bot::persistence::ExecutionRepo;
use nr12_checklist_bot::AppError;

use super::helpers;

#[tokio::test]
async fn persist_writes_execution_responses_and_photos() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 3).await;
    session.record_verdict(VerdictStatus::Ok);
    session.record_verdict(VerdictStatus::Nok);
    session
        .attach_photo("file-1".to_owned(), Some("vazamento".to_owned()), 100, 1024)
        .expect("photo");
    session.add_observation("verificar na próxima parada");
    session.record_verdict(VerdictStatus::Skip);

    let repo = ExecutionRepo::new(Arc::clone(&db));
    let summary = repo.persist(&session).await.expect("persist");
    assert!(summary.execution_id > 0);
    // One of three items conformed.
    assert_eq!(summary.completion_rate, 33);

    let (session_id, ok_items, nok_items, skipped_items, notes, status): (
        String,
        i64,
        i64,
        i64,
        Option<String>,
        String,
    ) = sqlx::query_as(
        "SELECT session_id, ok_items, nok_items, skipped_items, notes, status
         FROM checklist_executions WHERE id = ?1",
    )
    .bind(summary.execution_id)
    .fetch_one(db.as_ref())
    .await
    .expect("execution row");
    assert_eq!(session_id, session.session_id);
    assert_eq!((ok_items, nok_items, skipped_items), (1, 1, 1));
    assert_eq!(notes.as_deref(), Some("verificar na próxima parada"));
    assert_eq!(status, "completed");

    let (responses,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM checklist_responses WHERE execution_id = ?1")
            .bind(summary.execution_id)
            .fetch_one(db.as_ref())
            .await
            .expect("count");
    assert_eq!(responses, 3);

    // The note was entered while item 2 was current, so it rides that row.
    let (observations,): (Option<String>,) = sqlx::query_as(
        "SELECT observations FROM checklist_responses
         WHERE execution_id = ?1 AND item_index = 2",
    )
    .bind(summary.execution_id)
    .fetch_one(db.as_ref())
    .await
    .expect("response row");
    assert_eq!(observations.as_deref(), Some("verificar na próxima parada"));

    let (file_id, file_path): (String, String) = sqlx::query_as(
        "SELECT file_id, file_path FROM checklist_photos WHERE execution_id = ?1",
    )
    .bind(summary.execution_id)
    .fetch_one(db.as_ref())
    .await
    .expect("photo row");
    assert_eq!(file_id, "file-1");
    assert_eq!(file_path, format!("photos/{}_1.jpg", session.session_id));
}

#[tokio::test]
async fn response_statuses_survive_the_round_trip() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 2).await;
    session.record_verdict(VerdictStatus::Nok);
    session.clear_pending_photo();
    session.record_verdict(VerdictStatus::Ok);

    let repo = ExecutionRepo::new(Arc::clone(&db));
    let summary = repo.persist(&session).await.expect("persist");

    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT item_index, status FROM checklist_responses
         WHERE execution_id = ?1 ORDER BY item_index",
    )
    .bind(summary.execution_id)
    .fetch_all(db.as_ref())
    .await
    .expect("rows");
    assert_eq!(rows, vec![(0, "nok".to_owned()), (1, "ok".to_owned())]);
}

#[tokio::test]
async fn failed_persist_leaves_no_partial_rows() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 1).await;
    session.record_verdict(VerdictStatus::Nok);
    session
        .attach_photo("file-1".to_owned(), None, 100, 1024)
        .expect("photo");

    // Force the photo insert to fail mid-transaction.
    sqlx::query("DROP TABLE checklist_photos")
        .execute(db.as_ref())
        .await
        .expect("drop");

    let repo = ExecutionRepo::new(Arc::clone(&db));
    let err = repo.persist(&session).await.expect_err("must fail");
    assert!(matches!(err, AppError::Persistence(_)));

    let (executions,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM checklist_executions WHERE session_id = ?1",
    )
    .bind(&session.session_id)
    .fetch_one(db.as_ref())
    .await
    .expect("count");
    assert_eq!(executions, 0, "rolled-back execution must not remain");

    let (responses,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM checklist_responses")
            .fetch_one(db.as_ref())
            .await
            .expect("count");
    assert_eq!(responses, 0, "rolled-back responses must not remain");
}

#[tokio::test]
async fn five_item_inspection_matches_the_expected_totals() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 5).await;
    for status in [
        VerdictStatus::Ok,
        VerdictStatus::Nok,
        VerdictStatus::Ok,
        VerdictStatus::Skip,
        VerdictStatus::Ok,
    ] {
        if status == VerdictStatus::Nok {
            session.record_verdict(status);
            session
                .attach_photo("file-nok".to_owned(), None, 200, 1024)
                .expect("photo");
        } else {
            session.record_verdict(status);
        }
    }

    let repo = ExecutionRepo::new(Arc::clone(&db));
    let summary = repo.persist(&session).await.expect("persist");
    // 3 conforming of 5 responses.
    assert_eq!(summary.completion_rate, 60);

    let (total, ok, nok, skipped): (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT total_items, ok_items, nok_items, skipped_items
         FROM checklist_executions WHERE id = ?1",
    )
    .bind(summary.execution_id)
    .fetch_one(db.as_ref())
    .await
    .expect("execution row");
    assert_eq!((total, ok, nok, skipped), (5, 3, 1, 1));

    let (photos,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM checklist_photos WHERE execution_id = ?1")
            .bind(summary.execution_id)
            .fetch_one(db.as_ref())
            .await
            .expect("count");
    assert_eq!(photos, 1, "exactly the one NOK photo");
}

#[tokio::test]
async fn duplicate_session_id_fails_loudly() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 1).await;
    session.record_verdict(VerdictStatus::Ok);

    let repo = ExecutionRepo::new(Arc::clone(&db));
    repo.persist(&session).await.expect("first persist");
    let err = repo.persist(&session).await.expect_err("duplicate must fail");
    assert!(matches!(err, AppError::Persistence(_)));
}

#[tokio::test]
async fn retry_after_failure_succeeds() {
    let db = helpers::test_db().await;
    let mut session = helpers::seeded_session(&db, 42, 1).await;
    session.record_verdict(VerdictStatus::Ok);

    sqlx::query("ALTER TABLE checklist_responses RENAME TO checklist_responses_hidden")
        .execute(db.as_ref())
        .await
        .expect("rename");

    let repo = ExecutionRepo::new(Arc::clone(&db));
    repo.persist(&session).await.expect_err("must fail while hidden");

    sqlx::query("ALTER TABLE checklist_responses_hidden RENAME TO checklist_responses")
        .execute(db.as_ref())
        .await
        .expect("rename back");

    // The session is untouched, so a manual retry can re-run the insert.
    let summary = repo.persist(&session).await.expect("retry persist");
    assert!(summary.execution_id > 0);
}
