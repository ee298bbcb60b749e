//! Unit tests for verdicts, roles, and permissions.

use nr12_checklist_bot::models::user::{Permissions, Role};
use nr12_checklist_bot::models::verdict::VerdictStatus;

#[test]
fn verdict_storage_round_trip() {
    for status in [VerdictStatus::Ok, VerdictStatus::Nok, VerdictStatus::Skip] {
        assert_eq!(VerdictStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(VerdictStatus::parse("maybe"), None);
}

#[test]
fn verdict_from_callback_data() {
    assert_eq!(VerdictStatus::from_callback("item_ok"), Some(VerdictStatus::Ok));
    assert_eq!(VerdictStatus::from_callback("item_nok"), Some(VerdictStatus::Nok));
    assert_eq!(VerdictStatus::from_callback("item_skip"), Some(VerdictStatus::Skip));
    assert_eq!(VerdictStatus::from_callback("pause_checklist"), None);
}

#[test]
fn verdict_labels_are_distinct() {
    assert_ne!(VerdictStatus::Ok.label(), VerdictStatus::Nok.label());
    assert_ne!(VerdictStatus::Nok.label(), VerdictStatus::Skip.label());
}

#[test]
fn role_matches_admin_substring_case_insensitively() {
    assert_eq!(Role::parse(Some("admin")), Role::Admin);
    assert_eq!(Role::parse(Some("Administrador Bot")), Role::Admin);
    assert_eq!(Role::parse(Some("ADMINISTRATOR")), Role::Admin);
}

#[test]
fn role_defaults_to_operator() {
    assert_eq!(Role::parse(Some("operator")), Role::Operator);
    assert_eq!(Role::parse(Some("inspetor")), Role::Operator);
    assert_eq!(Role::parse(None), Role::Operator);
}

#[test]
fn permissions_follow_role() {
    let admin = Permissions::for_role(Role::Admin);
    assert!(admin.is_admin);
    assert!(admin.can_create_checklist);
    assert!(admin.can_view_reports);

    let operator = Permissions::for_role(Role::Operator);
    assert!(!operator.is_admin);
    assert!(operator.can_create_checklist);
    assert!(operator.can_view_reports);
}
