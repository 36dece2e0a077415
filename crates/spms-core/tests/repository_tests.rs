//! Repository integration tests over the in-memory store.

use std::sync::Arc;

use serde_json::json;
use spms_core::repo::collections;
use spms_core::{
    DocumentStore, Gender, MemoryStore, NurseDraft, PatientDraft, RepoError, Role, SpmsCore,
};

fn setup() -> (Arc<MemoryStore>, SpmsCore) {
    let store = Arc::new(MemoryStore::new());
    let core = SpmsCore::new(store.clone());
    (store, core)
}

fn nurse_draft(email: &str) -> NurseDraft {
    NurseDraft {
        name: "Siti Rahma".into(),
        license_id: "1987654321".into(),
        gender: Gender::Female,
        phone: "081234567890".into(),
        email: email.into(),
        address: "Jl. Melati 5".into(),
    }
}

fn patient_draft(name: &str) -> PatientDraft {
    PatientDraft {
        name: name.into(),
        national_id: "3201234567890001".into(),
        gender: Gender::Male,
        phone: "0812345678".into(),
        guardian_name: "Andi".into(),
    }
}

#[tokio::test]
async fn test_create_nurse_writes_record_and_credential() {
    let (store, core) = setup();

    let nurse = core
        .nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();
    assert_eq!(nurse.code, "PRW001");

    let nurses = store.list(collections::NURSES).await.unwrap();
    assert_eq!(nurses.len(), 1);

    let users = store.list(collections::USERS).await.unwrap();
    assert_eq!(users.len(), 1);
    let (_, user) = &users[0];
    assert_eq!(user.get("nurseCode"), Some(&json!("PRW001")));
    assert_eq!(user.get("role"), Some(&json!("NURSE")));
    assert_eq!(
        user.get("passwordDigest"),
        Some(&json!(spms_core::digest::sha256_hex("secret")))
    );
}

#[tokio::test]
async fn test_duplicate_email_fails_with_no_writes() {
    let (store, core) = setup();

    core.nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();

    let err = core
        .nurses()
        .create(nurse_draft("a@x.com"), "other")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail(_)));

    // Nothing new was written, and no code was consumed.
    assert_eq!(store.list(collections::NURSES).await.unwrap().len(), 1);
    assert_eq!(store.list(collections::USERS).await.unwrap().len(), 1);

    let next = core
        .nurses()
        .create(nurse_draft("b@x.com"), "secret")
        .await
        .unwrap();
    assert_eq!(next.code, "PRW002");
}

#[tokio::test]
async fn test_duplicate_email_differs_only_by_case() {
    let core = SpmsCore::in_memory();

    core.nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();

    let err = core
        .nurses()
        .create(nurse_draft("A@x.com"), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_invalid_draft_rejected_before_any_write() {
    let (store, core) = setup();

    let mut draft = nurse_draft("a@x.com");
    draft.phone = "1234567890".into();
    let err = core.nurses().create(draft, "secret").await.unwrap_err();
    assert!(matches!(err, RepoError::Invalid(_)));

    assert!(store.list(collections::NURSES).await.unwrap().is_empty());
    assert!(store.list(collections::USERS).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_email_syncs_credential() {
    let (store, core) = setup();

    let mut nurse = core
        .nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();

    nurse.email = "b@x.com".into();
    core.nurses().update(&nurse).await.unwrap();

    let users = store.list(collections::USERS).await.unwrap();
    assert_eq!(users.len(), 1);
    let (_, user) = &users[0];
    assert_eq!(user.get("email"), Some(&json!("b@x.com")));
    assert_eq!(user.get("nurseCode"), Some(&json!("PRW001")));

    // The old address is free again.
    core.nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_missing_nurse_is_not_found() {
    let core = SpmsCore::in_memory();

    let nurse = nurse_draft("a@x.com").into_record("PRW099".into());
    let err = core.nurses().update(&nurse).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_nurse_cascades_to_credentials() {
    let (store, core) = setup();

    let nurse = core
        .nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();

    core.nurses().delete(&nurse.code).await.unwrap();

    assert!(core
        .nurses()
        .get_by_code(&nurse.code)
        .await
        .unwrap()
        .is_none());
    assert!(store.list(collections::USERS).await.unwrap().is_empty());

    // The email can be registered again.
    core.nurses()
        .create(nurse_draft("a@x.com"), "secret")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_all_sorted_by_code() {
    let core = SpmsCore::in_memory();

    for email in ["a@x.com", "b@x.com", "c@x.com"] {
        core.nurses()
            .create(nurse_draft(email), "secret")
            .await
            .unwrap();
    }

    let all = core.nurses().list_all().await.unwrap();
    let codes: Vec<_> = all.iter().map(|n| n.code.as_str()).collect();
    assert_eq!(codes, ["PRW001", "PRW002", "PRW003"]);
}

#[tokio::test]
async fn test_patient_crud() {
    let core = SpmsCore::in_memory();

    let patient = core
        .patients()
        .create(patient_draft("Budi"))
        .await
        .unwrap();
    assert_eq!(patient.code, "PSN001");

    let mut fetched = core
        .patients()
        .get_by_code("PSN001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name, "Budi");

    fetched.guardian_name = "Rina".into();
    core.patients().update(&fetched).await.unwrap();
    let updated = core
        .patients()
        .get_by_code("PSN001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.guardian_name, "Rina");

    core.patients().delete("PSN001").await.unwrap();
    assert!(core
        .patients()
        .get_by_code("PSN001")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_patient_update_missing_is_not_found() {
    let core = SpmsCore::in_memory();

    let patient = patient_draft("Budi").into_record("PSN042".into());
    let err = core.patients().update(&patient).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_login_matrix() {
    let core = SpmsCore::in_memory();

    core.auth()
        .register_admin("admin@x.com", "adminpw")
        .await
        .unwrap();
    core.nurses()
        .create(nurse_draft("b@x.com"), "secret")
        .await
        .unwrap();

    let admin = core
        .auth()
        .login("admin@x.com", "adminpw")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(admin.nurse_code.is_none());

    let nurse = core.auth().login("b@x.com", "secret").await.unwrap().unwrap();
    assert_eq!(nurse.role, Role::Nurse);
    assert_eq!(nurse.nurse_code.as_deref(), Some("PRW001"));

    // Wrong password and unknown email are indistinguishable.
    assert!(core
        .auth()
        .login("b@x.com", "wrong")
        .await
        .unwrap()
        .is_none());
    assert!(core
        .auth()
        .login("nobody@x.com", "secret")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_admin_email_blocks_nurse_creation() {
    let core = SpmsCore::in_memory();

    core.auth()
        .register_admin("shared@x.com", "adminpw")
        .await
        .unwrap();

    let err = core
        .nurses()
        .create(nurse_draft("shared@x.com"), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_watch_all_delivers_snapshots() {
    let core = SpmsCore::in_memory();

    let mut feed = core.patients().watch_all().unwrap();
    assert!(feed.current().unwrap().is_empty());

    core.patients()
        .create(patient_draft("Budi"))
        .await
        .unwrap();
    let snapshot = feed.changed().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].code, "PSN001");

    core.patients().delete("PSN001").await.unwrap();
    let snapshot = feed.changed().await.unwrap().unwrap();
    assert!(snapshot.is_empty());

    feed.unsubscribe();
}
