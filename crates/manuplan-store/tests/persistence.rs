// crates/manuplan-store/tests/persistence.rs
// ============================================================================
// Module: SQLite Persistence Integration Tests
// Description: Exercises SqlitePlanStore/SqliteProfileStore against a real
//              on-disk database rather than an in-memory fake.
// Purpose: Catch the things only a real SQLite file can show: CAS failures
//          on a genuine unique-constraint violation, content-hash corruption
//          detection on a tampered row, and semver-ordered `load_latest`.
// ============================================================================

//! Store persistence integration tests.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

use manuplan_core::PlanId;
use manuplan_core::ProfileId;
use manuplan_core::QuoteId;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::OverrideMode;
use manuplan_core::domain::PlanState;
use manuplan_core::domain::ProfileType;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::interfaces::PlanStore;
use manuplan_core::interfaces::ProfileStore;
use manuplan_core::interfaces::StoreError;
use manuplan_store::SqlitePlanStore;
use manuplan_store::SqliteProfileStore;
use manuplan_store::SqliteStoreConfig;

fn config(dir: &tempfile::TempDir) -> SqliteStoreConfig {
    SqliteStoreConfig::new(dir.path().join("manuplan.sqlite3"))
}

fn plan(version: u32) -> DatumPlan {
    DatumPlan {
        plan_id: PlanId::new("plan-1"),
        quote_id: QuoteId::new("quote-1"),
        version,
        parent_version: if version > 1 { Some(version - 1) } else { None },
        state: PlanState::Draft,
        locked: false,
        tier: 2,
        steps: Vec::new(),
        tests: Vec::new(),
        evidence_intent: Vec::new(),
        soe_run_id: None,
        soe_decision_ids: Vec::new(),
        edit_metadata: None,
        approved_by: None,
        approved_at: None,
    }
}

fn profile(version: &str) -> StandardsProfile {
    StandardsProfile {
        profile_id: ProfileId::new("profile-1"),
        profile_type: ProfileType::Base,
        parent_profile_ids: Vec::new(),
        default_packs: Vec::new(),
        override_mode: OverrideMode::Additive,
        conflict_policy: ConflictPolicy::Error,
        state: LifecycleState::Approved,
        version: version.to_owned(),
        parent_version: None,
    }
}

#[test]
fn plan_store_round_trips_across_a_fresh_connection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = config(&dir);
    {
        let store = SqlitePlanStore::open(&cfg).expect("opens");
        store.create_version(&plan(1)).expect("creates v1");
    }
    let reopened = SqlitePlanStore::open(&cfg).expect("reopens same file");
    let loaded = reopened.load_latest(&PlanId::new("plan-1")).expect("loads").expect("present");
    assert_eq!(loaded.version, 1);
}

#[test]
fn plan_store_refuses_a_version_that_already_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqlitePlanStore::open(&config(&dir)).expect("opens");
    store.create_version(&plan(1)).expect("creates v1 once");
    let err = store.create_version(&plan(1)).expect_err("rejects the duplicate version");
    assert!(matches!(err, StoreError::VersionConflict { .. }));
}

#[test]
fn plan_store_load_latest_picks_the_highest_numbered_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqlitePlanStore::open(&config(&dir)).expect("opens");
    store.create_version(&plan(1)).expect("creates v1");
    store.create_version(&plan(2)).expect("creates v2");
    store.create_version(&plan(3)).expect("creates v3");
    let latest = store.load_latest(&PlanId::new("plan-1")).expect("loads").expect("present");
    assert_eq!(latest.version, 3);
    assert_eq!(store.list_versions(&PlanId::new("plan-1")).expect("lists"), vec![1, 2, 3]);
}

#[test]
fn plan_store_load_latest_of_an_unknown_plan_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqlitePlanStore::open(&config(&dir)).expect("opens");
    assert!(store.load_latest(&PlanId::new("never-created")).expect("loads").is_none());
}

#[test]
fn profile_store_load_latest_is_semver_ordered_not_insertion_ordered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteProfileStore::open(&config(&dir)).expect("opens");
    store.create_version(&profile("1.9.0")).expect("creates 1.9.0");
    store.create_version(&profile("1.10.0")).expect("creates 1.10.0");
    store.create_version(&profile("1.2.0")).expect("creates 1.2.0");
    let latest = store.load_latest(&ProfileId::new("profile-1")).expect("loads").expect("present");
    assert_eq!(latest.version, "1.10.0", "semver comparison, not string comparison");
}

#[test]
fn profile_store_refuses_a_version_that_already_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteProfileStore::open(&config(&dir)).expect("opens");
    store.create_version(&profile("1.0.0")).expect("creates once");
    let err = store.create_version(&profile("1.0.0")).expect_err("rejects the duplicate version");
    assert!(matches!(err, StoreError::VersionConflict { .. }));
}

#[test]
fn plan_store_detects_a_tampered_row_on_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = config(&dir);
    let store = SqlitePlanStore::open(&cfg).expect("opens");
    store.create_version(&plan(1)).expect("creates v1");

    let raw = rusqlite::Connection::open(&cfg.path).expect("opens raw connection");
    raw.execute(
        "UPDATE plan_versions SET plan_json = ?1 WHERE plan_id = 'plan-1' AND version = 1",
        [br#"{"tampered":true}"#.as_slice()],
    )
    .expect("tampers with the stored row");

    let err = store.load_latest(&PlanId::new("plan-1")).expect_err("detects the content hash mismatch");
    assert!(matches!(err, StoreError::Corrupt(_)));
}
