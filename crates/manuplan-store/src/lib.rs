// manuplan-store/src/lib.rs
// ============================================================================
// Module: Datum SQLite Persistence
// Description: SQLite-backed implementations of `PlanStore` and
//              `ProfileStore`.
// Purpose: Give the core's optimistic-concurrency discipline a durable
//          backing store; nothing here changes the CAS contract the
//          in-memory test fakes already implement.
// Dependencies: manuplan-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Both stores share one connection-and-schema module and differ only in
//! table shape: plans version by an incrementing `u32`, profiles by
//! semver. Writes use `INSERT` without `ON CONFLICT`, so a concurrent
//! writer's version collision surfaces as a `SQLite` constraint violation,
//! which is translated to [`manuplan_core::interfaces::StoreError::VersionConflict`].

mod plan_store;
mod profile_store;
mod schema;

pub use plan_store::SqlitePlanStore;
pub use profile_store::SqliteProfileStore;
pub use schema::SqliteJournalMode;
pub use schema::SqliteStoreConfig;

use thiserror::Error;

/// Errors opening or initializing a `SQLite`-backed store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
}
