// manuplan-core/src/interfaces.rs
// ============================================================================
// Module: Datum Interfaces
// Description: Backend-agnostic interfaces for catalogs, stores, and audit
//              logging.
// Purpose: Keep the pure core free of hidden globals — every dependency is
//          an explicit trait object passed into an entry point.
// Dependencies: serde, thiserror, crate::{domain, identifiers}
// ============================================================================

//! ## Overview
//! The profile/pack catalog and the versioned plan/profile stores are
//! explicit dependencies of every core entry point; no process-wide
//! singleton is part of the contract. Tests inject in-memory fakes;
//! `manuplan-store` provides a SQLite-backed implementation for production
//! use.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::domain::ProfileBundle;
use crate::domain::StandardsPack;
use crate::domain::StandardsProfile;
use crate::domain::profile::IndustryProfile;
use crate::identifiers::BundleId;
use crate::identifiers::IndustryId;
use crate::identifiers::PackId;
use crate::identifiers::PlanId;
use crate::identifiers::ProfileId;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Errors reading from the read-only profile/pack catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested entity does not exist.
    #[error("catalog entity not found: {0}")]
    NotFound(String),
    /// The catalog returned data that failed validation.
    #[error("catalog data invalid: {0}")]
    Invalid(String),
}

/// Read-only access to published [`StandardsPack`]s.
pub trait PackCatalog {
    /// Resolves a pack by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when `pack_id` is unknown.
    fn get_pack(&self, pack_id: &PackId) -> Result<StandardsPack, CatalogError>;
}

/// Read-only access to profiles, industry defaults, and bundles.
pub trait ProfileCatalog {
    /// Resolves the latest version of a profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when `profile_id` is unknown.
    fn get_profile(&self, profile_id: &ProfileId) -> Result<StandardsProfile, CatalogError>;

    /// Resolves an industry's default catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when `industry_id` is unknown.
    fn get_industry(&self, industry_id: &IndustryId) -> Result<IndustryProfile, CatalogError>;

    /// Resolves a bundle to its declared profile id list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when `bundle_id` is unknown.
    fn get_bundle(&self, bundle_id: &BundleId) -> Result<ProfileBundle, CatalogError>;
}

// ============================================================================
// SECTION: Versioned Stores
// ============================================================================

/// Errors from a versioned entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("store io error: {0}")]
    Io(String),
    /// Stored data failed an integrity check on read.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// The requested entity or version does not exist.
    #[error("store entity not found: {0}")]
    NotFound(String),
    /// An optimistic write lost a race with a concurrent writer.
    #[error("version conflict on {entity_id}: version {attempted} already exists")]
    VersionConflict {
        /// Entity whose version conflicted.
        entity_id: String,
        /// Version the caller attempted to create, formatted for display
        /// (an integer for plans, a semver string for profiles).
        attempted: String,
    },
}

/// Versioned, single-writer-per-entity storage for [`crate::domain::DatumPlan`].
///
/// Implementations must serialize writes per `plan_id` and must reject a
/// `create_version` call whose version already exists, per the
/// optimistic-concurrency discipline: read the latest version, build the
/// next in memory, write with "must not yet exist" semantics, retry on
/// conflict.
pub trait PlanStore {
    /// Loads the highest-numbered version of `plan_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn load_latest(
        &self,
        plan_id: &PlanId,
    ) -> Result<Option<crate::domain::DatumPlan>, StoreError>;

    /// Loads a specific version of `plan_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn load_version(
        &self,
        plan_id: &PlanId,
        version: u32,
    ) -> Result<Option<crate::domain::DatumPlan>, StoreError>;

    /// Lists all version numbers stored for `plan_id`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn list_versions(&self, plan_id: &PlanId) -> Result<Vec<u32>, StoreError>;

    /// Writes a new version. Fails with
    /// [`StoreError::VersionConflict`] if `plan.version` already exists for
    /// `plan.plan_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a lost race, or
    /// [`StoreError::Io`] on I/O failure.
    fn create_version(&self, plan: &crate::domain::DatumPlan) -> Result<(), StoreError>;
}

/// Versioned, single-writer-per-entity storage for
/// [`crate::domain::StandardsProfile`].
pub trait ProfileStore {
    /// Loads the highest-numbered (semver-ordered) version of `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn load_latest(&self, profile_id: &ProfileId) -> Result<Option<StandardsProfile>, StoreError>;

    /// Loads a specific version of `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn load_version(
        &self,
        profile_id: &ProfileId,
        version: &str,
    ) -> Result<Option<StandardsProfile>, StoreError>;

    /// Lists all version strings stored for `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or corruption.
    fn list_versions(&self, profile_id: &ProfileId) -> Result<Vec<String>, StoreError>;

    /// Writes a new version. Fails with
    /// [`StoreError::VersionConflict`] if the version already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a lost race, or
    /// [`StoreError::Io`] on I/O failure.
    fn create_version(&self, profile: &StandardsProfile) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Audit Log
// ============================================================================

/// One append-only audit record.
///
/// Emitted for every mutation attempt, including failures, per the
/// propagation policy in the error handling design: a denied attempt
/// records `from_state == to_state` with `result = "denied"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 timestamp supplied by the caller.
    pub timestamp: String,
    /// Actor that attempted the mutation.
    pub actor: String,
    /// Role the actor presented.
    pub role: String,
    /// Entity identifier (plan id or profile id).
    pub entity: String,
    /// State before the attempt.
    pub from_state: String,
    /// State after the attempt (equal to `from_state` when denied).
    pub to_state: String,
    /// Caller-supplied reason, when applicable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    /// `"allowed"` or `"denied"`.
    pub result: String,
}

/// Append-only audit sink.
pub trait AuditLog {
    /// Appends one entry. Entries for a given entity are totally ordered by
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}
