// manuplan-core/src/testing.rs
// ============================================================================
// Module: In-Memory Fakes
// Description: Simple in-memory implementations of the core interfaces.
// Purpose: Let callers (tests, the CLI's `--in-memory` mode) exercise the
//          core without standing up SQLite.
// Dependencies: std::sync, crate::{domain, interfaces}
// ============================================================================

//! ## Overview
//! These are not mocks: they are fully functional, if unbounded,
//! implementations of [`crate::interfaces`] backed by in-process maps. They
//! honor the same optimistic-concurrency contract as a real store so tests
//! written against them exercise real version-conflict behavior.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::DatumPlan;
use crate::domain::ProfileBundle;
use crate::domain::StandardsPack;
use crate::domain::StandardsProfile;
use crate::domain::profile::IndustryProfile;
use crate::identifiers::BundleId;
use crate::identifiers::IndustryId;
use crate::identifiers::PackId;
use crate::identifiers::PlanId;
use crate::identifiers::ProfileId;
use crate::interfaces::AuditEntry;
use crate::interfaces::AuditLog;
use crate::interfaces::CatalogError;
use crate::interfaces::PackCatalog;
use crate::interfaces::PlanStore;
use crate::interfaces::ProfileCatalog;
use crate::interfaces::ProfileStore;
use crate::interfaces::StoreError;

/// An in-memory [`PackCatalog`] seeded by [`Self::insert`].
#[derive(Debug, Default)]
pub struct InMemoryPackCatalog {
    packs: BTreeMap<String, StandardsPack>,
}

impl InMemoryPackCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a pack.
    pub fn insert(&mut self, pack: StandardsPack) {
        self.packs.insert(pack.pack_id.as_str().to_owned(), pack);
    }
}

impl PackCatalog for InMemoryPackCatalog {
    fn get_pack(&self, pack_id: &PackId) -> Result<StandardsPack, CatalogError> {
        self.packs
            .get(pack_id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(pack_id.to_string()))
    }
}

/// An in-memory [`ProfileCatalog`] seeded by `insert_*`.
#[derive(Debug, Default)]
pub struct InMemoryProfileCatalog {
    profiles: BTreeMap<String, StandardsProfile>,
    industries: BTreeMap<String, IndustryProfile>,
    bundles: BTreeMap<String, ProfileBundle>,
}

impl InMemoryProfileCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile's latest known version.
    pub fn insert_profile(&mut self, profile: StandardsProfile) {
        self.profiles
            .insert(profile.profile_id.as_str().to_owned(), profile);
    }

    /// Inserts or replaces an industry default entry.
    pub fn insert_industry(&mut self, industry: IndustryProfile) {
        self.industries
            .insert(industry.industry_id.as_str().to_owned(), industry);
    }

    /// Inserts or replaces a bundle.
    pub fn insert_bundle(&mut self, bundle: ProfileBundle) {
        self.bundles
            .insert(bundle.bundle_id.as_str().to_owned(), bundle);
    }
}

impl ProfileCatalog for InMemoryProfileCatalog {
    fn get_profile(&self, profile_id: &ProfileId) -> Result<StandardsProfile, CatalogError> {
        self.profiles
            .get(profile_id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(profile_id.to_string()))
    }

    fn get_industry(&self, industry_id: &IndustryId) -> Result<IndustryProfile, CatalogError> {
        self.industries
            .get(industry_id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(industry_id.to_string()))
    }

    fn get_bundle(&self, bundle_id: &BundleId) -> Result<ProfileBundle, CatalogError> {
        self.bundles
            .get(bundle_id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(bundle_id.to_string()))
    }
}

/// An in-memory, single-writer-per-entity [`PlanStore`].
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    versions: Mutex<BTreeMap<String, BTreeMap<u32, DatumPlan>>>,
}

impl InMemoryPlanStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for InMemoryPlanStore {
    fn load_latest(&self, plan_id: &PlanId) -> Result<Option<DatumPlan>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("plan store mutex poisoned".into()))?;
        Ok(guard
            .get(plan_id.as_str())
            .and_then(|versions| versions.values().next_back())
            .cloned())
    }

    fn load_version(
        &self,
        plan_id: &PlanId,
        version: u32,
    ) -> Result<Option<DatumPlan>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("plan store mutex poisoned".into()))?;
        Ok(guard
            .get(plan_id.as_str())
            .and_then(|versions| versions.get(&version))
            .cloned())
    }

    fn list_versions(&self, plan_id: &PlanId) -> Result<Vec<u32>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("plan store mutex poisoned".into()))?;
        Ok(guard
            .get(plan_id.as_str())
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default())
    }

    fn create_version(&self, plan: &DatumPlan) -> Result<(), StoreError> {
        let mut guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("plan store mutex poisoned".into()))?;
        let entry = guard.entry(plan.plan_id.as_str().to_owned()).or_default();
        if entry.contains_key(&plan.version) {
            return Err(StoreError::VersionConflict {
                entity_id: plan.plan_id.to_string(),
                attempted: plan.version.to_string(),
            });
        }
        entry.insert(plan.version, plan.clone());
        Ok(())
    }
}

/// An in-memory, single-writer-per-entity [`ProfileStore`].
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    versions: Mutex<BTreeMap<String, BTreeMap<String, StandardsProfile>>>,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load_latest(&self, profile_id: &ProfileId) -> Result<Option<StandardsProfile>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".into()))?;
        Ok(guard
            .get(profile_id.as_str())
            .and_then(|versions| versions.values().next_back())
            .cloned())
    }

    fn load_version(
        &self,
        profile_id: &ProfileId,
        version: &str,
    ) -> Result<Option<StandardsProfile>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".into()))?;
        Ok(guard
            .get(profile_id.as_str())
            .and_then(|versions| versions.get(version))
            .cloned())
    }

    fn list_versions(&self, profile_id: &ProfileId) -> Result<Vec<String>, StoreError> {
        let guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".into()))?;
        Ok(guard
            .get(profile_id.as_str())
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn create_version(&self, profile: &StandardsProfile) -> Result<(), StoreError> {
        let mut guard = self
            .versions
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".into()))?;
        let entry = guard
            .entry(profile.profile_id.as_str().to_owned())
            .or_default();
        if entry.contains_key(&profile.version) {
            return Err(StoreError::VersionConflict {
                entity_id: profile.profile_id.to_string(),
                attempted: profile.version.clone(),
            });
        }
        entry.insert(profile.version.clone(), profile.clone());
        Ok(())
    }
}

/// An in-memory, process-ordered [`AuditLog`].
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all entries recorded so far, in write order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the internal mutex was poisoned by a
    /// prior panic in another thread.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("audit log mutex poisoned".into()))?;
        Ok(guard.clone())
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("audit log mutex poisoned".into()))?;
        guard.push(entry);
        Ok(())
    }
}
