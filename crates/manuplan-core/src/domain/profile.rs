// manuplan-core/src/domain/profile.rs
// ============================================================================
// Module: Standards Profiles, Industry Profiles & Bundles
// Description: Layered, governed profile data consumed by the SOE engine.
// Purpose: Model the BASE/DOMAIN/CUSTOMER_OVERRIDE profile hierarchy and the
//          bundles used to select profiles at SOE time.
// Dependencies: serde, crate::identifiers
// ============================================================================

//! ## Overview
//! A [`StandardsProfile`] is a typed, layered bundle of packs plus override
//! and conflict policy. Profiles carry their own governance state (see
//! [`LifecycleState`]) independent of any plan's approval state.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::BundleId;
use crate::identifiers::IndustryId;
use crate::identifiers::PackId;
use crate::identifiers::ProfileId;

/// The three profile layers. `DOMAIN` profiles must parent only `BASE`
/// profiles; `CUSTOMER_OVERRIDE` profiles must parent only `DOMAIN`
/// profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    /// Foundational, industry-agnostic layer.
    Base,
    /// Domain- or industry-specific layer.
    Domain,
    /// Customer- or program-specific layer.
    CustomerOverride,
}

/// Semantic layer constant. Always derived from [`ProfileType`], never from
/// a list position — two profile stacks with the same types in different
/// orders must produce the same layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer(u8);

impl Layer {
    /// Layer constant for [`ProfileType::Base`].
    pub const BASE: Self = Self(0);
    /// Layer constant for [`ProfileType::Domain`].
    pub const DOMAIN: Self = Self(1);
    /// Layer constant for [`ProfileType::CustomerOverride`].
    pub const CUSTOMER_OVERRIDE: Self = Self(2);

    /// Returns the raw numeric layer value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<ProfileType> for Layer {
    fn from(profile_type: ProfileType) -> Self {
        match profile_type {
            ProfileType::Base => Self::BASE,
            ProfileType::Domain => Self::DOMAIN,
            ProfileType::CustomerOverride => Self::CUSTOMER_OVERRIDE,
        }
    }
}

/// How a profile's pack list combines with its parents' pack lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideMode {
    /// Parent packs must all still apply; this profile may only add.
    Strict,
    /// This profile's packs are unioned with parent packs.
    Additive,
    /// This profile's packs replace parent packs entirely.
    Replace,
}

/// How contradictory decisions on the same object are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictPolicy {
    /// Abort the SOE run.
    Error,
    /// The lower-layer (parent) decision wins.
    ParentWins,
    /// The higher-layer (child) decision wins.
    ChildWins,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self::Error
    }
}

/// Governance state shared by profiles and plans.
///
/// Profiles additionally support `deprecated`, reachable only from
/// `approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Newly created or forked; freely editable.
    Draft,
    /// Submitted for approval; awaiting a decision.
    Submitted,
    /// Approved; immutable except to move to `deprecated`.
    Approved,
    /// Rejected; returns to `draft` for the same version.
    Rejected,
    /// Retired. Refused by SOE evaluation unless audit-replay is requested.
    Deprecated,
}

/// A typed, layered bundle of packs plus override/conflict policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardsProfile {
    /// Identifier, stable across versions.
    pub profile_id: ProfileId,
    /// Layer this profile occupies.
    pub profile_type: ProfileType,
    /// Declared parents; must satisfy the layer-parenting constraint for
    /// `profile_type` and must not introduce a cycle.
    pub parent_profile_ids: Vec<ProfileId>,
    /// Packs this profile contributes by default.
    pub default_packs: Vec<PackId>,
    /// How `default_packs` combines with parents' packs.
    pub override_mode: OverrideMode,
    /// How conflicting decisions sourced from this profile's subtree
    /// resolve.
    pub conflict_policy: ConflictPolicy,
    /// Current governance state.
    pub state: LifecycleState,
    /// Semantic version, `X.Y.Z`.
    pub version: String,
    /// Version this one was forked from, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_version: Option<String>,
}

/// Read-only catalog entry describing an industry's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryProfile {
    /// Identifier, e.g. `"space"`, `"medical"`.
    pub industry_id: IndustryId,
    /// Packs applied when no explicit profile stack is given.
    pub default_packs: Vec<PackId>,
    /// Declared risk posture, e.g. `"high"`.
    pub risk_posture: String,
    /// Declared traceability depth, e.g. `"full"`.
    pub traceability_depth: String,
    /// Declared evidence retention policy, e.g. `"permanent"`.
    pub evidence_retention: String,
}

/// A named list of profile ids for convenient selection. Not a copy of
/// profile content, and has no governance state of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileBundle {
    /// Identifier of the bundle.
    pub bundle_id: BundleId,
    /// Profile ids the bundle resolves to, in declaration order.
    pub profile_ids: Vec<ProfileId>,
    /// Optional associated program.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program_id: Option<String>,
    /// Optional associated customer.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_id: Option<String>,
    /// Optional associated contract.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contract_id: Option<String>,
}
