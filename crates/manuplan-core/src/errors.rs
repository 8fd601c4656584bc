// manuplan-core/src/errors.rs
// ============================================================================
// Module: Datum Error Codes
// Description: The closed set of error kinds surfaced at every request
//              boundary.
// Purpose: Give callers a stable `{code, message, detail?}` shape instead of
//          an ad-hoc exception hierarchy.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure mode named in the specification's error handling design
//! has exactly one [`DatumError`] variant. Nothing here is retryable except
//! [`DatumError::VersionConflict`], which callers should retry from a fresh
//! read per the optimistic-write discipline in `manuplan-store`.

use thiserror::Error;

/// A stable, structured failure from any core operation.
#[derive(Debug, Clone, Error)]
pub enum DatumError {
    /// A profile in the run is not in `approved` state (and audit-replay
    /// was not requested for a `deprecated` one).
    #[error("profile unusable: {profile_id}")]
    ProfileUnusable {
        /// Offending profile id.
        profile_id: String,
    },
    /// The profile graph is cyclic or violates layer-parenting constraints.
    #[error("profile graph invalid: {reason}")]
    ProfileGraphInvalid {
        /// Human-readable reason.
        reason: String,
    },
    /// A referenced pack id does not resolve in the catalog.
    #[error("pack not found: {pack_id}")]
    PackNotFound {
        /// Offending pack id.
        pack_id: String,
    },
    /// Two matched decisions on the same object contradict under the
    /// `ERROR` conflict policy.
    #[error("rule conflict between decisions {first} and {second}")]
    RuleConflict {
        /// First conflicting decision id.
        first: String,
        /// Second conflicting decision id.
        second: String,
    },
    /// An edit violated an invariant and no valid override was supplied.
    #[error("invalid plan edit: {reason}")]
    PlanInvalidEdit {
        /// Human-readable reason.
        reason: String,
    },
    /// An override was present but its reason was empty.
    #[error("override missing a non-empty reason")]
    OverrideMissingReason,
    /// A state machine transition was requested from a state that does not
    /// permit it.
    #[error("invalid state transition: {reason}")]
    PlanStateTransitionInvalid {
        /// Human-readable reason.
        reason: String,
    },
    /// A write was attempted against an approved (immutable) version.
    #[error("plan version is approved and immutable")]
    PlanApprovedImmutable,
    /// Export was requested against a plan that is not approved.
    #[error("export requires an approved plan")]
    ExportRequiresApproval,
    /// Export of execution outputs was requested below the required tier.
    #[error("tier insufficient: requires tier >= {required}, got {actual}")]
    TierInsufficient {
        /// Minimum required tier.
        required: u8,
        /// Tier actually presented.
        actual: u8,
    },
    /// An unsupported export/report format was requested.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Offending format string.
        format: String,
    },
    /// An optimistic write lost a race with a concurrent writer. Retryable.
    #[error("version conflict on {entity_id}: expected next version {expected_version}")]
    VersionConflict {
        /// Entity whose version conflicted.
        entity_id: String,
        /// Version the caller expected to create.
        expected_version: u32,
    },
    /// The audit integrity check found one or more inconsistencies.
    #[error("audit integrity failed: {findings:?}")]
    AuditIntegrityFailed {
        /// Failing check names.
        findings: Vec<String>,
    },
}

impl DatumError {
    /// Returns the stable string code used in the `{code, message, detail?}`
    /// error contract.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProfileUnusable { .. } => "PROFILE_UNUSABLE",
            Self::ProfileGraphInvalid { .. } => "PROFILE_GRAPH_INVALID",
            Self::PackNotFound { .. } => "PACK_NOT_FOUND",
            Self::RuleConflict { .. } => "RULE_CONFLICT",
            Self::PlanInvalidEdit { .. } => "PLAN_INVALID_EDIT",
            Self::OverrideMissingReason => "OVERRIDE_MISSING_REASON",
            Self::PlanStateTransitionInvalid { .. } => "PLAN_STATE_TRANSITION_INVALID",
            Self::PlanApprovedImmutable => "PLAN_APPROVED_IMMUTABLE",
            Self::ExportRequiresApproval => "EXPORT_REQUIRES_APPROVAL",
            Self::TierInsufficient { .. } => "TIER_INSUFFICIENT",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::AuditIntegrityFailed { .. } => "AUDIT_INTEGRITY_FAILED",
        }
    }

    /// Returns `true` for the single retryable error kind.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
