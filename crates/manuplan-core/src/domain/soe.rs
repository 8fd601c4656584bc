// manuplan-core/src/domain/soe.rs
// ============================================================================
// Module: SOE Run Artifacts
// Description: Decisions, gates, and the SOERun produced by the Standards
//              Overlay Engine.
// Purpose: Represent the auditable output of one deterministic SOE
//          evaluation.
// Dependencies: serde, crate::{identifiers, domain::{pack, profile}}
// ============================================================================

//! ## Overview
//! `SOERun` owns its `Decision`s outright; packs and profiles are referenced
//! by id only. Every field here must be reproducible byte-for-byte given
//! identical inputs — see the determinism invariants in the crate's design
//! notes.

use serde::Deserialize;
use serde::Serialize;

use crate::domain::profile::Layer;
use crate::domain::profile::ProfileType;
use crate::identifiers::DecisionId;
use crate::identifiers::GateId;
use crate::identifiers::IndustryId;
use crate::identifiers::PackId;
use crate::identifiers::ProfileId;
use crate::identifiers::SoeRunId;

pub use crate::domain::pack::Enforcement;

/// The closed set of effects a matched rule can have.
///
/// Tagged so `Decision.action` hashes stably under refactoring: adding a
/// field to one variant never perturbs another variant's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// The object is mandatory.
    Require,
    /// The object is optional.
    Optional,
    /// The object is prohibited.
    Prohibit,
    /// Insert a plan step.
    InsertStep {
        /// Whether the inserted step participates in a locked sub-sequence.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        locked_sequence: Option<bool>,
        /// Name of the locked sequence group, when applicable (for example
        /// `"space_polymerics"`), used to keep contiguous steps together.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        sequence_group: Option<String>,
    },
    /// Escalate severity of an existing object.
    Escalate,
    /// Set an evidence retention period.
    SetRetention {
        /// Retention period, e.g. `"7y"`.
        period: String,
    },
    /// Add a cost modifier.
    AddCostModifier {
        /// Decimal amount, as a string to avoid floating point drift.
        amount: String,
        /// Optional unit, e.g. `"USD"`.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        unit: Option<String>,
    },
    /// Add a release gate.
    AddGate,
}

/// Human-readable justification for a [`Decision`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Why {
    /// Rule that produced this decision.
    pub rule_id: crate::identifiers::RuleId,
    /// Pack the rule belongs to.
    pub pack_id: PackId,
    /// Clause citations carried over from the rule.
    pub citations: Vec<String>,
    /// Rendered, locale-independent explanation.
    pub summary: String,
}

/// Which profile in the stack is responsible for a decision's presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSource {
    /// Profile credited with the decision.
    pub profile_id: ProfileId,
    /// That profile's type.
    pub profile_type: ProfileType,
    /// That profile's layer.
    pub layer: Layer,
}

/// A single, content-hash-identified fact emitted by a matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Content-addressed id; see [`crate::hashing`].
    pub id: DecisionId,
    /// What this decision asks for.
    pub action: Action,
    /// Type of the object the action applies to.
    pub object_type: String,
    /// Identifier of the object within its type namespace.
    pub object_id: String,
    /// Enforcement strength, if any, inherited from the firing rule.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enforcement: Option<Enforcement>,
    /// Traceable justification.
    pub why: Why,
    /// Highest-layer profile responsible for this decision, when resolvable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_source: Option<ProfileSource>,
}

/// Status of a release [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// No blocking decisions outstanding.
    Open,
    /// At least one blocking decision is outstanding.
    Blocked,
    /// Non-blocking decisions are outstanding.
    Warning,
}

/// A release checkpoint whose status derives from the decisions pointing at
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Identifier of the gate.
    pub gate_id: GateId,
    /// Derived status; `blocked` iff at least one blocking decision is
    /// present in `blocked_by`.
    pub status: GateStatus,
    /// Decisions that contribute to this gate's status.
    pub blocked_by: Vec<DecisionId>,
}

/// An evidence item the plan must retain, derived from `REQUIRE` decisions
/// on evidence objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredEvidence {
    /// Decision that required this evidence.
    pub decision_id: DecisionId,
    /// Identifier of the evidence object.
    pub object_id: String,
    /// Retention period, when set by a `SET_RETENTION` decision.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub retention: Option<String>,
}

/// A cost adjustment derived from an `ADD_COST_MODIFIER` decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModifier {
    /// Decision that added this modifier.
    pub decision_id: DecisionId,
    /// Decimal amount, as a string to avoid floating point drift.
    pub amount: String,
    /// Optional unit, e.g. `"USD"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
}

/// One entry in a run's resolved profile stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStackEntry {
    /// Profile identifier.
    pub profile_id: ProfileId,
    /// Profile type.
    pub profile_type: ProfileType,
    /// Semantic layer constant (never a list index).
    pub layer: Layer,
    /// Declared parents of this profile.
    pub parent_profile_ids: Vec<ProfileId>,
}

/// The complete, auditable output of one Standards Overlay Engine
/// evaluation.
///
/// A pure function of its inputs: regenerating an `SOERun` with identical
/// inputs must yield byte-equal canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SOERun {
    /// Identifier of this run.
    pub soe_run_id: SoeRunId,
    /// Industry profile the run was evaluated under.
    pub industry_profile: IndustryId,
    /// Declared hardware class, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hardware_class: Option<String>,
    /// Packs in force, sorted ascending by `pack_id`, deduplicated.
    pub active_packs: Vec<PackId>,
    /// Resolved profile stack, in resolution order.
    pub profile_stack: Vec<ProfileStackEntry>,
    /// Decisions emitted by matched rules, deduplicated by id.
    pub decisions: Vec<Decision>,
    /// Gates derived from `ADD_GATE` decisions.
    pub gates: Vec<Gate>,
    /// Evidence requirements derived from `REQUIRE` decisions.
    pub required_evidence: Vec<RequiredEvidence>,
    /// Cost modifiers derived from `ADD_COST_MODIFIER` decisions.
    pub cost_modifiers: Vec<CostModifier>,
    /// Whether this run tolerated a deprecated profile under explicit
    /// audit-replay mode.
    pub audit_replay: bool,
}
