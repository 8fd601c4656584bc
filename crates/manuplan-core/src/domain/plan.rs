// manuplan-core/src/domain/plan.rs
// ============================================================================
// Module: Datum Plan Artifacts
// Description: The versioned, governed manufacturing plan — steps, tests,
//              evidence intent, and edit/override metadata.
// Purpose: Model the system's end product and its governance envelope.
// Dependencies: serde, crate::identifiers
// ============================================================================

//! ## Overview
//! A `DatumPlan` version is immutable once written. Only `state` and
//! `locked` transition, and only as the approval state machine in
//! `manuplan-plan` dictates. `DatumPlan` owns its steps, tests, and evidence
//! intent outright; packs and profiles remain referenced by id via
//! `soe_decision_ids`/`soe_run_id`.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::DecisionId;
use crate::identifiers::PlanId;
use crate::identifiers::QuoteId;
use crate::identifiers::SoeRunId;
use crate::identifiers::StepId;
use crate::identifiers::UserId;

/// Governance state of a [`DatumPlan`] version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    /// Freely editable.
    Draft,
    /// Submitted for approval; awaiting a decision.
    Submitted,
    /// Approved; `locked` is always `true` in this state.
    Approved,
    /// Rejected; the plan returns to `draft` at the same version.
    Rejected,
}

/// One step in the manufacturing sequence.
///
/// A step carrying `soe_decision_id` is SOE-derived and SOE-locked: it may
/// not be reordered or removed without a recorded [`Override`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Deterministic hash of this step's content-bearing fields.
    pub step_id: StepId,
    /// Step kind, e.g. `"CLEAN"`, `"BAKE"`, `"SMT"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Position among the plan's steps.
    pub sequence: u32,
    /// Whether the step must be performed.
    pub required: bool,
    /// Whether this step participates in a contiguous locked sub-sequence.
    pub locked_sequence: bool,
    /// Free-form process parameters.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<serde_json::Value>,
    /// Acceptance criteria text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub acceptance: Option<String>,
    /// Rule ids (or `"BASELINE_DEFAULT_STEP"`) this step traces to. Always
    /// non-empty.
    pub source_rules: Vec<String>,
    /// The SOE decision that inserted this step, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_decision_id: Option<DecisionId>,
    /// Rendered justification carried from the SOE decision, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_why: Option<String>,
}

/// A declared test, structurally parallel to [`Step`] but tracked
/// separately per the data model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTest {
    /// Deterministic hash of this test's content-bearing fields.
    pub test_id: StepId,
    /// Test name, e.g. `"IQ"`, `"OQ"`, `"PQ"`.
    pub name: String,
    /// Position among the plan's tests.
    pub sequence: u32,
    /// Rule ids this test traces to. Always non-empty.
    pub source_rules: Vec<String>,
    /// The SOE decision that required this test, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_decision_id: Option<DecisionId>,
    /// Rendered justification carried from the SOE decision, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_why: Option<String>,
}

/// A retained-evidence intent item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceIntent {
    /// Deterministic hash of this item's content-bearing fields.
    pub evidence_id: StepId,
    /// Evidence description, e.g. `"Device History Record"`.
    pub description: String,
    /// Retention period, when specified.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub retention: Option<String>,
    /// Rule ids this evidence item traces to. Always non-empty.
    pub source_rules: Vec<String>,
    /// The SOE decision that required this evidence, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_decision_id: Option<DecisionId>,
}

/// A single deviation from an SOE-locked constraint, always audited and
/// always requiring fresh approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Override {
    /// The constraint being deviated from, e.g. `"locked_sequence"` or a
    /// step id.
    pub constraint: String,
    /// Non-empty justification.
    pub reason: String,
    /// Actor who authorized the override.
    pub user_id: UserId,
    /// RFC 3339 timestamp supplied by the caller.
    pub timestamp: String,
}

/// Metadata recorded whenever a plan version is produced by an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Actor who made the edit.
    pub edited_by: UserId,
    /// RFC 3339 timestamp supplied by the caller.
    pub edited_at: String,
    /// Non-empty reason for the edit.
    pub edit_reason: String,
    /// Overrides applied as part of this edit, if any.
    #[serde(default)]
    pub overrides: Vec<Override>,
}

/// The versioned, governed manufacturing plan artifact.
///
/// Each version is immutable once written; only `state`/`locked` change,
/// and only through the approval state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatumPlan {
    /// Identifier, stable across versions.
    pub plan_id: PlanId,
    /// Identifier of the quote this plan was generated from.
    pub quote_id: QuoteId,
    /// Monotonically increasing version number within `plan_id`.
    pub version: u32,
    /// Version this one was forked from, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_version: Option<u32>,
    /// Governance state.
    pub state: PlanState,
    /// Whether the plan is immutable. Always `true` when `state` is
    /// `approved`.
    pub locked: bool,
    /// Export tier; gates execution-output exports.
    pub tier: u8,
    /// Ordered manufacturing steps.
    pub steps: Vec<Step>,
    /// Declared tests, in the order SOE/generation produced them.
    pub tests: Vec<PlanTest>,
    /// Retained-evidence intent.
    pub evidence_intent: Vec<EvidenceIntent>,
    /// SOE run this plan was generated from, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub soe_run_id: Option<SoeRunId>,
    /// Decision ids sourced from `soe_run_id`, sorted ascending.
    #[serde(default)]
    pub soe_decision_ids: Vec<DecisionId>,
    /// Metadata for the edit that produced this version, if any (absent on
    /// the initial `generatePlan` output).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edit_metadata: Option<EditMetadata>,
    /// Actor who approved this version, once approved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approved_by: Option<UserId>,
    /// RFC 3339 timestamp of approval, once approved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approved_at: Option<String>,
}

impl DatumPlan {
    /// Returns `true` when `step_id` identifies a step whose position or
    /// presence is mandated by an SOE decision.
    #[must_use]
    pub fn is_soe_locked(&self, step_id: &StepId) -> bool {
        self.steps
            .iter()
            .any(|step| &step.step_id == step_id && step.soe_decision_id.is_some())
    }
}
