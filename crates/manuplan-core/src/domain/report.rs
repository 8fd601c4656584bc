// manuplan-core/src/domain/report.rs
// ============================================================================
// Module: Compliance Report & Trace
// Description: Per-item traceability and the rendered compliance report.
// Purpose: Join plan artifacts back to the rules, clauses, and profile
//          layers that produced them.
// Dependencies: serde, crate::{identifiers, domain::soe}
// ============================================================================

//! ## Overview
//! [`TraceEntry`] is the atomic unit of traceability: one plan artifact
//! mapped back to the rule, pack, citation set, and profile layer
//! responsible for it. [`ComplianceReport`] packages a full trace plus the
//! eight other sections required by the specification into one hashed,
//! pure-function output.

use serde::Deserialize;
use serde::Serialize;

use crate::domain::soe::ProfileSource;
use crate::identifiers::DecisionId;
use crate::identifiers::PackId;
use crate::identifiers::PlanId;
use crate::identifiers::RuleId;
use crate::identifiers::UserId;

/// The per-element mapping from a plan artifact back to its rule, clause,
/// pack, and profile layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Rule responsible for the artifact.
    pub rule_id: RuleId,
    /// Pack the rule belongs to.
    pub pack_id: PackId,
    /// Clause citations carried over from the rule.
    pub citations: Vec<String>,
    /// Profile layer credited with the decision, if resolvable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_source: Option<ProfileSource>,
    /// Decision that produced the artifact.
    pub decision_id: DecisionId,
}

/// One rendered section of a [`ComplianceReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section title, one of the nine fixed section names.
    pub title: String,
    /// Rendered HTML body for this section.
    pub html: String,
}

/// The rendered, hashed compliance report for one approved plan version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Plan this report describes.
    pub plan_id: PlanId,
    /// Plan version this report describes; must be `approved`.
    pub plan_version: u32,
    /// The nine required sections, in fixed order.
    pub sections: Vec<ReportSection>,
    /// `SHA-256(canonical_body_bytes)`, full hex.
    pub report_hash: String,
    /// RFC 3339 timestamp supplied by the caller.
    pub generated_at: String,
    /// Actor who requested generation.
    pub generated_by: UserId,
}
