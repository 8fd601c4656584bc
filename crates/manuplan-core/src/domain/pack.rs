// manuplan-core/src/domain/pack.rs
// ============================================================================
// Module: Standards Packs & Rules
// Description: Immutable catalog data cited by the Standards Overlay Engine.
// Purpose: Model an ordered collection of rules citing a specific external
//          standard.
// Dependencies: serde, crate::{identifiers, rule_expr}
// ============================================================================

//! ## Overview
//! A [`StandardsPack`] is loaded from an external catalog and is immutable
//! once published; the catalog itself lives behind [`crate::interfaces::PackCatalog`]
//! so the evaluator never has to know how packs are stored.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::PackId;
use crate::identifiers::RuleId;
use crate::rule_expr::RuleExpr;

/// How severely a matched rule's requirement should be treated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; does not block release on its own.
    Info,
    /// Should be satisfied; blocks release only if escalated.
    Advisory,
    /// Must be satisfied prior to release.
    Mandatory,
}

/// What a matched rule asks the downstream machinery to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// The decision must be satisfied before release.
    BlockRelease,
    /// The decision should be satisfied but does not block release.
    Advisory,
}

/// A single rule within a [`StandardsPack`].
///
/// Evaluation of `trigger` must be deterministic: see
/// [`crate::rule_expr::eval`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier within the pack.
    pub rule_id: RuleId,
    /// Human-readable one-line description.
    pub summary: String,
    /// Clause citations into the underlying external standard.
    pub citations: Vec<String>,
    /// Condition under which this rule's actions fire.
    pub trigger: RuleExpr,
    /// Actions to emit, one [`crate::domain::soe::Decision`] per action, when
    /// `trigger` matches.
    pub actions: Vec<RuleAction>,
    /// Enforcement strength, if the rule contributes to a gate.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enforcement: Option<Enforcement>,
    /// Relative importance, independent of enforcement.
    pub severity: Severity,
}

/// An action payload attached to a [`Rule`].
///
/// This mirrors [`crate::domain::soe::Action`] but is the *declared* form
/// stored in catalog data; the SOE engine turns a matched
/// `(Rule, RuleAction)` pair into a `Decision` carrying the closed
/// [`crate::domain::soe::Action`] enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleAction {
    /// The kind of action and its payload.
    pub action: crate::domain::soe::Action,
    /// Type of the object the action applies to (e.g. `"step"`, `"test"`,
    /// `"evidence"`, `"gate"`).
    pub object_type: String,
    /// Identifier of the object within its type namespace.
    pub object_id: String,
}

/// An ordered collection of rules citing one external standard.
///
/// Immutable once published; loaded from an external catalog via
/// [`crate::interfaces::PackCatalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardsPack {
    /// Unique identifier, used as the sort key for determinism.
    pub pack_id: PackId,
    /// Industry this pack primarily applies to.
    pub industry: String,
    /// Rules in declaration order; evaluation preserves this order.
    pub rules: Vec<Rule>,
}
