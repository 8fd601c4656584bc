// manuplan-compliance/src/trace.rs
// ============================================================================
// Module: Per-Item Traceability
// Description: Maps each SOE-derived step, test, and evidence item on a
//              plan back to the rule, pack, and profile that produced it.
// Purpose: Give the report renderer and external auditors a single,
//          consistent join between plan content and SOE decisions.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DecisionId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::SOERun;
use manuplan_core::domain::TraceEntry;

/// Which part of the plan a [`TracedItem`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceItemKind {
    /// A manufacturing step.
    Step,
    /// A declared test.
    Test,
    /// A retained evidence item.
    Evidence,
}

/// A [`TraceEntry`] paired with the plan item it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedItem {
    /// Kind of plan item this entry describes.
    pub item_kind: TraceItemKind,
    /// The item's own id (step/test/evidence id) as a string.
    pub item_id: String,
    /// The traceability record itself.
    pub entry: TraceEntry,
}

/// Traces every SOE-derived step, test, and evidence item on `plan` back to
/// its originating decision in `soe_run`. Items without a `soe_decision_id`
/// (for example the fixed baseline sequence) are not SOE-derived and are
/// omitted. An item whose `soe_decision_id` does not resolve in `soe_run`
/// is also omitted here; that inconsistency is what
/// [`crate::check_audit_integrity`] exists to catch.
#[must_use]
pub fn trace_plan(plan: &DatumPlan, soe_run: &SOERun) -> Vec<TracedItem> {
    let mut entries = Vec::new();

    for step in &plan.steps {
        if let Some(decision_id) = &step.soe_decision_id {
            if let Some(item) = traced_item(TraceItemKind::Step, step.step_id.as_str(), decision_id, soe_run) {
                entries.push(item);
            }
        }
    }
    for test in &plan.tests {
        if let Some(decision_id) = &test.soe_decision_id {
            if let Some(item) = traced_item(TraceItemKind::Test, test.test_id.as_str(), decision_id, soe_run) {
                entries.push(item);
            }
        }
    }
    for evidence in &plan.evidence_intent {
        if let Some(decision_id) = &evidence.soe_decision_id {
            if let Some(item) =
                traced_item(TraceItemKind::Evidence, evidence.evidence_id.as_str(), decision_id, soe_run)
            {
                entries.push(item);
            }
        }
    }

    entries
}

fn traced_item(
    item_kind: TraceItemKind,
    item_id: &str,
    decision_id: &DecisionId,
    soe_run: &SOERun,
) -> Option<TracedItem> {
    let decision = soe_run.decisions.iter().find(|d| &d.id == decision_id)?;
    Some(TracedItem {
        item_kind,
        item_id: item_id.to_owned(),
        entry: TraceEntry {
            rule_id: decision.why.rule_id.clone(),
            pack_id: decision.why.pack_id.clone(),
            citations: decision.why.citations.clone(),
            profile_source: decision.profile_source.clone(),
            decision_id: decision.id.clone(),
        },
    })
}
