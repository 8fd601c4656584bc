// manuplan-plan/src/generator.rs
// ============================================================================
// Module: Plan Generator
// Description: Pure mapping from (Quote, SOERun?) to a draft DatumPlan v1.
// Purpose: Seed the baseline manufacturing sequence and fold in every
//          SOE-sourced step, test, and evidence item in deterministic order.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DecisionId;
use manuplan_core::PlanId;
use manuplan_core::QuoteId;
use manuplan_core::StepId;
use manuplan_core::domain::Action;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::Decision;
use manuplan_core::domain::EvidenceIntent;
use manuplan_core::domain::PlanState;
use manuplan_core::domain::PlanTest;
use manuplan_core::domain::SOERun;
use manuplan_core::domain::Step;
use manuplan_core::hashing;
use manuplan_core::hashing::HashAlgorithm;

/// The minimal external facts the generator needs about a quote. Board
/// geometry, BOM extraction, and line-item pricing are out of scope; the
/// generator consumes only what shapes the manufacturing sequence.
#[derive(Debug, Clone)]
pub struct Quote {
    /// Identifier of the external quote.
    pub quote_id: QuoteId,
    /// Export tier carried onto the generated plan.
    pub tier: u8,
}

/// The package-agnostic fabrication/assembly stages present on every plan
/// regardless of SOE content.
const BASELINE_SEQUENCE: &[&str] = &["INCOMING_INSPECTION", "SMT", "REFLOW", "FINAL_INSPECTION"];

/// Generates plan version 1 (`draft`, unlocked) from a quote and an
/// optional SOE run.
///
/// Pure: identical `(quote, soe_run)` bytes always produce byte-identical
/// canonical JSON.
#[must_use]
pub fn generate_plan(plan_id: PlanId, quote: &Quote, soe_run: Option<&SOERun>) -> DatumPlan {
    let mut sequence: u32 = 0;
    let mut steps = Vec::new();
    for kind in BASELINE_SEQUENCE {
        sequence += 1;
        steps.push(baseline_step(kind, sequence));
    }

    let mut tests = Vec::new();
    let mut evidence_intent = Vec::new();
    let mut soe_decision_ids = Vec::new();

    if let Some(run) = soe_run {
        // `run.decisions` is already in rule-evaluation order (active packs in
        // id order, rules within a pack in declaration order): the order the
        // standards actually intend a locked sequence group's members to
        // build in. Content-hash order is deterministic too but bears no
        // relation to build order, so it must not drive sequencing.
        let ordered_decisions: Vec<&Decision> = run.decisions.iter().collect();

        let mut sorted_ids: Vec<DecisionId> = ordered_decisions.iter().map(|d| d.id.clone()).collect();
        sorted_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        soe_decision_ids = sorted_ids;

        for group in group_step_insertions(&ordered_decisions) {
            for decision in group {
                sequence += 1;
                steps.push(step_from_decision(decision, sequence));
            }
        }

        for decision in &ordered_decisions {
            match (&decision.object_type[..], &decision.action) {
                ("test", Action::Require) => {
                    let test_sequence = u32::try_from(tests.len()).unwrap_or(u32::MAX) + 1;
                    tests.push(test_from_decision(decision, test_sequence));
                }
                ("evidence", Action::Require) => {
                    let retention = ordered_decisions.iter().find_map(|other| {
                        if other.object_id == decision.object_id {
                            if let Action::SetRetention { period } = &other.action {
                                return Some(period.clone());
                            }
                        }
                        None
                    });
                    evidence_intent.push(evidence_from_decision(decision, retention));
                }
                _ => {}
            }
        }
    }

    DatumPlan {
        plan_id,
        quote_id: quote.quote_id.clone(),
        version: 1,
        parent_version: None,
        state: PlanState::Draft,
        locked: false,
        tier: quote.tier,
        steps,
        tests,
        evidence_intent,
        soe_run_id: soe_run.map(|r| r.soe_run_id.clone()),
        soe_decision_ids,
        edit_metadata: None,
        approved_by: None,
        approved_at: None,
    }
}

fn baseline_step(kind: &str, sequence: u32) -> Step {
    let source_rules = vec!["BASELINE_DEFAULT_STEP".to_owned()];
    let step_id = step_content_hash(kind, sequence, None, &source_rules, None);
    Step {
        step_id,
        kind: kind.to_owned(),
        sequence,
        required: true,
        locked_sequence: false,
        parameters: None,
        acceptance: None,
        source_rules,
        soe_decision_id: None,
        soe_why: None,
    }
}

fn step_from_decision(decision: &Decision, sequence: u32) -> Step {
    let locked_sequence = matches!(
        &decision.action,
        Action::InsertStep {
            locked_sequence: Some(true),
            ..
        }
    );
    let source_rules = vec![decision.why.rule_id.to_string()];
    let step_id = step_content_hash(
        &decision.object_id,
        sequence,
        None,
        &source_rules,
        Some(&decision.id),
    );
    Step {
        step_id,
        kind: decision.object_id.clone(),
        sequence,
        required: true,
        locked_sequence,
        parameters: None,
        acceptance: None,
        source_rules,
        soe_decision_id: Some(decision.id.clone()),
        soe_why: Some(decision.why.summary.clone()),
    }
}

fn test_from_decision(decision: &Decision, sequence: u32) -> PlanTest {
    let source_rules = vec![decision.why.rule_id.to_string()];
    let test_id = step_content_hash(
        &decision.object_id,
        sequence,
        None,
        &source_rules,
        Some(&decision.id),
    );
    PlanTest {
        test_id,
        name: decision.object_id.clone(),
        sequence,
        source_rules,
        soe_decision_id: Some(decision.id.clone()),
        soe_why: Some(decision.why.summary.clone()),
    }
}

fn evidence_from_decision(decision: &Decision, retention: Option<String>) -> EvidenceIntent {
    let source_rules = vec![decision.why.rule_id.to_string()];
    let evidence_id = step_content_hash(&decision.object_id, 0, None, &source_rules, Some(&decision.id));
    EvidenceIntent {
        evidence_id,
        description: decision.object_id.clone(),
        retention,
        source_rules,
        soe_decision_id: Some(decision.id.clone()),
    }
}

/// Groups `INSERT_STEP`/step-`REQUIRE` decisions by declared
/// `sequence_group`, preserving each group's first-appearance position in
/// `ordered` (the rule-evaluation order of the owning [`SOERun`]'s
/// decisions), and keeping its members in that same order within the
/// group. Ungrouped decisions form singleton groups.
fn group_step_insertions<'a>(ordered: &[&'a Decision]) -> Vec<Vec<&'a Decision>> {
    let mut groups: Vec<(Option<String>, Vec<&'a Decision>)> = Vec::new();
    for decision in ordered.iter().copied() {
        let is_step_insertion = matches!(decision.action, Action::InsertStep { .. })
            || (decision.object_type == "step" && matches!(decision.action, Action::Require));
        if !is_step_insertion {
            continue;
        }
        let group_key = match &decision.action {
            Action::InsertStep {
                sequence_group: Some(group),
                ..
            } => Some(group.clone()),
            _ => None,
        };
        match &group_key {
            Some(key) => {
                if let Some((_, members)) = groups
                    .iter_mut()
                    .find(|(existing, _)| existing.as_deref() == Some(key.as_str()))
                {
                    members.push(decision);
                } else {
                    groups.push((group_key, vec![decision]));
                }
            }
            None => groups.push((None, vec![decision])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

fn step_content_hash(
    kind: &str,
    sequence: u32,
    parameters: Option<&serde_json::Value>,
    source_rules: &[String],
    soe_decision_id: Option<&DecisionId>,
) -> StepId {
    let payload = serde_json::json!({
        "type": kind,
        "sequence": sequence,
        "parameters": parameters,
        "source_rules": source_rules,
        "soe_decision_id": soe_decision_id.map(DecisionId::to_string),
    });
    let full_hex = hashing::hash_canonical_json(HashAlgorithm::Sha256, &payload).unwrap_or_default();
    StepId::new(full_hex)
}
