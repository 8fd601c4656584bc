// manuplan-compliance/src/audit.rs
// ============================================================================
// Module: Audit Integrity Check
// Description: Verifies the cross-references an approved plan's compliance
//              artifacts depend on are all still intact.
// Purpose: Catch drift between a plan, its SOE run, and the profiles it was
//          evaluated against before that drift reaches a filed report.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::PlanState;
use manuplan_core::domain::SOERun;
use manuplan_core::hashing::DECISION_ID_HEX_LEN;

/// The outcome of [`check_audit_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditIntegrityReport {
    /// Names of the checks that failed; empty iff `passed`.
    pub findings: Vec<String>,
    /// Non-fatal notices: true but worth surfacing, never cause for a
    /// failing report. `PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:<id>` lands
    /// here, not in `findings`.
    pub advisories: Vec<String>,
}

impl AuditIntegrityReport {
    /// Whether every check passed. Ignores `advisories`.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }
}

/// `PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:<id>` for every id in
/// `profile_ids` that resolves to [`LifecycleState::Deprecated`].
/// Shared between [`check_audit_integrity`] and
/// [`crate::export::export`], which both need the same non-fatal signal.
#[must_use]
pub fn deprecated_profile_advisories(
    profile_ids: &[manuplan_core::ProfileId],
    profile_state: impl Fn(&manuplan_core::ProfileId) -> Option<LifecycleState>,
) -> Vec<String> {
    profile_ids
        .iter()
        .filter(|id| matches!(profile_state(id), Some(LifecycleState::Deprecated)))
        .map(|id| format!("PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:{id}"))
        .collect()
}

/// Runs every audit integrity check against `plan` and its `soe_run`,
/// resolving each profile in the run's stack through `profile_state`.
///
/// Checks: plan approved; provenance metadata present; every profile in
/// the stack is `approved` or `deprecated`; `soe_run_id` resolvable against
/// the plan; every SOE-sourced step/test/evidence item's decision id is
/// still present in `soe_run`; decision ids have the canonical
/// content-hash shape.
///
/// # Errors
///
/// Returns [`DatumError::AuditIntegrityFailed`] carrying every failing
/// check's name; never returns `Ok` with a non-empty finding list.
pub fn check_audit_integrity(
    plan: &DatumPlan,
    soe_run: &SOERun,
    profile_state: impl Fn(&manuplan_core::ProfileId) -> Option<LifecycleState>,
) -> Result<AuditIntegrityReport, DatumError> {
    let mut findings = Vec::new();

    if plan.state != PlanState::Approved {
        findings.push("plan_not_approved".to_owned());
    }
    if plan.approved_by.is_none() || plan.approved_at.is_none() {
        findings.push("provenance_metadata_missing".to_owned());
    }
    match &plan.soe_run_id {
        Some(plan_run_id) if *plan_run_id == soe_run.soe_run_id => {}
        _ => findings.push("soe_run_id_unresolvable".to_owned()),
    }

    let profile_ids: Vec<manuplan_core::ProfileId> =
        soe_run.profile_stack.iter().map(|entry| entry.profile_id.clone()).collect();
    let advisories = deprecated_profile_advisories(&profile_ids, &profile_state);
    for entry in &soe_run.profile_stack {
        match profile_state(&entry.profile_id) {
            Some(LifecycleState::Approved | LifecycleState::Deprecated) => {}
            _ => findings.push(format!("profile_not_approved_or_deprecated:{}", entry.profile_id)),
        }
    }

    for decision_id in referenced_decision_ids(plan) {
        if !soe_run.decisions.iter().any(|d| d.id.as_str() == decision_id) {
            findings.push(format!("decision_reference_dangling:{decision_id}"));
        }
        if decision_id.len() != DECISION_ID_HEX_LEN || !decision_id.chars().all(|c| c.is_ascii_hexdigit()) {
            findings.push(format!("decision_id_shape_invalid:{decision_id}"));
        }
    }

    if findings.is_empty() {
        Ok(AuditIntegrityReport { findings, advisories })
    } else {
        Err(DatumError::AuditIntegrityFailed { findings })
    }
}

fn referenced_decision_ids(plan: &DatumPlan) -> Vec<String> {
    let mut ids: Vec<String> = plan
        .steps
        .iter()
        .filter_map(|s| s.soe_decision_id.as_ref())
        .chain(plan.tests.iter().filter_map(|t| t.soe_decision_id.as_ref()))
        .chain(plan.evidence_intent.iter().filter_map(|e| e.soe_decision_id.as_ref()))
        .map(ToString::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use manuplan_core::IndustryId;
    use manuplan_core::PlanId;
    use manuplan_core::ProfileId;
    use manuplan_core::QuoteId;
    use manuplan_core::SoeRunId;
    use manuplan_core::UserId;

    fn approved_plan() -> DatumPlan {
        DatumPlan {
            plan_id: PlanId::new("plan-1"),
            quote_id: QuoteId::new("quote-1"),
            version: 1,
            parent_version: None,
            state: PlanState::Approved,
            locked: true,
            tier: 2,
            steps: Vec::new(),
            tests: Vec::new(),
            evidence_intent: Vec::new(),
            soe_run_id: Some(SoeRunId::new("run-1")),
            soe_decision_ids: Vec::new(),
            edit_metadata: None,
            approved_by: Some(UserId::new("qa-1")),
            approved_at: Some("2026-01-01T00:00:00Z".to_owned()),
        }
    }

    fn empty_run() -> SOERun {
        SOERun {
            soe_run_id: SoeRunId::new("run-1"),
            industry_profile: IndustryId::new("space"),
            hardware_class: None,
            active_packs: Vec::new(),
            profile_stack: Vec::new(),
            decisions: Vec::new(),
            gates: Vec::new(),
            required_evidence: Vec::new(),
            cost_modifiers: Vec::new(),
            audit_replay: false,
        }
    }

    #[test]
    fn clean_plan_passes_with_no_findings() {
        let report = check_audit_integrity(&approved_plan(), &empty_run(), |_| None).expect("passes");
        assert!(report.passed());
    }

    #[test]
    fn unresolvable_profile_reference_surfaces_as_a_finding() {
        let mut run = empty_run();
        run.profile_stack.push(manuplan_core::domain::ProfileStackEntry {
            profile_id: ProfileId::new("base-ipc"),
            profile_type: manuplan_core::domain::ProfileType::Base,
            layer: manuplan_core::domain::Layer::BASE,
            parent_profile_ids: Vec::new(),
        });
        let err = check_audit_integrity(&approved_plan(), &run, |_| None).expect_err("unresolved profile fails");
        let DatumError::AuditIntegrityFailed { findings } = err else {
            panic!("expected AuditIntegrityFailed");
        };
        assert!(findings.iter().any(|f| f.starts_with("profile_not_approved_or_deprecated")));
    }

    #[test]
    fn deprecated_profile_reference_passes_but_raises_an_advisory() {
        let mut run = empty_run();
        run.profile_stack.push(manuplan_core::domain::ProfileStackEntry {
            profile_id: ProfileId::new("base-ipc"),
            profile_type: manuplan_core::domain::ProfileType::Base,
            layer: manuplan_core::domain::Layer::BASE,
            parent_profile_ids: Vec::new(),
        });
        let report = check_audit_integrity(&approved_plan(), &run, |_| Some(LifecycleState::Deprecated))
            .expect("a deprecated profile is still a usable reference");
        assert!(report.passed());
        assert_eq!(report.advisories, vec!["PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:base-ipc".to_owned()]);
    }

    #[test]
    fn dangling_decision_reference_is_reported() {
        let mut plan = approved_plan();
        plan.steps.push(manuplan_core::domain::Step {
            step_id: manuplan_core::StepId::new("abc123abc123abcd"),
            kind: "SMT".to_owned(),
            sequence: 1,
            required: true,
            locked_sequence: false,
            parameters: None,
            acceptance: None,
            source_rules: Vec::new(),
            soe_decision_id: Some(manuplan_core::DecisionId::new("0000000000000000")),
            soe_why: None,
        });
        let err = check_audit_integrity(&plan, &empty_run(), |_| None).expect_err("dangling ref fails");
        let DatumError::AuditIntegrityFailed { findings } = err else {
            panic!("expected AuditIntegrityFailed");
        };
        assert!(findings.iter().any(|f| f.starts_with("decision_reference_dangling")));
    }
}
