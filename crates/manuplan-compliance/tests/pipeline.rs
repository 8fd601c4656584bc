// crates/manuplan-compliance/tests/pipeline.rs
// ============================================================================
// Module: Compliance Pipeline Integration Tests
// Description: Drives trace, report, export, and audit integrity against a
//              plan generated from a real SOE run rather than the empty
//              fixtures each unit test module uses in isolation.
// Purpose: Catch join mistakes between `manuplan-soe`'s decision ids and
//          `manuplan-compliance`'s traceability/export/audit logic that no
//          single crate's own unit tests would see.
// ============================================================================

//! Compliance pipeline integration tests.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

use manuplan_core::IndustryId;
use manuplan_core::PackId;
use manuplan_core::PlanId;
use manuplan_core::ProfileId;
use manuplan_core::QuoteId;
use manuplan_core::RuleId;
use manuplan_core::SoeRunId;
use manuplan_core::UserId;
use manuplan_core::domain::Action;
use manuplan_core::domain::Enforcement;
use manuplan_core::domain::IndustryProfile;
use manuplan_core::domain::OverrideMode;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::ProfileType;
use manuplan_core::domain::Rule;
use manuplan_core::domain::RuleAction;
use manuplan_core::domain::Severity;
use manuplan_core::domain::StandardsPack;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::domain::LifecycleState;
use manuplan_core::rule_expr::Context;
use manuplan_core::rule_expr::Op;
use manuplan_core::rule_expr::RuleExpr;
use manuplan_core::testing::InMemoryPackCatalog;
use manuplan_core::testing::InMemoryProfileCatalog;
use manuplan_compliance::ExportFormat;
use manuplan_compliance::check_audit_integrity;
use manuplan_compliance::export;
use manuplan_compliance::render_report;
use manuplan_compliance::trace_plan;
use manuplan_plan::Quote;
use manuplan_plan::approve;
use manuplan_plan::generate_plan;
use manuplan_plan::submit;
use manuplan_soe::ProfileSelection;
use manuplan_soe::SoeInput;
use manuplan_soe::evaluate;

fn trigger() -> RuleExpr {
    RuleExpr::Leaf { field: "processes".to_owned(), op: Op::Contains, value: Some(serde_json::json!("AS9100_AUDIT")) }
}

fn ipc_a610_pack() -> StandardsPack {
    StandardsPack {
        pack_id: PackId::new("IPC_A610"),
        industry: "aerospace".to_owned(),
        rules: vec![
            Rule {
                rule_id: RuleId::new("IPC-A610-STEP"),
                summary: "require class 3 workmanship inspection".to_owned(),
                citations: vec!["IPC-A-610 §8.1".to_owned()],
                trigger: trigger(),
                actions: vec![RuleAction {
                    action: Action::InsertStep { locked_sequence: None, sequence_group: None },
                    object_type: "step".to_owned(),
                    object_id: "WORKMANSHIP_INSPECTION".to_owned(),
                }],
                enforcement: Some(Enforcement::BlockRelease),
                severity: Severity::Mandatory,
            },
            Rule {
                rule_id: RuleId::new("IPC-A610-TEST"),
                summary: "require solder joint test".to_owned(),
                citations: vec!["IPC-A-610 §8.3".to_owned()],
                trigger: trigger(),
                actions: vec![RuleAction {
                    action: Action::Require,
                    object_type: "test".to_owned(),
                    object_id: "SOLDER_JOINT".to_owned(),
                }],
                enforcement: Some(Enforcement::BlockRelease),
                severity: Severity::Mandatory,
            },
            Rule {
                rule_id: RuleId::new("IPC-A610-EVIDENCE"),
                summary: "retain travel card".to_owned(),
                citations: vec!["AS9100 §8.5.2".to_owned()],
                trigger: trigger(),
                actions: vec![
                    RuleAction {
                        action: Action::Require,
                        object_type: "evidence".to_owned(),
                        object_id: "TRAVEL_CARD".to_owned(),
                    },
                    RuleAction {
                        action: Action::SetRetention { period: "10y".to_owned() },
                        object_type: "evidence".to_owned(),
                        object_id: "TRAVEL_CARD".to_owned(),
                    },
                ],
                enforcement: Some(Enforcement::BlockRelease),
                severity: Severity::Mandatory,
            },
        ],
    }
}

fn seeded_catalogs() -> (InMemoryPackCatalog, InMemoryProfileCatalog) {
    let mut packs = InMemoryPackCatalog::new();
    packs.insert(ipc_a610_pack());

    let mut profiles = InMemoryProfileCatalog::new();
    profiles.insert_industry(IndustryProfile {
        industry_id: IndustryId::new("aerospace"),
        default_packs: Vec::new(),
        risk_posture: "high".to_owned(),
        traceability_depth: "full".to_owned(),
        evidence_retention: "10y".to_owned(),
    });
    profiles.insert_profile(StandardsProfile {
        profile_id: ProfileId::new("base-aerospace"),
        profile_type: ProfileType::Base,
        parent_profile_ids: Vec::new(),
        default_packs: vec![PackId::new("IPC_A610")],
        override_mode: OverrideMode::Additive,
        conflict_policy: ConflictPolicy::Error,
        state: LifecycleState::Approved,
        version: "1.0.0".to_owned(),
        parent_version: None,
    });
    (packs, profiles)
}

fn approved_plan_and_run() -> (manuplan_core::domain::DatumPlan, manuplan_core::domain::SOERun) {
    let (packs, profiles) = seeded_catalogs();
    let input = SoeInput {
        soe_run_id: SoeRunId::new("run-as9100"),
        industry_profile: IndustryId::new("aerospace"),
        hardware_class: None,
        context: Context::empty().with(
            "processes",
            serde_json::Value::Array(vec![serde_json::Value::String("AS9100_AUDIT".to_owned())]),
        ),
        selection: ProfileSelection::ActiveProfiles(vec![ProfileId::new("base-aerospace")]),
        additional_packs: Vec::new(),
        audit_replay: false,
    };
    let run = evaluate(&input, &profiles, &packs).expect("evaluates");

    let quote = Quote { quote_id: QuoteId::new("quote-as9100"), tier: 3 };
    let plan = generate_plan(PlanId::new("plan-as9100"), &quote, Some(&run));
    let submitted = submit(&plan).expect("submits");
    let approved = approve(&submitted, UserId::new("qa-1"), "2026-01-01T00:00:00Z".to_owned()).expect("approves");
    (approved, run)
}

#[test]
fn traced_items_join_every_soe_derived_plan_entry_to_its_decision() {
    let (plan, run) = approved_plan_and_run();
    let traced = trace_plan(&plan, &run);

    let soe_derived_count = plan.steps.iter().filter(|s| s.soe_decision_id.is_some()).count()
        + plan.tests.iter().filter(|t| t.soe_decision_id.is_some()).count()
        + plan.evidence_intent.iter().filter(|e| e.soe_decision_id.is_some()).count();
    assert_eq!(traced.len(), soe_derived_count);

    for item in &traced {
        assert!(run.decisions.iter().any(|d| d.id == item.entry.decision_id));
        assert!(!item.entry.citations.is_empty());
    }
}

#[test]
fn rendered_report_covers_every_soe_derived_citation() {
    let (plan, run) = approved_plan_and_run();
    let report = render_report(&plan, &run, "html", UserId::new("qa-1"), "2026-01-02T00:00:00Z".to_owned())
        .expect("renders");
    assert_eq!(report.sections.len(), 9);

    let traceability = &report.sections[3];
    assert_eq!(traceability.title, "Compliance Traceability");
    for decision in &run.decisions {
        assert!(traceability.html.contains(decision.id.as_str()));
    }
}

#[test]
fn json_export_content_hash_changes_if_the_plan_changes() {
    let (plan, _run) = approved_plan_and_run();
    let first = export(
        &plan,
        &[ProfileId::new("base-aerospace")],
        |_| Some(LifecycleState::Approved),
        ExportFormat::Json,
        "2026-01-03T00:00:00Z".to_owned(),
    )
    .expect("exports");

    let mut mutated = plan.clone();
    mutated.tier = plan.tier + 1;
    let second = export(
        &mutated,
        &[ProfileId::new("base-aerospace")],
        |_| Some(LifecycleState::Approved),
        ExportFormat::Json,
        "2026-01-03T00:00:00Z".to_owned(),
    )
    .expect("exports");

    assert_ne!(first.content_hash, second.content_hash);
}

#[test]
fn a_full_pipeline_run_has_clean_audit_integrity() {
    let (plan, run) = approved_plan_and_run();
    let report = check_audit_integrity(&plan, &run, |profile_id| {
        (profile_id.as_str() == "base-aerospace").then_some(LifecycleState::Approved)
    })
    .expect("clean audit passes");
    assert!(report.passed());
}
