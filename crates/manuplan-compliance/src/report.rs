// manuplan-compliance/src/report.rs
// ============================================================================
// Module: Compliance Report Renderer
// Description: The nine-section HTML compliance report.
// Purpose: Render a single, deterministic artifact a quality organization
//          can file against an approved build.
// Dependencies: manuplan-core, crate::trace
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::UserId;
use manuplan_core::domain::ComplianceReport;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::PlanState;
use manuplan_core::domain::ReportSection;
use manuplan_core::domain::SOERun;
use manuplan_core::hashing;
use manuplan_core::hashing::HashAlgorithm;

use crate::trace::TracedItem;
use crate::trace::trace_plan;

/// The nine fixed section titles, in required order.
const SECTION_TITLES: [&str; 9] = [
    "Executive Summary",
    "Scope",
    "Standards Coverage",
    "Compliance Traceability",
    "Deviations & Overrides",
    "Approvals Trail",
    "Profile Stack",
    "Evidence Requirements",
    "Audit Metadata",
];

/// Renders the nine-section compliance report for `plan` against its
/// `soe_run`, as `format`.
///
/// # Errors
///
/// Returns [`DatumError::ExportRequiresApproval`] if `plan.state` is not
/// [`PlanState::Approved`], or [`DatumError::UnsupportedFormat`] if
/// `format` is not `"html"`.
pub fn render_report(
    plan: &DatumPlan,
    soe_run: &SOERun,
    format: &str,
    generated_by: UserId,
    generated_at: String,
) -> Result<ComplianceReport, DatumError> {
    if format != "html" {
        return Err(DatumError::UnsupportedFormat { format: format.to_owned() });
    }
    if plan.state != PlanState::Approved {
        return Err(DatumError::ExportRequiresApproval);
    }

    let traced = trace_plan(plan, soe_run);
    let sections = build_sections(plan, soe_run, &traced);
    let canonical_body: String = sections.iter().map(|s| s.html.as_str()).collect();
    let report_hash = hashing::hash_bytes(HashAlgorithm::Sha256, canonical_body.as_bytes());

    Ok(ComplianceReport {
        plan_id: plan.plan_id.clone(),
        plan_version: plan.version,
        sections,
        report_hash,
        generated_at,
        generated_by,
    })
}

fn build_sections(plan: &DatumPlan, soe_run: &SOERun, traced: &[TracedItem]) -> Vec<ReportSection> {
    let bodies = [
        format!(
            "<p>Plan {} version {}, approved by {}.</p>",
            plan.plan_id,
            plan.version,
            plan.approved_by.as_ref().map_or("unknown", UserId::as_str),
        ),
        format!("<p>Industry profile {}, tier {}.</p>", soe_run.industry_profile, plan.tier),
        render_pack_list(soe_run),
        render_trace_table(traced),
        render_overrides(plan),
        render_approvals(plan),
        render_profile_stack(soe_run),
        render_evidence(plan),
        format!("<p>soe_run_id: {}</p>", soe_run.soe_run_id),
    ];
    SECTION_TITLES
        .into_iter()
        .zip(bodies)
        .map(|(title, html)| ReportSection { title: title.to_owned(), html })
        .collect()
}

fn render_pack_list(soe_run: &SOERun) -> String {
    let items: String = soe_run.active_packs.iter().map(|p| format!("<li>{p}</li>")).collect();
    format!("<ul>{items}</ul>")
}

fn render_trace_table(traced: &[TracedItem]) -> String {
    let rows: String = traced
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                item.item_id, item.entry.rule_id, item.entry.pack_id, item.entry.decision_id,
            )
        })
        .collect();
    format!("<table>{rows}</table>")
}

fn render_overrides(plan: &DatumPlan) -> String {
    let Some(metadata) = &plan.edit_metadata else {
        return "<p>No overrides recorded.</p>".to_owned();
    };
    let rows: String = metadata
        .overrides
        .iter()
        .map(|ov| format!("<tr><td>{}</td><td>{}</td><td>{}</td></tr>", ov.constraint, ov.reason, ov.user_id))
        .collect();
    format!("<table>{rows}</table>")
}

fn render_approvals(plan: &DatumPlan) -> String {
    format!(
        "<p>approved_by: {}, approved_at: {}</p>",
        plan.approved_by.as_ref().map_or("none", UserId::as_str),
        plan.approved_at.as_deref().unwrap_or("none"),
    )
}

fn render_profile_stack(soe_run: &SOERun) -> String {
    let rows: String = soe_run
        .profile_stack
        .iter()
        .map(|entry| format!("<tr><td>{}</td><td>{:?}</td></tr>", entry.profile_id, entry.profile_type))
        .collect();
    format!("<table>{rows}</table>")
}

fn render_evidence(plan: &DatumPlan) -> String {
    let rows: String = plan
        .evidence_intent
        .iter()
        .map(|e| format!("<tr><td>{}</td><td>{}</td></tr>", e.description, e.retention.as_deref().unwrap_or("-")))
        .collect();
    format!("<table>{rows}</table>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use manuplan_core::IndustryId;
    use manuplan_core::PlanId;
    use manuplan_core::QuoteId;
    use manuplan_core::SoeRunId;

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
    fn draft_plan_is_refused() {
        let mut plan = approved_plan();
        plan.state = PlanState::Draft;
        let err = render_report(&plan, &empty_run(), "html", UserId::new("qa-1"), "2026-01-01T00:00:00Z".to_owned())
            .expect_err("refuses draft");
        assert!(matches!(err, DatumError::ExportRequiresApproval));
    }

    #[test]
    fn non_html_format_is_rejected() {
        let err = render_report(
            &approved_plan(),
            &empty_run(),
            "pdf",
            UserId::new("qa-1"),
            "2026-01-01T00:00:00Z".to_owned(),
        )
        .expect_err("refuses pdf");
        assert!(matches!(err, DatumError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let first = render_report(
            &approved_plan(),
            &empty_run(),
            "html",
            UserId::new("qa-1"),
            "2026-01-01T00:00:00Z".to_owned(),
        )
        .expect("renders");
        let second = render_report(
            &approved_plan(),
            &empty_run(),
            "html",
            UserId::new("qa-1"),
            "2026-01-01T00:00:00Z".to_owned(),
        )
        .expect("renders");
        assert_eq!(first.report_hash, second.report_hash);
        assert_eq!(first.sections, second.sections);
    }

    #[test]
    fn has_nine_fixed_sections_in_order() {
        let report = render_report(
            &approved_plan(),
            &empty_run(),
            "html",
            UserId::new("qa-1"),
            "2026-01-01T00:00:00Z".to_owned(),
        )
        .expect("renders");
        assert_eq!(report.sections.len(), 9);
        assert_eq!(report.sections[0].title, "Executive Summary");
        assert_eq!(report.sections[8].title, "Audit Metadata");
    }
}
