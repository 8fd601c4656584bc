// manuplan-compliance/src/export.rs
// ============================================================================
// Module: Hardened Export
// Description: Approved-only export to csv, json, and placement_csv, with
//              embedded provenance and content hashing on the json path.
// Purpose: Give downstream MES/ERP systems a tamper-evident artifact that
//          can never be produced from an unapproved plan.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::ProfileId;
use manuplan_core::UserId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::PlanState;
use manuplan_core::hashing;
use manuplan_core::hashing::HashAlgorithm;

use crate::audit::deprecated_profile_advisories;

/// The supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain step/test/evidence listing.
    Csv,
    /// Full plan content plus embedded provenance and a content hash.
    Json,
    /// Pick-and-place program data; an execution output subject to tier
    /// gating.
    PlacementCsv,
}

/// Embedded in a `json` export so a recipient can verify what approved it
/// without a separate round trip to the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Provenance {
    /// Exported plan version.
    pub plan_version: u32,
    /// Profile ids active when the plan's SOE run was evaluated.
    pub profile_stack: Vec<ProfileId>,
    /// Actor who approved the plan.
    pub approved_by: Option<UserId>,
    /// RFC 3339 approval timestamp.
    pub approved_at: Option<String>,
    /// RFC 3339 timestamp this export was generated, supplied by the
    /// caller so the function stays pure.
    pub export_generated_at: String,
    /// `PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:<id>` for every profile in
    /// `profile_stack` that is deprecated. Non-fatal: a deprecated profile
    /// is still a usable reference, but an artifact built on one is worth
    /// flagging wherever it lands.
    pub audit_advisories: Vec<String>,
}

/// One export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Format produced.
    pub format: ExportFormat,
    /// Serialized body.
    pub body: String,
    /// `SHA-256(canonical(content_without_hash))`, present only for `json`.
    pub content_hash: Option<String>,
}

/// Exports `plan` as `format`.
///
/// # Errors
///
/// Returns [`DatumError::ExportRequiresApproval`] if `plan.state` is not
/// [`PlanState::Approved`], or [`DatumError::TierInsufficient`] if `format`
/// is [`ExportFormat::PlacementCsv`] and `plan.tier < 3`.
pub fn export(
    plan: &DatumPlan,
    profile_stack: &[ProfileId],
    profile_state: impl Fn(&ProfileId) -> Option<LifecycleState>,
    format: ExportFormat,
    export_generated_at: String,
) -> Result<ExportArtifact, DatumError> {
    if plan.state != PlanState::Approved {
        return Err(DatumError::ExportRequiresApproval);
    }
    if matches!(format, ExportFormat::PlacementCsv) && plan.tier < 3 {
        return Err(DatumError::TierInsufficient { required: 3, actual: plan.tier });
    }

    match format {
        ExportFormat::Csv | ExportFormat::PlacementCsv => {
            Ok(ExportArtifact { format, body: render_csv(plan), content_hash: None })
        }
        ExportFormat::Json => {
            let provenance = Provenance {
                plan_version: plan.version,
                profile_stack: profile_stack.to_vec(),
                approved_by: plan.approved_by.clone(),
                approved_at: plan.approved_at.clone(),
                export_generated_at,
                audit_advisories: deprecated_profile_advisories(profile_stack, profile_state),
            };
            let content = serde_json::json!({ "plan": plan, "provenance": provenance });
            let content_hash = hashing::hash_canonical_json(HashAlgorithm::Sha256, &content)
                .unwrap_or_default();
            let mut full = content;
            full["content_hash"] = serde_json::Value::String(content_hash.clone());
            let body = serde_json::to_string(&full).unwrap_or_default();
            Ok(ExportArtifact { format, body, content_hash: Some(content_hash) })
        }
    }
}

fn render_csv(plan: &DatumPlan) -> String {
    let mut out = String::from("sequence,type,step_id,locked_sequence\n");
    for step in &plan.steps {
        out.push_str(&format!("{},{},{},{}\n", step.sequence, step.kind, step.step_id, step.locked_sequence));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use manuplan_core::PlanId;
    use manuplan_core::QuoteId;
    use manuplan_core::SoeRunId;

    fn approved_plan(tier: u8) -> DatumPlan {
        DatumPlan {
            plan_id: PlanId::new("plan-1"),
            quote_id: QuoteId::new("quote-1"),
            version: 1,
            parent_version: None,
            state: PlanState::Approved,
            locked: true,
            tier,
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

    #[test]
    fn draft_plan_export_is_refused() {
        let mut plan = approved_plan(5);
        plan.state = PlanState::Draft;
        let err = export(&plan, &[], |_| None, ExportFormat::Csv, "2026-01-01T00:00:00Z".to_owned())
            .expect_err("refuses draft");
        assert!(matches!(err, DatumError::ExportRequiresApproval));
    }

    #[test]
    fn placement_csv_below_tier_three_is_refused() {
        let plan = approved_plan(2);
        let err = export(&plan, &[], |_| None, ExportFormat::PlacementCsv, "2026-01-01T00:00:00Z".to_owned())
            .expect_err("refuses low tier");
        assert!(matches!(err, DatumError::TierInsufficient { required: 3, actual: 2 }));
    }

    #[test]
    fn json_export_embeds_content_hash() {
        let plan = approved_plan(3);
        let artifact = export(&plan, &[], |_| None, ExportFormat::Json, "2026-01-01T00:00:00Z".to_owned())
            .expect("exports");
        assert!(artifact.content_hash.is_some());
        assert!(artifact.body.contains("content_hash"));
    }

    #[test]
    fn json_export_carries_a_deprecated_profile_advisory_without_failing() {
        let plan = approved_plan(3);
        let artifact = export(
            &plan,
            &[ProfileId::new("base-ipc")],
            |_| Some(LifecycleState::Deprecated),
            ExportFormat::Json,
            "2026-01-01T00:00:00Z".to_owned(),
        )
        .expect("a deprecated profile reference does not block export");
        assert!(artifact.body.contains("PROFILE_DEPRECATED_IN_ACTIVE_ARTIFACT:base-ipc"));
    }
}
