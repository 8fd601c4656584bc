// manuplan-plan/src/diff.rs
// ============================================================================
// Module: Plan Diff
// Description: Deterministic structured diff between two versions of the
//              same plan.
// Purpose: Give reviewers and audit tooling a stable, field-level view of
//          what changed between versions without re-deriving it from raw
//          JSON each time.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::StepId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::Step;

/// A single step's change between two plan versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDiff {
    /// The step involved.
    pub step_id: StepId,
    /// Sequence number in the earlier version, if present there.
    pub before_sequence: Option<u32>,
    /// Sequence number in the later version, if present there.
    pub after_sequence: Option<u32>,
    /// Whether the step's parameters or acceptance text changed.
    pub content_changed: bool,
}

/// A deterministic, structured diff between two versions of one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDiff {
    /// Steps present only in the earlier version.
    pub removed: Vec<StepId>,
    /// Steps present only in the later version.
    pub added: Vec<StepId>,
    /// Steps present in both versions, with any change recorded.
    pub changed: Vec<StepDiff>,
}

/// Computes the structured diff from `before` to `after`. Both must share
/// the same `plan_id`; the diff of a version against itself is always
/// empty.
#[must_use]
pub fn diff(before: &DatumPlan, after: &DatumPlan) -> PlanDiff {
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    for before_step in &before.steps {
        match after.steps.iter().find(|s| s.step_id == before_step.step_id) {
            None => removed.push(before_step.step_id.clone()),
            Some(after_step) => {
                if before_step.sequence != after_step.sequence || content_differs(before_step, after_step) {
                    changed.push(StepDiff {
                        step_id: before_step.step_id.clone(),
                        before_sequence: Some(before_step.sequence),
                        after_sequence: Some(after_step.sequence),
                        content_changed: content_differs(before_step, after_step),
                    });
                }
            }
        }
    }

    let added: Vec<StepId> = after
        .steps
        .iter()
        .filter(|s| !before.steps.iter().any(|b| b.step_id == s.step_id))
        .map(|s| s.step_id.clone())
        .collect();

    removed.sort();
    changed.sort_by(|a, b| a.step_id.cmp(&b.step_id));
    let mut added = added;
    added.sort();

    PlanDiff { removed, added, changed }
}

fn content_differs(before: &Step, after: &Step) -> bool {
    before.parameters != after.parameters || before.acceptance != after.acceptance
}
