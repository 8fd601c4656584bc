// manuplan-plan/src/editor.rs
// ============================================================================
// Module: Plan Editor
// Description: Controlled, override-gated edits to a draft plan's steps.
// Purpose: Let callers freely edit non-SOE content while requiring a
//          recorded, non-empty-reason override for anything that touches
//          an SOE-locked item.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::StepId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::EditMetadata;
use manuplan_core::domain::Override;
use manuplan_core::domain::PlanState;

/// One requested change to a draft plan's steps.
#[derive(Debug, Clone)]
pub enum EditOp {
    /// Removes the step with this id.
    RemoveStep(StepId),
    /// Reorders all steps to the given sequence of step ids. Must be a
    /// permutation of the plan's current step ids.
    ReorderSteps(Vec<StepId>),
    /// Replaces a step's free-form parameters.
    SetStepParameters {
        /// Step to modify.
        step_id: StepId,
        /// New parameter payload.
        parameters: Option<serde_json::Value>,
    },
    /// Replaces a step's acceptance criteria text.
    SetStepAcceptance {
        /// Step to modify.
        step_id: StepId,
        /// New acceptance text.
        acceptance: Option<String>,
    },
}

/// Applies `edits` to the latest version of `plan`, producing version
/// `N+1` with `edit_metadata` recording the actor, reason, and any
/// overrides used.
///
/// # Errors
///
/// Returns [`DatumError::PlanApprovedImmutable`] if `plan.state` is
/// [`PlanState::Approved`], [`DatumError::PlanStateTransitionInvalid`] if
/// it is any other non-`draft` state, [`DatumError::OverrideMissingReason`]
/// if an override has an empty reason, and
/// [`DatumError::PlanInvalidEdit`] if an edit touches an SOE-locked step
/// without a matching override.
pub fn edit(
    plan: &DatumPlan,
    edits: &[EditOp],
    edited_by: manuplan_core::UserId,
    edited_at: String,
    edit_reason: String,
    overrides: Vec<Override>,
) -> Result<DatumPlan, DatumError> {
    if plan.state == PlanState::Approved {
        return Err(DatumError::PlanApprovedImmutable);
    }
    if plan.state != PlanState::Draft {
        return Err(DatumError::PlanStateTransitionInvalid {
            reason: format!("plan {} v{} is {:?}, expected Draft", plan.plan_id, plan.version, plan.state),
        });
    }
    for ov in &overrides {
        if ov.reason.trim().is_empty() {
            return Err(DatumError::OverrideMissingReason);
        }
    }

    let mut steps = plan.steps.clone();
    for op in edits {
        match op {
            EditOp::RemoveStep(step_id) => {
                require_override_if_locked(plan, step_id, &overrides)?;
                steps.retain(|s| &s.step_id != step_id);
            }
            EditOp::ReorderSteps(new_order) => {
                apply_reorder(plan, &mut steps, new_order, &overrides)?;
            }
            EditOp::SetStepParameters { step_id, parameters } => {
                let step = steps
                    .iter_mut()
                    .find(|s| &s.step_id == step_id)
                    .ok_or_else(|| DatumError::PlanInvalidEdit {
                        reason: format!("no such step {step_id}"),
                    })?;
                step.parameters = parameters.clone();
            }
            EditOp::SetStepAcceptance { step_id, acceptance } => {
                let step = steps
                    .iter_mut()
                    .find(|s| &s.step_id == step_id)
                    .ok_or_else(|| DatumError::PlanInvalidEdit {
                        reason: format!("no such step {step_id}"),
                    })?;
                step.acceptance = acceptance.clone();
            }
        }
    }

    for sequence_group in locked_sequence_runs(&plan.steps) {
        if !contiguous_and_ordered(&steps, &sequence_group) {
            let touched = sequence_group
                .iter()
                .any(|id| overrides.iter().any(|ov| ov.constraint == id.as_str()));
            if !touched {
                return Err(DatumError::PlanInvalidEdit {
                    reason: "locked sequence reordered without override".to_owned(),
                });
            }
        }
    }

    Ok(DatumPlan {
        version: plan.version + 1,
        parent_version: Some(plan.version),
        state: PlanState::Draft,
        locked: false,
        steps,
        edit_metadata: Some(EditMetadata {
            edited_by,
            edited_at,
            edit_reason,
            overrides,
        }),
        approved_by: None,
        approved_at: None,
        ..plan.clone()
    })
}

fn require_override_if_locked(
    plan: &DatumPlan,
    step_id: &StepId,
    overrides: &[Override],
) -> Result<(), DatumError> {
    let Some(step) = plan.steps.iter().find(|s| &s.step_id == step_id) else {
        return Err(DatumError::PlanInvalidEdit {
            reason: format!("no such step {step_id}"),
        });
    };
    let is_locked = step.soe_decision_id.is_some() || step.locked_sequence;
    if !is_locked {
        return Ok(());
    }
    let has_override = overrides.iter().any(|ov| ov.constraint == step_id.as_str());
    if has_override {
        return Ok(());
    }
    Err(DatumError::PlanInvalidEdit {
        reason: format!("step {step_id} is SOE-locked; an override is required"),
    })
}

fn apply_reorder(
    plan: &DatumPlan,
    steps: &mut Vec<manuplan_core::domain::Step>,
    new_order: &[StepId],
    overrides: &[Override],
) -> Result<(), DatumError> {
    if new_order.len() != steps.len() {
        return Err(DatumError::PlanInvalidEdit {
            reason: "reorder must be a permutation of the current steps".to_owned(),
        });
    }
    for (position, step_id) in new_order.iter().enumerate() {
        let original = plan
            .steps
            .iter()
            .find(|s| &s.step_id == step_id)
            .ok_or_else(|| DatumError::PlanInvalidEdit {
                reason: format!("no such step {step_id}"),
            })?;
        let moved = original.sequence != u32::try_from(position).unwrap_or(u32::MAX) + 1;
        if moved && (original.soe_decision_id.is_some() || original.locked_sequence) {
            let has_override = overrides.iter().any(|ov| ov.constraint == step_id.as_str());
            if !has_override {
                return Err(DatumError::PlanInvalidEdit {
                    reason: format!("step {step_id} is SOE-locked; reordering requires an override"),
                });
            }
        }
    }
    let mut reordered = Vec::with_capacity(steps.len());
    for (position, step_id) in new_order.iter().enumerate() {
        let mut step = steps
            .iter()
            .find(|s| &s.step_id == step_id)
            .cloned()
            .ok_or_else(|| DatumError::PlanInvalidEdit {
                reason: format!("no such step {step_id}"),
            })?;
        step.sequence = u32::try_from(position).unwrap_or(u32::MAX) + 1;
        reordered.push(step);
    }
    *steps = reordered;
    Ok(())
}

/// Returns each maximal run of contiguous, locked-sequence step ids in the
/// parent version's step order.
fn locked_sequence_runs(steps: &[manuplan_core::domain::Step]) -> Vec<Vec<StepId>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for step in steps {
        if step.locked_sequence {
            current.push(step.step_id.clone());
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Returns `true` if `run`'s members still appear contiguously and in the
/// same relative order within `steps`.
fn contiguous_and_ordered(steps: &[manuplan_core::domain::Step], run: &[StepId]) -> bool {
    let positions: Vec<usize> = run
        .iter()
        .filter_map(|id| steps.iter().position(|s| &s.step_id == id))
        .collect();
    if positions.len() != run.len() {
        return false;
    }
    positions.windows(2).all(|pair| pair[1] == pair[0] + 1)
}
