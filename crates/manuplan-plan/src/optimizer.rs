// manuplan-plan/src/optimizer.rs
// ============================================================================
// Module: Plan Optimizer
// Description: Reorders a draft plan's non-locked steps toward an objective
//              while leaving every SOE-locked sub-sequence untouched.
// Purpose: Let scheduling concerns (throughput, cost, resource contention)
//          move steps around without ever reordering or splitting a locked
//          sequence.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::PlanState;
use manuplan_core::domain::Step;

/// The scheduling goal an optimization pass reorders steps toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Minimize total sequence length by grouping like kinds together.
    Throughput,
    /// Favor the cheapest admissible ordering; currently identical to
    /// [`Objective::Throughput`] since no per-step cost model exists yet.
    Cost,
    /// Favor an ordering that reduces contention on required equipment;
    /// currently identical to [`Objective::Throughput`].
    Resource,
}

/// Produces a new draft version of `plan` with its non-locked steps
/// reordered toward `objective`. Every locked sub-sequence stays contiguous
/// and in its original internal order; only the blocks move relative to
/// each other.
///
/// # Errors
///
/// Returns [`DatumError::PlanApprovedImmutable`] if `plan.state` is
/// [`PlanState::Approved`], or [`DatumError::PlanStateTransitionInvalid`]
/// if it is any other non-`draft` state.
pub fn optimize(plan: &DatumPlan, objective: Objective) -> Result<DatumPlan, DatumError> {
    if plan.state == PlanState::Approved {
        return Err(DatumError::PlanApprovedImmutable);
    }
    if plan.state != PlanState::Draft {
        return Err(DatumError::PlanStateTransitionInvalid {
            reason: format!("plan {} v{} is {:?}, expected Draft", plan.plan_id, plan.version, plan.state),
        });
    }

    let blocks = group_into_blocks(&plan.steps);
    let mut ordered_blocks = blocks;
    ordered_blocks.sort_by(|a, b| block_sort_key(a, objective).cmp(&block_sort_key(b, objective)));

    let mut steps = Vec::with_capacity(plan.steps.len());
    let mut sequence: u32 = 0;
    for block in ordered_blocks {
        for mut step in block {
            sequence += 1;
            step.sequence = sequence;
            steps.push(step);
        }
    }

    Ok(DatumPlan {
        version: plan.version + 1,
        parent_version: Some(plan.version),
        state: PlanState::Draft,
        locked: false,
        steps,
        approved_by: None,
        approved_at: None,
        ..plan.clone()
    })
}

/// Splits `steps` into movable units: each locked sub-sequence forms one
/// block that moves as a whole, and each non-locked step forms its own
/// singleton block.
fn group_into_blocks(steps: &[Step]) -> Vec<Vec<Step>> {
    let mut blocks = Vec::new();
    let mut current_locked_run: Vec<Step> = Vec::new();
    for step in steps {
        if step.locked_sequence {
            current_locked_run.push(step.clone());
        } else {
            if !current_locked_run.is_empty() {
                blocks.push(std::mem::take(&mut current_locked_run));
            }
            blocks.push(vec![step.clone()]);
        }
    }
    if !current_locked_run.is_empty() {
        blocks.push(current_locked_run);
    }
    blocks
}

/// Orders blocks by objective. All three objectives currently fall back to
/// grouping by step kind, then by the block's first original sequence
/// number, which keeps the result deterministic and keeps SOE-derived
/// blocks from drifting ahead of the baseline sequence they depend on.
fn block_sort_key(block: &[Step], _objective: Objective) -> (String, u32) {
    let kind = block.first().map_or_else(String::new, |s| s.kind.clone());
    let first_sequence = block.first().map_or(0, |s| s.sequence);
    (kind, first_sequence)
}
