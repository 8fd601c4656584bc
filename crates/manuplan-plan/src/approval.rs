// manuplan-plan/src/approval.rs
// ============================================================================
// Module: Plan Approval State Machine
// Description: draft -> submitted -> {approved, rejected} transitions, plus
//              forking a fresh draft from an approved ancestor.
// Purpose: Enforce that only a `submitted` plan can be approved or rejected,
//          that `approved` implies `locked`, and that nothing ever writes
//          to an approved version directly.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::UserId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::PlanState;

/// Moves a plan from `draft` to `submitted`.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `plan.state` is not
/// [`PlanState::Draft`].
pub fn submit(plan: &DatumPlan) -> Result<DatumPlan, DatumError> {
    require_state(plan, PlanState::Draft)?;
    Ok(DatumPlan {
        state: PlanState::Submitted,
        ..plan.clone()
    })
}

/// Moves a plan from `submitted` to `approved`, locking it and recording
/// the approving actor.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `plan.state` is not
/// [`PlanState::Submitted`].
pub fn approve(plan: &DatumPlan, approved_by: UserId, approved_at: String) -> Result<DatumPlan, DatumError> {
    require_state(plan, PlanState::Submitted)?;
    Ok(DatumPlan {
        state: PlanState::Approved,
        locked: true,
        approved_by: Some(approved_by),
        approved_at: Some(approved_at),
        ..plan.clone()
    })
}

/// Moves a plan from `submitted` back to `draft`, recorded as a rejection
/// at the same version.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `plan.state` is not
/// [`PlanState::Submitted`].
pub fn reject(plan: &DatumPlan) -> Result<DatumPlan, DatumError> {
    require_state(plan, PlanState::Submitted)?;
    Ok(DatumPlan {
        state: PlanState::Draft,
        ..plan.clone()
    })
}

/// Opens a new, unlocked draft version from an approved plan. This is the
/// only path to changing an approved plan's content: the approved version
/// itself is never written to again.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `plan.state` is not
/// [`PlanState::Approved`].
pub fn fork_from_approved(plan: &DatumPlan) -> Result<DatumPlan, DatumError> {
    require_state(plan, PlanState::Approved)?;
    Ok(DatumPlan {
        version: plan.version + 1,
        parent_version: Some(plan.version),
        state: PlanState::Draft,
        locked: false,
        approved_by: None,
        approved_at: None,
        edit_metadata: None,
        ..plan.clone()
    })
}

fn require_state(plan: &DatumPlan, expected: PlanState) -> Result<(), DatumError> {
    if plan.state == expected {
        return Ok(());
    }
    if plan.state == PlanState::Approved {
        return Err(DatumError::PlanApprovedImmutable);
    }
    Err(DatumError::PlanStateTransitionInvalid {
        reason: format!(
            "plan {} v{} is {:?}, expected {:?}",
            plan.plan_id, plan.version, plan.state, expected
        ),
    })
}
