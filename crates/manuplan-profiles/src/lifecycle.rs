// manuplan-profiles/src/lifecycle.rs
// ============================================================================
// Module: Profile Lifecycle Transitions
// Description: The closed set of valid `LifecycleState` transitions for a
//              `StandardsProfile`.
// Purpose: Reject any transition attempt that does not match the declared
//          state machine rather than silently mutating state.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::StandardsProfile;

/// Moves a profile from `draft` to `submitted`.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Draft`].
pub fn submit(profile: &StandardsProfile) -> Result<StandardsProfile, DatumError> {
    require_state(profile, LifecycleState::Draft)?;
    Ok(StandardsProfile {
        state: LifecycleState::Submitted,
        ..profile.clone()
    })
}

/// Moves a profile from `submitted` to `approved`.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Submitted`].
pub fn approve(profile: &StandardsProfile) -> Result<StandardsProfile, DatumError> {
    require_state(profile, LifecycleState::Submitted)?;
    Ok(StandardsProfile {
        state: LifecycleState::Approved,
        ..profile.clone()
    })
}

/// Moves a profile from `submitted` to `rejected`.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Submitted`].
pub fn reject(profile: &StandardsProfile) -> Result<StandardsProfile, DatumError> {
    require_state(profile, LifecycleState::Submitted)?;
    Ok(StandardsProfile {
        state: LifecycleState::Rejected,
        ..profile.clone()
    })
}

/// Returns a `rejected` profile to `draft` on the same version, ready for
/// further edits.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Rejected`].
pub fn revise(profile: &StandardsProfile) -> Result<StandardsProfile, DatumError> {
    require_state(profile, LifecycleState::Rejected)?;
    Ok(StandardsProfile {
        state: LifecycleState::Draft,
        ..profile.clone()
    })
}

/// Retires an `approved` profile. The Standards Overlay Engine will refuse
/// it unless a run explicitly requests audit-replay.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Approved`].
pub fn deprecate(profile: &StandardsProfile) -> Result<StandardsProfile, DatumError> {
    require_state(profile, LifecycleState::Approved)?;
    Ok(StandardsProfile {
        state: LifecycleState::Deprecated,
        ..profile.clone()
    })
}

fn require_state(profile: &StandardsProfile, expected: LifecycleState) -> Result<(), DatumError> {
    if profile.state == expected {
        return Ok(());
    }
    Err(DatumError::PlanStateTransitionInvalid {
        reason: format!(
            "profile {} is {:?}, expected {:?}",
            profile.profile_id, profile.state, expected
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use manuplan_core::ProfileId;
    use manuplan_core::domain::ConflictPolicy;
    use manuplan_core::domain::OverrideMode;
    use manuplan_core::domain::ProfileType;

    fn draft() -> StandardsProfile {
        StandardsProfile {
            profile_id: ProfileId::new("p-1"),
            profile_type: ProfileType::Base,
            parent_profile_ids: Vec::new(),
            default_packs: Vec::new(),
            override_mode: OverrideMode::Additive,
            conflict_policy: ConflictPolicy::Error,
            state: LifecycleState::Draft,
            version: "1.0.0".to_owned(),
            parent_version: None,
        }
    }

    #[test]
    fn draft_submit_approve_happy_path() {
        let submitted = submit(&draft()).expect("submits");
        assert_eq!(submitted.state, LifecycleState::Submitted);
        let approved = approve(&submitted).expect("approves");
        assert_eq!(approved.state, LifecycleState::Approved);
    }

    #[test]
    fn reject_then_revise_returns_to_draft_same_version() {
        let submitted = submit(&draft()).expect("submits");
        let rejected = reject(&submitted).expect("rejects");
        assert_eq!(rejected.state, LifecycleState::Rejected);
        let revised = revise(&rejected).expect("revises");
        assert_eq!(revised.state, LifecycleState::Draft);
        assert_eq!(revised.version, "1.0.0");
    }

    #[test]
    fn approve_from_draft_is_rejected() {
        let err = approve(&draft()).expect_err("draft cannot jump to approved");
        assert!(matches!(err, DatumError::PlanStateTransitionInvalid { .. }));
    }

    #[test]
    fn deprecate_requires_approved() {
        let err = deprecate(&draft()).expect_err("draft cannot be deprecated");
        assert!(matches!(err, DatumError::PlanStateTransitionInvalid { .. }));
    }
}
