// manuplan-profiles/src/version.rs
// ============================================================================
// Module: Profile Versioning
// Description: Semver bump and fork-on-edit rules for approved profiles.
// Purpose: Every edit to an approved profile produces a new version rather
//          than mutating published, already-relied-upon data.
// Dependencies: manuplan-core
// ============================================================================

use manuplan_core::DatumError;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::StandardsProfile;

/// Which segment of a `X.Y.Z` version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    /// Breaking change to the profile's contract with downstream plans.
    Major,
    /// Backwards-compatible addition (new packs, widened defaults).
    Minor,
    /// Non-semantic correction (typo in a citation, reordering).
    Patch,
}

/// Increments one segment of a `X.Y.Z` semantic version, resetting the
/// segments to its right to zero.
///
/// # Errors
///
/// Returns [`DatumError::PlanInvalidEdit`] if `version` is not a valid
/// `X.Y.Z` triple of non-negative integers.
pub fn bump_version(version: &str, bump: VersionBump) -> Result<String, DatumError> {
    let parts: Vec<&str> = version.split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return Err(invalid(version));
    };
    let major: u64 = major.parse().map_err(|_| invalid(version))?;
    let minor: u64 = minor.parse().map_err(|_| invalid(version))?;
    let patch: u64 = patch.parse().map_err(|_| invalid(version))?;
    let (major, minor, patch) = match bump {
        VersionBump::Major => (major + 1, 0, 0),
        VersionBump::Minor => (major, minor + 1, 0),
        VersionBump::Patch => (major, minor, patch + 1),
    };
    Ok(format!("{major}.{minor}.{patch}"))
}

fn invalid(version: &str) -> DatumError {
    DatumError::PlanInvalidEdit {
        reason: format!("not a valid X.Y.Z semantic version: {version}"),
    }
}

/// Forks an `approved` profile into a new `draft` version, recording the
/// fork lineage via `parent_version`.
///
/// # Errors
///
/// Returns [`DatumError::PlanStateTransitionInvalid`] if `profile.state` is
/// not [`LifecycleState::Approved`], or the bump/invalid-version errors
/// from [`bump_version`].
pub fn fork(profile: &StandardsProfile, bump: VersionBump) -> Result<StandardsProfile, DatumError> {
    if profile.state != LifecycleState::Approved {
        return Err(DatumError::PlanStateTransitionInvalid {
            reason: format!(
                "profile {} is {:?}, expected Approved to fork",
                profile.profile_id, profile.state
            ),
        });
    }
    let next_version = bump_version(&profile.version, bump)?;
    Ok(StandardsProfile {
        state: LifecycleState::Draft,
        parent_version: Some(profile.version.clone()),
        version: next_version,
        ..profile.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use manuplan_core::ProfileId;
    use manuplan_core::domain::ConflictPolicy;
    use manuplan_core::domain::OverrideMode;
    use manuplan_core::domain::ProfileType;

    fn approved(version: &str) -> StandardsProfile {
        StandardsProfile {
            profile_id: ProfileId::new("p-1"),
            profile_type: ProfileType::Base,
            parent_profile_ids: Vec::new(),
            default_packs: Vec::new(),
            override_mode: OverrideMode::Additive,
            conflict_policy: ConflictPolicy::Error,
            state: LifecycleState::Approved,
            version: version.to_owned(),
            parent_version: None,
        }
    }

    #[test]
    fn bump_patch_increments_trailing_segment() {
        assert_eq!(bump_version("1.2.3", VersionBump::Patch).expect("bumps"), "1.2.4");
        assert_eq!(bump_version("1.2.3", VersionBump::Minor).expect("bumps"), "1.3.0");
        assert_eq!(bump_version("1.2.3", VersionBump::Major).expect("bumps"), "2.0.0");
    }

    #[test]
    fn bump_rejects_malformed_version() {
        let err = bump_version("1.2", VersionBump::Patch).expect_err("malformed");
        assert!(matches!(err, DatumError::PlanInvalidEdit { .. }));
    }

    #[test]
    fn fork_bumps_version_and_sets_lineage() {
        let forked = fork(&approved("1.0.0"), VersionBump::Minor).expect("forks");
        assert_eq!(forked.version, "1.1.0");
        assert_eq!(forked.parent_version.as_deref(), Some("1.0.0"));
        assert_eq!(forked.state, LifecycleState::Draft);
    }

    #[test]
    fn fork_requires_approved_source() {
        let mut draft = approved("1.0.0");
        draft.state = LifecycleState::Draft;
        let err = fork(&draft, VersionBump::Patch).expect_err("draft cannot fork");
        assert!(matches!(err, DatumError::PlanStateTransitionInvalid { .. }));
    }
}
