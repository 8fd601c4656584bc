// manuplan-soe/src/resolve.rs
// ============================================================================
// Module: Profile & Pack Resolution
// Description: Profile graph loading, validation, and effective-pack
//              computation for the SOE engine.
// Purpose: Implement steps 1-3 of the SOE algorithm: resolve the profile
//          stack, validate it, and compute each profile's effective packs.
// Dependencies: manuplan-core
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use manuplan_core::BundleId;
use manuplan_core::DatumError;
use manuplan_core::PackId;
use manuplan_core::ProfileCatalog;
use manuplan_core::ProfileId;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::Layer;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::OverrideMode;
use manuplan_core::domain::ProfileType;
use manuplan_core::domain::StandardsProfile;

/// How the caller selected the active profile stack for one SOE run.
#[derive(Debug, Clone)]
pub enum ProfileSelection {
    /// An explicit, ordered list of profile ids.
    ActiveProfiles(Vec<ProfileId>),
    /// A named bundle, expanded to its declared profile id list.
    Bundle(BundleId),
    /// Neither given; falls back to industry-profile defaults only.
    Defaults,
}

/// A profile after loading, validation, and effective-pack computation.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// The loaded profile data.
    pub profile: StandardsProfile,
    /// Semantic layer, derived from `profile.profile_type`.
    pub layer: Layer,
    /// Packs this profile contributes, including inherited packs unless
    /// `override_mode == REPLACE`.
    pub effective_packs: Vec<PackId>,
}

/// Resolves and validates the profile stack for one SOE run.
///
/// Returns profiles in first-occurrence resolution order: bundle
/// expansion (if any), then `active_profiles`, deduplicated.
///
/// # Errors
///
/// Returns [`DatumError::ProfileGraphInvalid`] for cycles or layer-parenting
/// violations, and [`DatumError::ProfileUnusable`] when a profile is not
/// `approved` (or `deprecated` without `audit_replay`).
pub fn resolve_profile_stack(
    selection: &ProfileSelection,
    audit_replay: bool,
    catalog: &dyn ProfileCatalog,
) -> Result<Vec<ResolvedProfile>, DatumError> {
    let ids = resolve_profile_ids(selection, catalog)?;

    let mut loaded: BTreeMap<String, StandardsProfile> = BTreeMap::new();
    for id in &ids {
        load_with_ancestors(id, catalog, &mut loaded)?;
    }

    for id in &ids {
        let profile = &loaded[id.as_str()];
        validate_state(profile, audit_replay)?;
        validate_parenting(profile, &loaded)?;
    }
    detect_cycles(&loaded)?;

    let mut resolved = Vec::with_capacity(ids.len());
    for id in &ids {
        let profile = loaded[id.as_str()].clone();
        let layer = Layer::from(profile.profile_type);
        let effective_packs = effective_packs(&profile, &loaded, &mut BTreeSet::new());
        resolved.push(ResolvedProfile {
            profile,
            layer,
            effective_packs,
        });
    }
    Ok(resolved)
}

fn resolve_profile_ids(
    selection: &ProfileSelection,
    catalog: &dyn ProfileCatalog,
) -> Result<Vec<ProfileId>, DatumError> {
    let raw = match selection {
        ProfileSelection::ActiveProfiles(ids) => ids.clone(),
        ProfileSelection::Bundle(bundle_id) => catalog
            .get_bundle(bundle_id)
            .map_err(|err| DatumError::ProfileGraphInvalid {
                reason: format!("bundle {bundle_id} could not be resolved: {err}"),
            })?
            .profile_ids,
        ProfileSelection::Defaults => Vec::new(),
    };
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::with_capacity(raw.len());
    for id in raw {
        if seen.insert(id.as_str().to_owned()) {
            ordered.push(id);
        }
    }
    Ok(ordered)
}

fn load_with_ancestors(
    id: &ProfileId,
    catalog: &dyn ProfileCatalog,
    loaded: &mut BTreeMap<String, StandardsProfile>,
) -> Result<(), DatumError> {
    if loaded.contains_key(id.as_str()) {
        return Ok(());
    }
    let profile =
        catalog
            .get_profile(id)
            .map_err(|err| DatumError::ProfileGraphInvalid {
                reason: format!("profile {id} could not be resolved: {err}"),
            })?;
    let parents = profile.parent_profile_ids.clone();
    loaded.insert(id.as_str().to_owned(), profile);
    for parent_id in &parents {
        load_with_ancestors(parent_id, catalog, loaded)?;
    }
    Ok(())
}

fn validate_state(profile: &StandardsProfile, audit_replay: bool) -> Result<(), DatumError> {
    match profile.state {
        LifecycleState::Approved => Ok(()),
        LifecycleState::Deprecated if audit_replay => Ok(()),
        _ => Err(DatumError::ProfileUnusable {
            profile_id: profile.profile_id.to_string(),
        }),
    }
}

fn validate_parenting(
    profile: &StandardsProfile,
    loaded: &BTreeMap<String, StandardsProfile>,
) -> Result<(), DatumError> {
    let required_parent_type = match profile.profile_type {
        ProfileType::Base => None,
        ProfileType::Domain => Some(ProfileType::Base),
        ProfileType::CustomerOverride => Some(ProfileType::Domain),
    };
    let Some(required) = required_parent_type else {
        return Ok(());
    };
    for parent_id in &profile.parent_profile_ids {
        let parent = loaded.get(parent_id.as_str()).ok_or_else(|| {
            DatumError::ProfileGraphInvalid {
                reason: format!("profile {parent_id} referenced but not loaded"),
            }
        })?;
        if parent.profile_type != required {
            return Err(DatumError::ProfileGraphInvalid {
                reason: format!(
                    "profile {} ({:?}) declares parent {} with incompatible type {:?}",
                    profile.profile_id, profile.profile_type, parent_id, parent.profile_type
                ),
            });
        }
    }
    Ok(())
}

fn detect_cycles(loaded: &BTreeMap<String, StandardsProfile>) -> Result<(), DatumError> {
    let mut state: BTreeMap<&str, u8> = BTreeMap::new(); // 0=unvisited 1=in-stack 2=done
    for id in loaded.keys() {
        visit(id, loaded, &mut state)?;
    }
    Ok(())
}

fn visit<'a>(
    id: &'a str,
    loaded: &'a BTreeMap<String, StandardsProfile>,
    state: &mut BTreeMap<&'a str, u8>,
) -> Result<(), DatumError> {
    match state.get(id) {
        Some(2) => return Ok(()),
        Some(1) => {
            return Err(DatumError::ProfileGraphInvalid {
                reason: format!("cycle detected at profile {id}"),
            });
        }
        _ => {}
    }
    state.insert(id, 1);
    if let Some(profile) = loaded.get(id) {
        for parent in &profile.parent_profile_ids {
            visit(parent.as_str(), loaded, state)?;
        }
    }
    state.insert(id, 2);
    Ok(())
}

/// Computes the set of packs a profile contributes, honoring
/// `override_mode`: `REPLACE` profiles do not inherit their parents' packs;
/// `STRICT`/`ADDITIVE` profiles do.
fn effective_packs(
    profile: &StandardsProfile,
    loaded: &BTreeMap<String, StandardsProfile>,
    visiting: &mut BTreeSet<String>,
) -> Vec<PackId> {
    let mut packs: BTreeSet<String> = profile
        .default_packs
        .iter()
        .map(|p| p.as_str().to_owned())
        .collect();

    if !matches!(profile.override_mode, OverrideMode::Replace)
        && visiting.insert(profile.profile_id.as_str().to_owned())
    {
        for parent_id in &profile.parent_profile_ids {
            if let Some(parent) = loaded.get(parent_id.as_str()) {
                for pack in effective_packs(parent, loaded, visiting) {
                    packs.insert(pack.as_str().to_owned());
                }
            }
        }
    }

    packs.into_iter().map(PackId::new).collect()
}

/// Returns the conflict policy declared by a profile, defaulting to
/// [`ConflictPolicy::Error`] when unspecified anywhere in the stack.
#[must_use]
pub fn governing_conflict_policy(profiles: &[ResolvedProfile], layer: Layer) -> ConflictPolicy {
    profiles
        .iter()
        .find(|p| p.layer == layer)
        .map(|p| p.profile.conflict_policy)
        .unwrap_or_default()
}
