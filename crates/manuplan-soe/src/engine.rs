// manuplan-soe/src/engine.rs
// ============================================================================
// Module: SOE Evaluation
// Description: Rule firing, decision tagging, conflict resolution, and
//              derived-artifact collection for one SOE run.
// Purpose: Implement steps 4-8 of the SOE algorithm on top of the resolved,
//          validated profile stack from `resolve`.
// Dependencies: manuplan-core, serde_json
// ============================================================================

use std::collections::BTreeMap;

use manuplan_core::DatumError;
use manuplan_core::HashAlgorithm;
use manuplan_core::IndustryId;
use manuplan_core::PackCatalog;
use manuplan_core::PackId;
use manuplan_core::ProfileCatalog;
use manuplan_core::SoeRunId;
use manuplan_core::domain::Action;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::CostModifier;
use manuplan_core::domain::Decision;
use manuplan_core::domain::Enforcement;
use manuplan_core::domain::Gate;
use manuplan_core::domain::GateStatus;
use manuplan_core::domain::ProfileSource;
use manuplan_core::domain::ProfileStackEntry;
use manuplan_core::domain::RequiredEvidence;
use manuplan_core::domain::SOERun;
use manuplan_core::domain::Why;
use manuplan_core::hashing;
use manuplan_core::rule_expr::Context;
use manuplan_core::rule_expr::eval;

use crate::resolve::ProfileSelection;
use crate::resolve::ResolvedProfile;
use crate::resolve::resolve_profile_stack;

/// Everything the Standards Overlay Engine needs to produce one [`SOERun`].
#[derive(Debug, Clone)]
pub struct SoeInput {
    /// Identifier to stamp on the produced run.
    pub soe_run_id: SoeRunId,
    /// Industry this run is evaluated under.
    pub industry_profile: IndustryId,
    /// Declared hardware class, if any.
    pub hardware_class: Option<String>,
    /// Flat evaluation context: `processes[]`, `tests_requested[]`,
    /// `materials[]`, `bom_risk_flags[]`, and any other fields rules trigger
    /// on.
    pub context: Context,
    /// How the active profile stack was selected.
    pub selection: ProfileSelection,
    /// Extra packs to include regardless of profile selection.
    pub additional_packs: Vec<PackId>,
    /// Whether to tolerate a `deprecated` profile in the stack.
    pub audit_replay: bool,
}

/// Evaluates one Standards Overlay Engine run.
///
/// Pure: given identical `input` and catalog contents, produces
/// byte-identical canonical JSON on every call, on every host.
///
/// # Errors
///
/// Returns [`DatumError::ProfileGraphInvalid`], [`DatumError::ProfileUnusable`],
/// [`DatumError::PackNotFound`], or [`DatumError::RuleConflict`] per the
/// failure modes in the standards overlay algorithm.
pub fn evaluate(
    input: &SoeInput,
    profiles: &dyn ProfileCatalog,
    packs: &dyn PackCatalog,
) -> Result<SOERun, DatumError> {
    let resolved = resolve_profile_stack(&input.selection, input.audit_replay, profiles)?;
    let audit_replay_used = resolved
        .iter()
        .any(|p| matches!(p.profile.state, manuplan_core::domain::LifecycleState::Deprecated));

    let industry = profiles
        .get_industry(&input.industry_profile)
        .map_err(|err| DatumError::ProfileGraphInvalid {
            reason: format!("industry {} could not be resolved: {err}", input.industry_profile),
        })?;

    let active_packs = resolve_active_packs(&resolved, &industry.default_packs, &input.additional_packs);

    let mut decisions: Vec<Decision> = Vec::new();
    let mut seen_ids: BTreeMap<String, usize> = BTreeMap::new();

    for pack_id in &active_packs {
        let pack = packs
            .get_pack(pack_id)
            .map_err(|_| DatumError::PackNotFound {
                pack_id: pack_id.to_string(),
            })?;
        for rule in &pack.rules {
            if !eval(&rule.trigger, &input.context) {
                continue;
            }
            for rule_action in &rule.actions {
                let decision_id = compute_decision_id(
                    rule.rule_id.as_str(),
                    pack_id.as_str(),
                    action_tag(&rule_action.action),
                    &rule_action.object_type,
                    &rule_action.object_id,
                );
                if seen_ids.contains_key(decision_id.as_str()) {
                    continue;
                }
                let why = Why {
                    rule_id: rule.rule_id.clone(),
                    pack_id: pack_id.clone(),
                    citations: rule.citations.clone(),
                    summary: render_why(
                        &input.industry_profile,
                        input.hardware_class.as_deref(),
                        &rule.summary,
                        &rule.citations,
                    ),
                };
                let profile_source = tag_profile_source(&resolved, pack_id);
                let decision = Decision {
                    id: decision_id.clone(),
                    action: rule_action.action.clone(),
                    object_type: rule_action.object_type.clone(),
                    object_id: rule_action.object_id.clone(),
                    enforcement: rule.enforcement,
                    why,
                    profile_source,
                };
                seen_ids.insert(decision_id.into_string(), decisions.len());
                decisions.push(decision);
            }
        }
    }

    let decisions = resolve_conflicts(decisions, &resolved)?;

    let required_evidence = collect_required_evidence(&decisions);
    let cost_modifiers = collect_cost_modifiers(&decisions);
    let gates = collect_gates(&decisions);

    let profile_stack = resolved
        .iter()
        .map(|p| ProfileStackEntry {
            profile_id: p.profile.profile_id.clone(),
            profile_type: p.profile.profile_type,
            layer: p.layer,
            parent_profile_ids: p.profile.parent_profile_ids.clone(),
        })
        .collect();

    Ok(SOERun {
        soe_run_id: input.soe_run_id.clone(),
        industry_profile: input.industry_profile.clone(),
        hardware_class: input.hardware_class.clone(),
        active_packs,
        profile_stack,
        decisions,
        gates,
        required_evidence,
        cost_modifiers,
        audit_replay: audit_replay_used,
    })
}

fn resolve_active_packs(
    resolved: &[ResolvedProfile],
    industry_defaults: &[PackId],
    additional: &[PackId],
) -> Vec<PackId> {
    let mut set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for profile in resolved {
        for pack in &profile.effective_packs {
            set.insert(pack.as_str().to_owned());
        }
    }
    for pack in industry_defaults {
        set.insert(pack.as_str().to_owned());
    }
    for pack in additional {
        set.insert(pack.as_str().to_owned());
    }
    set.into_iter().map(PackId::new).collect()
}

fn compute_decision_id(
    rule_id: &str,
    pack_id: &str,
    action: &str,
    object_type: &str,
    object_id: &str,
) -> manuplan_core::DecisionId {
    let payload = serde_json::json!({
        "rule_id": rule_id,
        "pack_id": pack_id,
        "action": action,
        "object_type": object_type,
        "object_id": object_id,
    });
    // Canonicalization of a plain JSON object of strings cannot fail.
    let full_hex = hashing::hash_canonical_json(HashAlgorithm::Sha256, &payload)
        .unwrap_or_default();
    manuplan_core::DecisionId::new(hashing::truncate_hex(&full_hex, hashing::DECISION_ID_HEX_LEN))
}

/// Returns the `SCREAMING_SNAKE_CASE` tag of an [`Action`] variant, matching
/// its `#[serde(tag = "action")]` wire representation.
fn action_tag(action: &Action) -> &'static str {
    match action {
        Action::Require => "REQUIRE",
        Action::Optional => "OPTIONAL",
        Action::Prohibit => "PROHIBIT",
        Action::InsertStep { .. } => "INSERT_STEP",
        Action::Escalate => "ESCALATE",
        Action::SetRetention { .. } => "SET_RETENTION",
        Action::AddCostModifier { .. } => "ADD_COST_MODIFIER",
        Action::AddGate => "ADD_GATE",
    }
}

fn render_why(
    industry: &IndustryId,
    hardware_class: Option<&str>,
    summary: &str,
    citations: &[String],
) -> String {
    let hw = hardware_class.unwrap_or("n/a");
    let cites = citations.join(", ");
    format!("{industry} / {hw}: {summary} ({cites})")
}

fn tag_profile_source(resolved: &[ResolvedProfile], pack_id: &PackId) -> Option<ProfileSource> {
    resolved
        .iter()
        .filter(|p| p.effective_packs.iter().any(|pack| pack == pack_id))
        .max_by(|a, b| {
            a.layer
                .cmp(&b.layer)
                .then_with(|| b.profile.profile_id.as_str().cmp(a.profile.profile_id.as_str()))
        })
        .map(|p| ProfileSource {
            profile_id: p.profile.profile_id.clone(),
            profile_type: p.profile.profile_type,
            layer: p.layer,
        })
}

fn is_contradictory(a: &Action, b: &Action) -> bool {
    matches!(
        (a, b),
        (Action::Require, Action::Prohibit) | (Action::Prohibit, Action::Require)
    )
}

fn resolve_conflicts(
    decisions: Vec<Decision>,
    resolved: &[ResolvedProfile],
) -> Result<Vec<Decision>, DatumError> {
    let mut by_object: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (idx, decision) in decisions.iter().enumerate() {
        by_object
            .entry((decision.object_type.clone(), decision.object_id.clone()))
            .or_default()
            .push(idx);
    }

    let mut excluded = std::collections::BTreeSet::new();
    for indices in by_object.values() {
        if indices.len() < 2 {
            continue;
        }
        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                let (a_idx, b_idx) = (indices[i], indices[j]);
                let a = &decisions[a_idx];
                let b = &decisions[b_idx];
                if !is_contradictory(&a.action, &b.action) {
                    continue;
                }
                let policy = governing_policy(a, b, resolved);
                match policy {
                    ConflictPolicy::Error => {
                        return Err(DatumError::RuleConflict {
                            first: a.id.to_string(),
                            second: b.id.to_string(),
                        });
                    }
                    ConflictPolicy::ParentWins => {
                        let loser = higher_layer(a, b, a_idx, b_idx);
                        excluded.insert(loser);
                    }
                    ConflictPolicy::ChildWins => {
                        let loser = lower_layer(a, b, a_idx, b_idx);
                        excluded.insert(loser);
                    }
                }
            }
        }
    }

    Ok(decisions
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !excluded.contains(idx))
        .map(|(_, decision)| decision)
        .collect())
}

/// The higher-layer decision's profile governs the resolution, matching
/// the same highest-layer-wins tie-break [`tag_profile_source`] already
/// applies: `CHILD_WINS`/`PARENT_WINS` are meaningless without first
/// picking one side's declared policy, and the higher layer is the one
/// doing the overriding.
fn governing_policy(a: &Decision, b: &Decision, resolved: &[ResolvedProfile]) -> ConflictPolicy {
    let layer = |d: &Decision| d.profile_source.as_ref().map(|s| s.layer);
    match (layer(a), layer(b)) {
        (Some(a_layer), Some(b_layer)) => {
            crate::resolve::governing_conflict_policy(resolved, a_layer.max(b_layer))
        }
        _ => ConflictPolicy::Error,
    }
}

fn higher_layer(a: &Decision, b: &Decision, a_idx: usize, b_idx: usize) -> usize {
    let layer = |d: &Decision| d.profile_source.as_ref().map(|s| s.layer);
    if layer(a) >= layer(b) { a_idx } else { b_idx }
}

fn lower_layer(a: &Decision, b: &Decision, a_idx: usize, b_idx: usize) -> usize {
    let layer = |d: &Decision| d.profile_source.as_ref().map(|s| s.layer);
    if layer(a) <= layer(b) { a_idx } else { b_idx }
}

fn collect_required_evidence(decisions: &[Decision]) -> Vec<RequiredEvidence> {
    decisions
        .iter()
        .filter(|d| d.object_type == "evidence" && matches!(d.action, Action::Require))
        .map(|d| {
            let retention = decisions.iter().find_map(|other| {
                if other.object_id == d.object_id {
                    if let Action::SetRetention { period } = &other.action {
                        return Some(period.clone());
                    }
                }
                None
            });
            RequiredEvidence {
                decision_id: d.id.clone(),
                object_id: d.object_id.clone(),
                retention,
            }
        })
        .collect()
}

fn collect_cost_modifiers(decisions: &[Decision]) -> Vec<CostModifier> {
    decisions
        .iter()
        .filter_map(|d| match &d.action {
            Action::AddCostModifier { amount, unit } => Some(CostModifier {
                decision_id: d.id.clone(),
                amount: amount.clone(),
                unit: unit.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn collect_gates(decisions: &[Decision]) -> Vec<Gate> {
    let blocking: Vec<_> = decisions
        .iter()
        .filter(|d| matches!(d.enforcement, Some(Enforcement::BlockRelease)))
        .map(|d| d.id.clone())
        .collect();
    let any_advisory = decisions
        .iter()
        .any(|d| matches!(d.enforcement, Some(Enforcement::Advisory)));

    decisions
        .iter()
        .filter(|d| matches!(d.action, Action::AddGate))
        .map(|d| {
            let status = if !blocking.is_empty() {
                GateStatus::Blocked
            } else if any_advisory {
                GateStatus::Warning
            } else {
                GateStatus::Open
            };
            Gate {
                gate_id: manuplan_core::GateId::new(d.object_id.clone()),
                status,
                blocked_by: blocking.clone(),
            }
        })
        .collect()
}
