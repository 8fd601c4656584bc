// crates/manuplan-system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: Scenario Fixtures
// Description: Shared profile/pack/context builders for the cross-crate
//              end-to-end scenarios.
// Purpose: Keep each scenario test focused on the behavior under test
//          rather than catalog bookkeeping.
// ============================================================================

use manuplan_core::PackId;
use manuplan_core::ProfileId;
use manuplan_core::RuleId;
use manuplan_core::domain::Action;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::Enforcement;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::OverrideMode;
use manuplan_core::domain::ProfileType;
use manuplan_core::domain::Rule;
use manuplan_core::domain::RuleAction;
use manuplan_core::domain::Severity;
use manuplan_core::domain::StandardsPack;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::rule_expr::Context;
use manuplan_core::rule_expr::Op;
use manuplan_core::rule_expr::RuleExpr;

/// Builds a leaf trigger comparing `field` to `value` with `op`.
pub fn leaf(field: &str, op: Op, value: serde_json::Value) -> RuleExpr {
    RuleExpr::Leaf {
        field: field.to_owned(),
        op,
        value: Some(value),
    }
}

/// Builds an `approved`, `BASE`-layer profile contributing `packs`.
pub fn base_profile(id: &str, packs: &[&str]) -> StandardsProfile {
    StandardsProfile {
        profile_id: ProfileId::new(id),
        profile_type: ProfileType::Base,
        parent_profile_ids: Vec::new(),
        default_packs: packs.iter().map(|p| PackId::new(*p)).collect(),
        override_mode: OverrideMode::Additive,
        conflict_policy: ConflictPolicy::Error,
        state: LifecycleState::Approved,
        version: "1.0.0".to_owned(),
        parent_version: None,
    }
}

/// Builds an `approved` profile at an arbitrary layer/conflict policy with
/// an explicit parent.
pub fn layered_profile(
    id: &str,
    profile_type: ProfileType,
    parent: &str,
    packs: &[&str],
    conflict_policy: ConflictPolicy,
) -> StandardsProfile {
    StandardsProfile {
        profile_id: ProfileId::new(id),
        profile_type,
        parent_profile_ids: vec![ProfileId::new(parent)],
        default_packs: packs.iter().map(|p| PackId::new(*p)).collect(),
        override_mode: OverrideMode::Additive,
        conflict_policy,
        state: LifecycleState::Approved,
        version: "1.0.0".to_owned(),
        parent_version: None,
    }
}

/// Builds a single-rule pack whose trigger is `trigger` and whose actions
/// are `actions`.
pub fn pack(id: &str, industry: &str, rule_id: &str, trigger: RuleExpr, actions: Vec<RuleAction>) -> StandardsPack {
    StandardsPack {
        pack_id: PackId::new(id),
        industry: industry.to_owned(),
        rules: vec![Rule {
            rule_id: RuleId::new(rule_id),
            summary: format!("rule {rule_id}"),
            citations: vec![format!("{id}-4.1")],
            trigger,
            actions,
            enforcement: Some(Enforcement::BlockRelease),
            severity: Severity::Mandatory,
        }],
    }
}

/// A pack whose single rule fires unconditionally (an empty `all`) and
/// emits one `Require`/`Prohibit` decision on the given object, so two
/// packs can be made to contradict on purpose.
pub fn unconditional_pack(id: &str, object_type: &str, object_id: &str, action: Action) -> StandardsPack {
    pack(
        id,
        "space",
        &format!("{id}-RULE"),
        RuleExpr::All { all: Vec::new() },
        vec![RuleAction {
            action,
            object_type: object_type.to_owned(),
            object_id: object_id.to_owned(),
        }],
    )
}

/// A flat evaluation context seeded with the given processes and hardware
/// class.
pub fn context(processes: &[&str], hardware_class: Option<&str>) -> Context {
    let mut ctx = Context::empty().with(
        "processes",
        serde_json::Value::Array(processes.iter().map(|p| serde_json::Value::String((*p).to_owned())).collect()),
    );
    if let Some(class) = hardware_class {
        ctx = ctx.with("hardware_class", serde_json::Value::String(class.to_owned()));
    }
    ctx
}
