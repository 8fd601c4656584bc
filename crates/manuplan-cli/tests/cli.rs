// crates/manuplan-cli/tests/cli.rs
// ============================================================================
// Module: CLI Binary Integration Tests
// Description: Drives the compiled `manuplan` binary end to end over a
//              temporary data directory: catalog setup, profile governance,
//              SOE evaluation, plan generation/approval, and export.
// Purpose: Exercise the argument-parsing and JSON-on-stdout contract that
//          `commands::*::run`'s own private-field arg structs can't be
//          driven against from outside the crate.
// ============================================================================

//! CLI binary integration tests.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use manuplan_core::IndustryId;
use manuplan_core::PackId;
use manuplan_core::ProfileId;
use manuplan_core::RuleId;
use manuplan_core::domain::Action;
use manuplan_core::domain::ConflictPolicy;
use manuplan_core::domain::Enforcement;
use manuplan_core::domain::IndustryProfile;
use manuplan_core::domain::LifecycleState;
use manuplan_core::domain::OverrideMode;
use manuplan_core::domain::ProfileType;
use manuplan_core::domain::Rule;
use manuplan_core::domain::RuleAction;
use manuplan_core::domain::Severity;
use manuplan_core::domain::StandardsPack;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::rule_expr::Op;
use manuplan_core::rule_expr::RuleExpr;

fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_manuplan"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(cli_binary())
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("spawns the manuplan binary")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is valid JSON")
}

fn write_json(path: &Path, value: &impl serde::Serialize) {
    std::fs::create_dir_all(path.parent().expect("has a parent")).expect("creates parent dirs");
    std::fs::write(path, serde_json::to_vec_pretty(value).expect("serializes")).expect("writes file");
}

fn seed_catalog(data_dir: &Path) {
    let pack = StandardsPack {
        pack_id: PackId::new("IPC_WHMA_A620"),
        industry: "defense".to_owned(),
        rules: vec![Rule {
            rule_id: RuleId::new("WHMA-A620-CRIMP"),
            summary: "require crimp pull test under harness build".to_owned(),
            citations: vec!["IPC/WHMA-A-620 §4".to_owned()],
            trigger: RuleExpr::Leaf {
                field: "processes".to_owned(),
                op: Op::Contains,
                value: Some(serde_json::json!("HARNESS_BUILD")),
            },
            actions: vec![RuleAction {
                action: Action::Require,
                object_type: "test".to_owned(),
                object_id: "CRIMP_PULL".to_owned(),
            }],
            enforcement: Some(Enforcement::BlockRelease),
            severity: Severity::Mandatory,
        }],
    };
    write_json(&data_dir.join("catalog/packs/IPC_WHMA_A620.json"), &pack);

    let industry = IndustryProfile {
        industry_id: IndustryId::new("defense"),
        default_packs: Vec::new(),
        risk_posture: "high".to_owned(),
        traceability_depth: "full".to_owned(),
        evidence_retention: "10y".to_owned(),
    };
    write_json(&data_dir.join("catalog/industries/defense.json"), &industry);
}

fn seed_draft_profile(data_dir: &Path) -> PathBuf {
    let profile = StandardsProfile {
        profile_id: ProfileId::new("base-defense"),
        profile_type: ProfileType::Base,
        parent_profile_ids: Vec::new(),
        default_packs: vec![PackId::new("IPC_WHMA_A620")],
        override_mode: OverrideMode::Additive,
        conflict_policy: ConflictPolicy::Error,
        state: LifecycleState::Draft,
        version: "1.0.0".to_owned(),
        parent_version: None,
    };
    let path = data_dir.join("base-defense.json");
    write_json(&path, &profile);
    path
}

#[test]
fn full_pipeline_from_catalog_setup_through_approved_export() {
    let dir = tempfile::tempdir().expect("tempdir").into_path();
    let data_dir = dir.as_path();
    eprintln!("DEBUG data_dir = {}", data_dir.display());
    seed_catalog(data_dir);
    let profile_file = seed_draft_profile(data_dir);

    let created = stdout_json(&run(
        data_dir,
        &["profile", "create", "--profile-file", &profile_file.to_string_lossy()],
    ));
    assert_eq!(created["state"], "draft");

    stdout_json(&run(data_dir, &["profile", "submit", "--profile-id", "base-defense"]));
    let approved_profile =
        stdout_json(&run(data_dir, &["profile", "approve", "--profile-id", "base-defense"]));
    assert_eq!(approved_profile["state"], "approved");

    let context_file = data_dir.join("context.json");
    write_json(
        &context_file,
        &serde_json::json!({ "processes": ["HARNESS_BUILD"] }),
    );
    let run_output = run(
        data_dir,
        &[
            "soe",
            "evaluate",
            "--industry",
            "defense",
            "--context-file",
            &context_file.to_string_lossy(),
            "--profiles",
            "base-defense",
            "--soe-run-id",
            "run-1",
        ],
    );
    let soe_run = stdout_json(&run_output);
    assert_eq!(soe_run["decisions"].as_array().expect("decisions array").len(), 1);
    let soe_run_file = data_dir.join("soe_run.json");
    write_json(&soe_run_file, &soe_run);

    let plan = stdout_json(&run(
        data_dir,
        &[
            "plan",
            "generate",
            "--plan-id",
            "plan-1",
            "--quote-id",
            "quote-1",
            "--tier",
            "3",
            "--soe-run-file",
            &soe_run_file.to_string_lossy(),
        ],
    ));
    assert_eq!(plan["version"], 1);
    assert_eq!(plan["tests"].as_array().expect("tests array").len(), 1);

    stdout_json(&run(data_dir, &["plan", "submit", "--plan-id", "plan-1"]));
    let approved_plan = stdout_json(&run(
        data_dir,
        &["plan", "approve", "--plan-id", "plan-1", "--approved-by", "qa-1"],
    ));
    assert_eq!(approved_plan["state"], "approved");

    let export = stdout_json(&run(
        data_dir,
        &[
            "plan",
            "export",
            "--plan-id",
            "plan-1",
            "--format",
            "json",
            "--profile-stack",
            "base-defense",
        ],
    ));
    assert_eq!(export["format"], "json");
    assert!(export["content_hash"].is_string());
}

#[test]
fn exporting_a_draft_plan_fails_with_a_nonzero_exit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();
    seed_catalog(data_dir);

    stdout_json(&run(
        data_dir,
        &[
            "plan",
            "generate",
            "--plan-id",
            "plan-draft",
            "--quote-id",
            "quote-1",
            "--tier",
            "1",
        ],
    ));
    let output = run(
        data_dir,
        &["plan", "export", "--plan-id", "plan-draft", "--format", "csv"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("requires an approved plan"));
}
