// manuplan-cli/src/commands/compliance.rs
// ============================================================================
// Module: Compliance Commands
// Description: report generation and audit-integrity checking over an
//              approved plan and its recorded Standards Overlay Engine run.
// Purpose: Expose the compliance traceability and audit-integrity pipeline
//          as local CLI operations.
// Dependencies: manuplan-compliance, manuplan-core, manuplan-store
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use clap::Subcommand;
use manuplan_core::PlanId;
use manuplan_core::ProfileId;
use manuplan_core::UserId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::SOERun;
use manuplan_core::interfaces::PlanStore;
use manuplan_core::interfaces::ProfileStore;

use crate::support::CliError;
use crate::support::CliResult;
use crate::support::Workspace;
use crate::support::now_rfc3339;
use crate::support::read_json_file;
use crate::support::write_json_stdout;

/// Compliance subcommands.
#[derive(Subcommand, Debug)]
pub enum ComplianceCommand {
    /// Renders the nine-section compliance report for an approved plan.
    Report(ReportArgs),
    /// Checks an approved plan's cross-references against its SOE run and
    /// profile states.
    AuditIntegrity(AuditIntegrityArgs),
}

/// Runs a compliance subcommand.
pub fn run(command: &ComplianceCommand, data_dir: &Path) -> CliResult<()> {
    match command {
        ComplianceCommand::Report(args) => report(args, data_dir),
        ComplianceCommand::AuditIntegrity(args) => audit_integrity(args, data_dir),
    }
}

/// Arguments shared by both compliance commands: a plan id and the SOE run
/// it was evaluated against.
///
/// [`manuplan_core::domain::SOERun`] is not itself a versioned store entity
/// (only plans and profiles are), so its caller must supply it from the
/// file saved alongside the plan generation step.
#[derive(Args, Debug)]
pub struct PlanAndRunArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Path to the `SOERun` JSON this plan was generated or last checked
    /// against.
    #[arg(long, value_name = "PATH")]
    soe_run_file: PathBuf,
}

/// Arguments for `manuplan compliance report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Shared plan/run lookup arguments.
    #[command(flatten)]
    common: PlanAndRunArgs,
    /// Report rendering format. Only `html` is currently supported.
    #[arg(long, default_value = "html")]
    format: String,
    /// Actor generating the report.
    #[arg(long)]
    generated_by: String,
}

fn report(args: &ReportArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.common.plan_id)?;
    let soe_run: SOERun = read_json_file(&args.common.soe_run_file)?;
    let rendered = manuplan_compliance::render_report(
        &plan,
        &soe_run,
        &args.format,
        UserId::new(args.generated_by.clone()),
        now_rfc3339()?,
    )?;
    write_json_stdout(&rendered)
}

/// Arguments for `manuplan compliance audit-integrity`.
#[derive(Args, Debug)]
pub struct AuditIntegrityArgs {
    /// Shared plan/run lookup arguments.
    #[command(flatten)]
    common: PlanAndRunArgs,
}

fn audit_integrity(args: &AuditIntegrityArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.common.plan_id)?;
    let soe_run: SOERun = read_json_file(&args.common.soe_run_file)?;
    let profile_state = |profile_id: &ProfileId| {
        workspace
            .profile_store
            .load_latest(profile_id)
            .ok()
            .flatten()
            .map(|profile| profile.state)
    };
    let outcome = manuplan_compliance::check_audit_integrity(&plan, &soe_run, profile_state)?;
    write_json_stdout(&outcome.findings)
}

fn load_latest(workspace: &Workspace, plan_id: &str) -> CliResult<DatumPlan> {
    workspace
        .plan_store
        .load_latest(&PlanId::new(plan_id.to_owned()))?
        .ok_or_else(|| CliError::new(format!("no plan found: {plan_id}")))
}
