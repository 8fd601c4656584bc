// manuplan-cli/src/commands/plan.rs
// ============================================================================
// Module: Plan Commands
// Description: generate, edit, submit, approve, reject, optimize, diff,
//              versions, and export subcommands over a DatumPlan.
// Purpose: Expose the plan generation and governance pipeline as local CLI
//          operations backed by the SQLite plan store.
// Dependencies: manuplan-plan, manuplan-compliance, manuplan-core
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use clap::Subcommand;
use clap::ValueEnum;
use manuplan_compliance::ExportFormat as CoreExportFormat;
use manuplan_core::PlanId;
use manuplan_core::ProfileId;
use manuplan_core::QuoteId;
use manuplan_core::UserId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::domain::Override;
use manuplan_core::domain::SOERun;
use manuplan_core::interfaces::PlanStore;
use manuplan_core::interfaces::ProfileStore;
use manuplan_plan::EditOp;
use manuplan_plan::Objective;
use manuplan_plan::Quote;
use serde::Deserialize;
use serde::Serialize;

use crate::support::CliError;
use crate::support::CliResult;
use crate::support::Workspace;
use crate::support::now_rfc3339;
use crate::support::read_json_file;
use crate::support::write_json_stdout;

/// Plan subcommands.
#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Generates plan version 1 from a quote and optional SOE run.
    Generate(GenerateArgs),
    /// Applies edits to the latest draft, producing a new version.
    Edit(EditArgs),
    /// Moves a plan from draft to submitted.
    Submit(PlanIdArgs),
    /// Moves a plan from submitted to approved.
    Approve(ApproveArgs),
    /// Moves a plan from submitted back to draft.
    Reject(PlanIdArgs),
    /// Reorders a draft's non-locked steps toward an objective.
    Optimize(OptimizeArgs),
    /// Computes the structured diff between two versions.
    Diff(DiffArgs),
    /// Lists all stored versions of a plan.
    Versions(PlanIdArgs),
    /// Exports an approved plan.
    Export(ExportArgs),
}

/// Runs a plan subcommand.
pub fn run(command: &PlanCommand, data_dir: &Path) -> CliResult<()> {
    match command {
        PlanCommand::Generate(args) => generate(args, data_dir),
        PlanCommand::Edit(args) => edit(args, data_dir),
        PlanCommand::Submit(args) => submit(args, data_dir),
        PlanCommand::Approve(args) => approve(args, data_dir),
        PlanCommand::Reject(args) => reject(args, data_dir),
        PlanCommand::Optimize(args) => optimize(args, data_dir),
        PlanCommand::Diff(args) => diff(args, data_dir),
        PlanCommand::Versions(args) => versions(args, data_dir),
        PlanCommand::Export(args) => export(args, data_dir),
    }
}

/// A bare plan id, shared by the commands that need nothing else.
#[derive(Args, Debug)]
pub struct PlanIdArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
}

/// Arguments for `manuplan plan generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Identifier to assign the new plan.
    #[arg(long)]
    plan_id: String,
    /// Identifier of the quote this plan is generated from.
    #[arg(long)]
    quote_id: String,
    /// Export tier carried onto the generated plan.
    #[arg(long)]
    tier: u8,
    /// Path to a previously-saved SOERun JSON file, if any.
    #[arg(long, value_name = "PATH")]
    soe_run_file: Option<PathBuf>,
}

fn generate(args: &GenerateArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let soe_run: Option<SOERun> = args.soe_run_file.as_deref().map(read_json_file).transpose()?;
    let quote = Quote { quote_id: QuoteId::new(args.quote_id.clone()), tier: args.tier };
    let plan = manuplan_plan::generate_plan(PlanId::new(args.plan_id.clone()), &quote, soe_run.as_ref());
    workspace.plan_store.create_version(&plan)?;
    write_json_stdout(&plan)
}

/// One requested edit, in the JSON shape accepted by `--ops-file`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum EditOpDto {
    /// See [`EditOp::RemoveStep`].
    RemoveStep {
        /// Step to remove.
        step_id: String,
    },
    /// See [`EditOp::ReorderSteps`].
    ReorderSteps {
        /// New step order.
        step_ids: Vec<String>,
    },
    /// See [`EditOp::SetStepParameters`].
    SetStepParameters {
        /// Step to modify.
        step_id: String,
        /// New parameter payload.
        parameters: Option<serde_json::Value>,
    },
    /// See [`EditOp::SetStepAcceptance`].
    SetStepAcceptance {
        /// Step to modify.
        step_id: String,
        /// New acceptance text.
        acceptance: Option<String>,
    },
}

impl From<EditOpDto> for EditOp {
    fn from(dto: EditOpDto) -> Self {
        match dto {
            EditOpDto::RemoveStep { step_id } => Self::RemoveStep(step_id.into()),
            EditOpDto::ReorderSteps { step_ids } => {
                Self::ReorderSteps(step_ids.into_iter().map(Into::into).collect())
            }
            EditOpDto::SetStepParameters { step_id, parameters } => {
                Self::SetStepParameters { step_id: step_id.into(), parameters }
            }
            EditOpDto::SetStepAcceptance { step_id, acceptance } => {
                Self::SetStepAcceptance { step_id: step_id.into(), acceptance }
            }
        }
    }
}

/// Arguments for `manuplan plan edit`.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Path to a JSON array of edit operations.
    #[arg(long, value_name = "PATH")]
    ops_file: PathBuf,
    /// Actor making the edit.
    #[arg(long)]
    edited_by: String,
    /// Non-empty reason for the edit.
    #[arg(long)]
    edit_reason: String,
    /// Path to a JSON array of overrides, if any SOE-locked content is
    /// touched.
    #[arg(long, value_name = "PATH")]
    overrides_file: Option<PathBuf>,
}

fn edit(args: &EditArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let dtos: Vec<EditOpDto> = read_json_file(&args.ops_file)?;
    let ops: Vec<EditOp> = dtos.into_iter().map(Into::into).collect();
    let overrides: Vec<Override> =
        args.overrides_file.as_deref().map(read_json_file).transpose()?.unwrap_or_default();

    let edited = manuplan_plan::edit(
        &plan,
        &ops,
        UserId::new(args.edited_by.clone()),
        now_rfc3339()?,
        args.edit_reason.clone(),
        overrides,
    )?;
    workspace.plan_store.create_version(&edited)?;
    write_json_stdout(&edited)
}

fn submit(args: &PlanIdArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let submitted = manuplan_plan::submit(&plan)?;
    workspace.plan_store.create_version(&submitted)?;
    write_json_stdout(&submitted)
}

/// Arguments for `manuplan plan approve`.
#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Actor approving the plan.
    #[arg(long)]
    approved_by: String,
}

fn approve(args: &ApproveArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let approved = manuplan_plan::approve(&plan, UserId::new(args.approved_by.clone()), now_rfc3339()?)?;
    workspace.plan_store.create_version(&approved)?;
    write_json_stdout(&approved)
}

fn reject(args: &PlanIdArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let rejected = manuplan_plan::reject(&plan)?;
    workspace.plan_store.create_version(&rejected)?;
    write_json_stdout(&rejected)
}

/// Scheduling objective accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ObjectiveArg {
    /// See [`Objective::Throughput`].
    Throughput,
    /// See [`Objective::Cost`].
    Cost,
    /// See [`Objective::Resource`].
    Resource,
}

impl From<ObjectiveArg> for Objective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::Throughput => Self::Throughput,
            ObjectiveArg::Cost => Self::Cost,
            ObjectiveArg::Resource => Self::Resource,
        }
    }
}

/// Arguments for `manuplan plan optimize`.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Scheduling objective to optimize toward.
    #[arg(long, value_enum, default_value_t = ObjectiveArg::Throughput)]
    objective: ObjectiveArg,
}

fn optimize(args: &OptimizeArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let optimized = manuplan_plan::optimize(&plan, args.objective.into())?;
    workspace.plan_store.create_version(&optimized)?;
    write_json_stdout(&optimized)
}

/// Arguments for `manuplan plan diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Earlier version number.
    #[arg(long)]
    a: u32,
    /// Later version number.
    #[arg(long)]
    b: u32,
}

/// JSON-serializable view of [`manuplan_plan::PlanDiff`].
#[derive(Serialize)]
struct PlanDiffView {
    /// Steps present only in the earlier version.
    removed: Vec<String>,
    /// Steps present only in the later version.
    added: Vec<String>,
    /// Steps present in both versions, with any change recorded.
    changed: Vec<StepDiffView>,
}

/// JSON-serializable view of [`manuplan_plan::StepDiff`].
#[derive(Serialize)]
struct StepDiffView {
    /// The step involved.
    step_id: String,
    /// Sequence number in the earlier version, if present there.
    before_sequence: Option<u32>,
    /// Sequence number in the later version, if present there.
    after_sequence: Option<u32>,
    /// Whether the step's parameters or acceptance text changed.
    content_changed: bool,
}

fn diff(args: &DiffArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan_id = PlanId::new(args.plan_id.clone());
    let before = load_version(&workspace, &plan_id, args.a)?;
    let after = load_version(&workspace, &plan_id, args.b)?;
    let plan_diff = manuplan_plan::diff(&before, &after);
    let view = PlanDiffView {
        removed: plan_diff.removed.iter().map(ToString::to_string).collect(),
        added: plan_diff.added.iter().map(ToString::to_string).collect(),
        changed: plan_diff
            .changed
            .into_iter()
            .map(|c| StepDiffView {
                step_id: c.step_id.to_string(),
                before_sequence: c.before_sequence,
                after_sequence: c.after_sequence,
                content_changed: c.content_changed,
            })
            .collect(),
    };
    write_json_stdout(&view)
}

fn versions(args: &PlanIdArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let versions = workspace.plan_store.list_versions(&PlanId::new(args.plan_id.clone()))?;
    write_json_stdout(&versions)
}

/// Export format accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ExportFormatArg {
    /// Plain step/test/evidence listing.
    Csv,
    /// Full plan content plus embedded provenance and a content hash.
    Json,
    /// Pick-and-place program data; tier-gated.
    PlacementCsv,
}

impl From<ExportFormatArg> for CoreExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::PlacementCsv => Self::PlacementCsv,
        }
    }
}

/// Arguments for `manuplan plan export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Target plan id.
    #[arg(long)]
    plan_id: String,
    /// Export format.
    #[arg(long, value_enum)]
    format: ExportFormatArg,
    /// Profile stack active when the plan's SOE run was evaluated, for
    /// embedding in a json export's provenance.
    #[arg(long, value_delimiter = ',')]
    profile_stack: Vec<String>,
}

/// JSON-serializable view of [`manuplan_compliance::ExportArtifact`].
#[derive(Serialize)]
struct ExportArtifactView {
    /// Format produced.
    format: &'static str,
    /// Serialized body.
    body: String,
    /// `SHA-256(canonical(content_without_hash))`, present only for `json`.
    content_hash: Option<String>,
}

fn export(args: &ExportArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let plan = load_latest(&workspace, &args.plan_id)?;
    let profile_stack: Vec<ProfileId> = args.profile_stack.iter().cloned().map(ProfileId::new).collect();
    let profile_state = |profile_id: &ProfileId| {
        workspace.profile_store.load_latest(profile_id).ok().flatten().map(|profile| profile.state)
    };
    let artifact =
        manuplan_compliance::export(&plan, &profile_stack, profile_state, args.format.into(), now_rfc3339()?)?;
    let format_label = match args.format {
        ExportFormatArg::Csv => "csv",
        ExportFormatArg::Json => "json",
        ExportFormatArg::PlacementCsv => "placement_csv",
    };
    write_json_stdout(&ExportArtifactView {
        format: format_label,
        body: artifact.body,
        content_hash: artifact.content_hash,
    })
}

fn load_latest(workspace: &Workspace, plan_id: &str) -> CliResult<DatumPlan> {
    workspace
        .plan_store
        .load_latest(&PlanId::new(plan_id.to_owned()))?
        .ok_or_else(|| CliError::new(format!("no plan found: {plan_id}")))
}

fn load_version(workspace: &Workspace, plan_id: &PlanId, version: u32) -> CliResult<DatumPlan> {
    workspace
        .plan_store
        .load_version(plan_id, version)?
        .ok_or_else(|| CliError::new(format!("no plan version found: {plan_id} v{version}")))
}
