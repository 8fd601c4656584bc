// manuplan-cli/src/commands/soe.rs
// ============================================================================
// Module: SOE Commands
// Description: `manuplan soe evaluate`.
// Purpose: Run the Standards Overlay Engine against a context file and print
//          (or save) the resulting SOERun.
// Dependencies: manuplan-soe, manuplan-core
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use clap::Subcommand;
use manuplan_core::BundleId;
use manuplan_core::IndustryId;
use manuplan_core::PackId;
use manuplan_core::ProfileId;
use manuplan_core::SoeRunId;
use manuplan_core::rule_expr::Context;
use manuplan_soe::SoeInput;
use manuplan_soe::ProfileSelection;

use crate::catalog::StoreBackedProfileCatalog;
use crate::support::CliResult;
use crate::support::Workspace;
use crate::support::read_json_file;
use crate::support::write_json_stdout;

/// SOE subcommands.
#[derive(Subcommand, Debug)]
pub enum SoeCommand {
    /// Runs the Standards Overlay Engine against a context file.
    Evaluate(SoeEvaluateArgs),
}

/// Runs a SOE subcommand.
pub fn run(command: &SoeCommand, data_dir: &Path) -> CliResult<()> {
    match command {
        SoeCommand::Evaluate(args) => evaluate(args, data_dir),
    }
}

/// Arguments for `manuplan soe evaluate`.
#[derive(Args, Debug)]
pub struct SoeEvaluateArgs {
    /// Industry context to evaluate under.
    #[arg(long)]
    industry: String,
    /// Declared hardware class, if any.
    #[arg(long)]
    hardware_class: Option<String>,
    /// Path to a JSON object giving the flat evaluation context.
    #[arg(long, value_name = "PATH")]
    context_file: PathBuf,
    /// Explicit, ordered profile ids to evaluate. Mutually exclusive with
    /// `--bundle`; omit both to fall back to industry defaults.
    #[arg(long, value_delimiter = ',')]
    profiles: Vec<String>,
    /// A named bundle to expand into the active profile stack.
    #[arg(long)]
    bundle: Option<String>,
    /// Extra packs included regardless of profile selection.
    #[arg(long, value_delimiter = ',')]
    additional_packs: Vec<String>,
    /// Tolerate a deprecated profile in the resolved stack.
    #[arg(long)]
    audit_replay: bool,
    /// Identifier to stamp on the produced run.
    #[arg(long)]
    soe_run_id: String,
}

/// Runs `manuplan soe evaluate`.
fn evaluate(args: &SoeEvaluateArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let context_fields: BTreeMap<String, serde_json::Value> = read_json_file(&args.context_file)?;
    let selection = resolve_selection(args);

    let input = SoeInput {
        soe_run_id: SoeRunId::new(args.soe_run_id.clone()),
        industry_profile: IndustryId::new(args.industry.clone()),
        hardware_class: args.hardware_class.clone(),
        context: Context::new(context_fields),
        selection,
        additional_packs: args.additional_packs.iter().cloned().map(PackId::new).collect(),
        audit_replay: args.audit_replay,
    };

    let profiles = StoreBackedProfileCatalog::new(&workspace.profile_store, &workspace.catalog);
    let run = manuplan_soe::evaluate(&input, &profiles, &workspace.catalog)?;
    write_json_stdout(&run)
}

fn resolve_selection(args: &SoeEvaluateArgs) -> ProfileSelection {
    if let Some(bundle) = &args.bundle {
        return ProfileSelection::Bundle(BundleId::new(bundle.clone()));
    }
    if !args.profiles.is_empty() {
        return ProfileSelection::ActiveProfiles(args.profiles.iter().cloned().map(ProfileId::new).collect());
    }
    ProfileSelection::Defaults
}
