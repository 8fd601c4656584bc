// manuplan-cli/src/commands/profile.rs
// ============================================================================
// Module: Profile Commands
// Description: submit, approve, reject, revise, deprecate, fork, versions,
//              and bundle creation for StandardsProfiles.
// Purpose: Expose profile governance and bundle catalog maintenance as
//          local CLI operations backed by the SQLite profile store.
// Dependencies: manuplan-profiles, manuplan-core
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use clap::Subcommand;
use clap::ValueEnum;
use manuplan_core::BundleId;
use manuplan_core::ProfileId;
use manuplan_core::domain::ProfileBundle;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::interfaces::ProfileStore;
use manuplan_profiles::VersionBump;

use crate::support::CliError;
use crate::support::CliResult;
use crate::support::Workspace;
use crate::support::read_json_file;
use crate::support::write_json_stdout;

/// Profile subcommands.
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Registers a new draft profile, version 1.0.0.
    Create(CreateArgs),
    /// Moves a profile from draft to submitted.
    Submit(ProfileIdArgs),
    /// Moves a profile from submitted to approved.
    Approve(ProfileIdArgs),
    /// Moves a profile from submitted back to draft.
    Reject(ProfileIdArgs),
    /// Returns a rejected profile to draft on the same version.
    Revise(ProfileIdArgs),
    /// Retires an approved profile.
    Deprecate(ProfileIdArgs),
    /// Forks an approved profile into a new draft version.
    Fork(ForkArgs),
    /// Lists all stored versions of a profile.
    Versions(ProfileIdArgs),
    /// Writes a named bundle to the static catalog.
    CreateBundle(CreateBundleArgs),
}

/// Runs a profile subcommand.
pub fn run(command: &ProfileCommand, data_dir: &Path) -> CliResult<()> {
    match command {
        ProfileCommand::Create(args) => create(args, data_dir),
        ProfileCommand::Submit(args) => apply(args, data_dir, manuplan_profiles::submit),
        ProfileCommand::Approve(args) => apply(args, data_dir, manuplan_profiles::approve),
        ProfileCommand::Reject(args) => apply(args, data_dir, manuplan_profiles::reject),
        ProfileCommand::Revise(args) => apply(args, data_dir, manuplan_profiles::revise),
        ProfileCommand::Deprecate(args) => apply(args, data_dir, manuplan_profiles::deprecate),
        ProfileCommand::Fork(args) => fork(args, data_dir),
        ProfileCommand::Versions(args) => versions(args, data_dir),
        ProfileCommand::CreateBundle(args) => create_bundle(args, data_dir),
    }
}

/// A bare profile id, shared by the commands that need nothing else.
#[derive(Args, Debug)]
pub struct ProfileIdArgs {
    /// Target profile id.
    #[arg(long)]
    profile_id: String,
}

/// Arguments for `manuplan profile create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path to a JSON `StandardsProfile` body. `state` and `version` are
    /// overwritten with `draft` and `1.0.0` regardless of what the file
    /// contains.
    #[arg(long, value_name = "PATH")]
    profile_file: PathBuf,
}

fn create(args: &CreateArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let mut profile: StandardsProfile = read_json_file(&args.profile_file)?;
    profile.state = manuplan_core::domain::LifecycleState::Draft;
    profile.version = "1.0.0".to_owned();
    profile.parent_version = None;
    workspace.profile_store.create_version(&profile)?;
    write_json_stdout(&profile)
}

fn apply(
    args: &ProfileIdArgs,
    data_dir: &Path,
    transition: impl Fn(&StandardsProfile) -> Result<StandardsProfile, manuplan_core::DatumError>,
) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let profile = load_latest(&workspace, &args.profile_id)?;
    let next = transition(&profile)?;
    workspace.profile_store.create_version(&next)?;
    write_json_stdout(&next)
}

/// Which segment of a profile's semantic version to bump on fork.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum VersionBumpArg {
    /// See [`VersionBump::Major`].
    Major,
    /// See [`VersionBump::Minor`].
    Minor,
    /// See [`VersionBump::Patch`].
    Patch,
}

impl From<VersionBumpArg> for VersionBump {
    fn from(arg: VersionBumpArg) -> Self {
        match arg {
            VersionBumpArg::Major => Self::Major,
            VersionBumpArg::Minor => Self::Minor,
            VersionBumpArg::Patch => Self::Patch,
        }
    }
}

/// Arguments for `manuplan profile fork`.
#[derive(Args, Debug)]
pub struct ForkArgs {
    /// Target profile id, which must be at its latest approved version.
    #[arg(long)]
    profile_id: String,
    /// Version segment to bump.
    #[arg(long, value_enum, default_value_t = VersionBumpArg::Minor)]
    bump: VersionBumpArg,
}

fn fork(args: &ForkArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let profile = load_latest(&workspace, &args.profile_id)?;
    let forked = manuplan_profiles::fork(&profile, args.bump.into())?;
    workspace.profile_store.create_version(&forked)?;
    write_json_stdout(&forked)
}

fn versions(args: &ProfileIdArgs, data_dir: &Path) -> CliResult<()> {
    let workspace = Workspace::open(data_dir)?;
    let versions = workspace.profile_store.list_versions(&ProfileId::new(args.profile_id.clone()))?;
    write_json_stdout(&versions)
}

/// Arguments for `manuplan profile create-bundle`.
///
/// Bundles are not governed or versioned entities; a bundle is written
/// once to `data_dir/catalog/bundles/<bundle_id>.json` and read back by
/// the Standards Overlay Engine through the static catalog.
#[derive(Args, Debug)]
pub struct CreateBundleArgs {
    /// Identifier of the bundle.
    #[arg(long)]
    bundle_id: String,
    /// Profile ids the bundle resolves to, in declaration order.
    #[arg(long, value_delimiter = ',')]
    profiles: Vec<String>,
    /// Optional associated program.
    #[arg(long)]
    program_id: Option<String>,
    /// Optional associated customer.
    #[arg(long)]
    customer_id: Option<String>,
    /// Optional associated contract.
    #[arg(long)]
    contract_id: Option<String>,
}

fn create_bundle(args: &CreateBundleArgs, data_dir: &Path) -> CliResult<()> {
    if args.profiles.is_empty() {
        return Err(CliError::new("a bundle must resolve to at least one profile id"));
    }
    let bundle = ProfileBundle {
        bundle_id: BundleId::new(args.bundle_id.clone()),
        profile_ids: args.profiles.iter().cloned().map(ProfileId::new).collect(),
        program_id: args.program_id.clone(),
        customer_id: args.customer_id.clone(),
        contract_id: args.contract_id.clone(),
    };
    let bundles_dir = data_dir.join("catalog").join("bundles");
    std::fs::create_dir_all(&bundles_dir)?;
    let path = bundles_dir.join(format!("{}.json", args.bundle_id));
    let body = serde_json::to_vec_pretty(&bundle)?;
    std::fs::write(&path, body)?;
    write_json_stdout(&bundle)
}

fn load_latest(workspace: &Workspace, profile_id: &str) -> CliResult<StandardsProfile> {
    workspace
        .profile_store
        .load_latest(&ProfileId::new(profile_id.to_owned()))?
        .ok_or_else(|| CliError::new(format!("no profile found: {profile_id}")))
}
