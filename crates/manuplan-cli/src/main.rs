// manuplan-cli/src/main.rs
// ============================================================================
// Module: CLI Entry Point
// Description: Top-level argument parsing and dispatch for the manuplan
//              binary.
// Purpose: Translate the external HTTP-shaped decision-of-record surface
//          into local, synchronous subcommands over a file-backed
//          workspace.
// Dependencies: clap, manuplan_cli
// ============================================================================

//! ## Overview
//! Every subcommand opens its own [`manuplan_cli::support::Workspace`]
//! against `--data-dir` and exits; there is no resident server process. This
//! mirrors the underlying `manuplan-*` crates' own synchronous, pure-function
//! design rather than introducing an async runtime this tool has no use for.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use manuplan_cli::commands;
use manuplan_cli::commands::compliance::ComplianceCommand;
use manuplan_cli::commands::plan::PlanCommand;
use manuplan_cli::commands::profile::ProfileCommand;
use manuplan_cli::commands::soe::SoeCommand;
use manuplan_cli::support::CliResult;
use manuplan_cli::support::default_data_dir;
use manuplan_cli::support::write_stderr_line;

/// Decision-of-record engine, operated as a local command-line tool.
#[derive(Parser, Debug)]
#[command(name = "manuplan", version, about)]
struct Cli {
    /// Root directory holding the SQLite store, audit log, and static
    /// catalog. Created on first use. Defaults to `./manuplan-data`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Standards Overlay Engine evaluation.
    Soe {
        /// SOE subcommand.
        #[command(subcommand)]
        command: SoeCommand,
    },
    /// Plan generation, editing, and governance.
    Plan {
        /// Plan subcommand.
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Profile governance and bundle catalog maintenance.
    Profile {
        /// Profile subcommand.
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Compliance reporting and audit-integrity checking.
    Compliance {
        /// Compliance subcommand.
        #[command(subcommand)]
        command: ComplianceCommand,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> CliResult<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    match &cli.command {
        Commands::Soe { command } => commands::soe::run(command, &data_dir),
        Commands::Plan { command } => commands::plan::run(command, &data_dir),
        Commands::Profile { command } => commands::profile::run(command, &data_dir),
        Commands::Compliance { command } => commands::compliance::run(command, &data_dir),
    }
}
