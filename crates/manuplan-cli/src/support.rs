// manuplan-cli/src/support.rs
// ============================================================================
// Module: CLI Support
// Description: Shared error type, output helpers, and store/catalog setup
//              used by every subcommand.
// Purpose: Keep the per-command modules focused on their own domain logic.
// Dependencies: manuplan-core, manuplan-store, serde_json, time
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use manuplan_store::SqlitePlanStore;
use manuplan_store::SqliteProfileStore;
use manuplan_store::SqliteStoreConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::audit::FileAuditLog;
use crate::catalog::FileCatalog;

/// A uniform CLI-level failure, always carrying a human-readable message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    message: String,
}

impl CliError {
    /// Wraps any displayable failure as a [`CliError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for CliError {
                fn from(err: $ty) -> Self {
                    Self::new(err.to_string())
                }
            }
        )+
    };
}

impl_from_display!(
    std::io::Error,
    serde_json::Error,
    manuplan_core::DatumError,
    manuplan_core::interfaces::StoreError,
    manuplan_store::SqliteStoreError,
    crate::catalog::CatalogLoadError,
);

/// Result alias used throughout the CLI.
pub type CliResult<T> = Result<T, CliError>;

/// The durable state one CLI invocation operates against: a `SQLite`-backed
/// plan store, profile store, file-backed audit log, and file-backed pack/
/// industry/bundle catalog, all rooted at one data directory.
pub struct Workspace {
    /// Durable plan version storage.
    pub plan_store: SqlitePlanStore,
    /// Durable profile version storage.
    pub profile_store: SqliteProfileStore,
    /// Append-only audit trail.
    pub audit: FileAuditLog,
    /// Static pack/industry/bundle catalog.
    pub catalog: FileCatalog,
}

impl Workspace {
    /// Opens (creating if needed) a workspace rooted at `data_dir`:
    /// `data_dir/store.sqlite3` for plan and profile versions,
    /// `data_dir/audit.jsonl` for the audit trail, and
    /// `data_dir/catalog/{packs,industries,bundles}` for static catalog data.
    pub fn open(data_dir: &Path) -> CliResult<Self> {
        let store_config = SqliteStoreConfig::new(data_dir.join("store.sqlite3"));
        let plan_store = SqlitePlanStore::open(&store_config)?;
        let profile_store = SqliteProfileStore::open(&store_config)?;
        let audit = FileAuditLog::open(&data_dir.join("audit.jsonl"))?;
        let catalog = FileCatalog::load(&data_dir.join("catalog"))?;
        Ok(Self { plan_store, profile_store, audit, catalog })
    }
}

/// Reads and parses a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let bytes = std::fs::read(path).map_err(|err| CliError::new(format!("{}: {err}", path.display())))?;
    serde_json::from_slice(&bytes).map_err(|err| CliError::new(format!("{}: {err}", path.display())))
}

/// Writes `value` as pretty-printed JSON to stdout, followed by a newline.
pub fn write_json_stdout<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    write_stdout_line(&rendered)
}

/// Writes one line to stdout.
pub fn write_stdout_line(line: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{line}").map_err(CliError::from)
}

/// Writes one line to stderr.
pub fn write_stderr_line(line: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(stderr, "{line}").map_err(CliError::from)
}

/// Returns the current instant as an RFC 3339 timestamp, for commands that
/// do not require a caller-supplied one.
pub fn now_rfc3339() -> CliResult<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|err| CliError::new(err.to_string()))
}

/// Resolves the default data directory, `./manuplan-data`, as a
/// [`PathBuf`].
#[must_use]
pub fn default_data_dir() -> PathBuf {
    PathBuf::from("manuplan-data")
}
