// manuplan-store/src/schema.rs
// ============================================================================
// Module: SQLite Schema
// Description: Connection setup and schema initialization shared by both
//              versioned stores.
// Purpose: Give `manuplan-plan` and `manuplan-profiles` a durable backing
//          store with the same WAL/pragma discipline across both tables.
// Dependencies: rusqlite
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;

use crate::SqliteStoreError;

const SCHEMA_VERSION: i64 = 1;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

impl Default for SqliteJournalMode {
    fn default() -> Self {
        Self::Wal
    }
}

/// Configuration shared by [`crate::SqlitePlanStore`] and
/// [`crate::SqliteProfileStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteJournalMode,
}

impl SqliteStoreConfig {
    /// Builds a config with default timeout and WAL journaling.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path, busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS, journal_mode: SqliteJournalMode::default() }
    }
}

pub(crate) fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    ensure_parent_dir(&config.path)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

pub(crate) fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if version.is_none() {
        tx.execute("INSERT INTO store_meta (version) VALUES (?1)", [SCHEMA_VERSION])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    }
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS plan_versions (
            plan_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            plan_json BLOB NOT NULL,
            content_hash TEXT NOT NULL,
            PRIMARY KEY (plan_id, version)
        );
        CREATE INDEX IF NOT EXISTS idx_plan_versions_plan_id ON plan_versions (plan_id);
        CREATE TABLE IF NOT EXISTS profile_versions (
            profile_id TEXT NOT NULL,
            version TEXT NOT NULL,
            profile_json BLOB NOT NULL,
            content_hash TEXT NOT NULL,
            PRIMARY KEY (profile_id, version)
        );
        CREATE INDEX IF NOT EXISTS idx_profile_versions_profile_id ON profile_versions (profile_id);",
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}
