// manuplan-cli/src/audit.rs
// ============================================================================
// Module: File-Backed Audit Log
// Description: Append-only JSON-lines AuditLog backed by a single file.
// Purpose: Give the CLI a durable audit trail without requiring SQLite for
//          what is, by design, a strictly-append workload.
// Dependencies: manuplan-core, serde_json
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use manuplan_core::interfaces::AuditEntry;
use manuplan_core::interfaces::AuditLog;
use manuplan_core::interfaces::StoreError;

/// Appends one JSON object per line to a file, opening it once and holding
/// the handle for the life of the process.
pub struct FileAuditLog {
    path: PathBuf,
    file: Mutex<std::fs::File>,
}

impl FileAuditLog {
    /// Opens (creating if needed) the audit log at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be created or opened
    /// for appending.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { path: path.to_path_buf(), file: Mutex::new(file) })
    }

    /// Reads back every entry recorded so far, in write order.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be read, or
    /// [`serde_json::Error`] wrapped as [`std::io::Error`] if a line is
    /// malformed.
    pub fn read_all(&self) -> std::io::Result<Vec<AuditEntry>> {
        let contents = std::fs::read_to_string(&self.path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(std::io::Error::other))
            .collect()
    }
}

impl AuditLog for FileAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        let line = serde_json::to_string(&entry).map_err(|err| StoreError::Io(err.to_string()))?;
        let mut file = self.file.lock().map_err(|_| StoreError::Io("audit log mutex poisoned".to_owned()))?;
        writeln!(file, "{line}").map_err(|err| StoreError::Io(err.to_string()))
    }
}
