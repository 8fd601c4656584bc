// manuplan-store/src/profile_store.rs
// ============================================================================
// Module: SQLite Profile Store
// Description: Durable, CAS-enforcing ProfileStore backed by SQLite.
// Purpose: Give `StandardsProfile` versions the same single-writer,
//          "version must not yet exist" persistence as plans, ordered by
//          semver rather than an integer counter.
// Dependencies: manuplan-core, rusqlite, serde_json
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use manuplan_core::ProfileId;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::hashing::DEFAULT_HASH_ALGORITHM;
use manuplan_core::hashing::canonical_json_bytes;
use manuplan_core::hashing::hash_bytes;
use manuplan_core::interfaces::ProfileStore;
use manuplan_core::interfaces::StoreError;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::SqliteStoreConfig;
use crate::SqliteStoreError;
use crate::schema::initialize_schema;
use crate::schema::open_connection;

/// `SQLite`-backed [`ProfileStore`].
#[derive(Clone)]
pub struct SqliteProfileStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    /// Opens (creating if needed) a profile store at `config.path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the database cannot be opened or its
    /// schema initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }
}

impl ProfileStore for SqliteProfileStore {
    fn load_latest(&self, profile_id: &ProfileId) -> Result<Option<StandardsProfile>, StoreError> {
        let versions = self.list_versions(profile_id)?;
        let Some(latest) = versions.into_iter().max_by(|a, b| compare_semver(a, b)) else {
            return Ok(None);
        };
        self.load_version(profile_id, &latest)
    }

    fn load_version(&self, profile_id: &ProfileId, version: &str) -> Result<Option<StandardsProfile>, StoreError> {
        let guard =
            self.connection.lock().map_err(|_| StoreError::Io("profile store mutex poisoned".to_owned()))?;
        let row: Option<(Vec<u8>, String)> = guard
            .query_row(
                "SELECT profile_json, content_hash FROM profile_versions WHERE profile_id = ?1 AND version = ?2",
                params![profile_id.as_str(), version],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|(bytes, hash)| decode_profile(&bytes, &hash)).transpose()
    }

    fn list_versions(&self, profile_id: &ProfileId) -> Result<Vec<String>, StoreError> {
        let guard =
            self.connection.lock().map_err(|_| StoreError::Io("profile store mutex poisoned".to_owned()))?;
        let mut stmt = guard
            .prepare("SELECT version FROM profile_versions WHERE profile_id = ?1")
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = stmt
            .query_map(params![profile_id.as_str()], |row| row.get::<_, String>(0))
            .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.map(|row| row.map_err(|err| StoreError::Io(err.to_string()))).collect()
    }

    fn create_version(&self, profile: &StandardsProfile) -> Result<(), StoreError> {
        eprintln!("DEBUG create_version called for {} {}", profile.profile_id.as_str(), profile.version);
        let canonical = canonical_json_bytes(profile).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let content_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical);
        let guard =
            self.connection.lock().map_err(|_| StoreError::Io("profile store mutex poisoned".to_owned()))?;
        let result = guard.execute(
            "INSERT INTO profile_versions (profile_id, version, profile_json, content_hash) \
             VALUES (?1, ?2, ?3, ?4)",
            params![profile.profile_id.as_str(), profile.version, canonical, content_hash],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::VersionConflict {
                    entity_id: profile.profile_id.to_string(),
                    attempted: profile.version.clone(),
                })
            }
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }
}

fn decode_profile(bytes: &[u8], stored_hash: &str) -> Result<StandardsProfile, StoreError> {
    let expected = hash_bytes(DEFAULT_HASH_ALGORITHM, bytes);
    if expected != stored_hash {
        return Err(StoreError::Corrupt("profile content hash mismatch".to_owned()));
    }
    serde_json::from_slice(bytes).map_err(|err| StoreError::Corrupt(err.to_string()))
}

/// Compares two `X.Y.Z` semver strings numerically, falling back to a
/// lexicographic comparison for malformed input so listing never panics.
fn compare_semver(a: &str, b: &str) -> std::cmp::Ordering {
    let parse = |s: &str| -> Option<(u64, u64, u64)> {
        let mut parts = s.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        Some((major, minor, patch))
    };
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
