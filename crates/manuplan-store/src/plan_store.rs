// manuplan-store/src/plan_store.rs
// ============================================================================
// Module: SQLite Plan Store
// Description: Durable, CAS-enforcing PlanStore backed by SQLite.
// Purpose: Give `DatumPlan` versions the single-writer-per-entity,
//          "version must not yet exist" persistence the governance layer
//          requires.
// Dependencies: manuplan-core, rusqlite, serde_json
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use manuplan_core::PlanId;
use manuplan_core::domain::DatumPlan;
use manuplan_core::hashing::DEFAULT_HASH_ALGORITHM;
use manuplan_core::hashing::canonical_json_bytes;
use manuplan_core::hashing::hash_bytes;
use manuplan_core::interfaces::PlanStore;
use manuplan_core::interfaces::StoreError;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::SqliteStoreConfig;
use crate::SqliteStoreError;
use crate::schema::initialize_schema;
use crate::schema::open_connection;

/// `SQLite`-backed [`PlanStore`].
#[derive(Clone)]
pub struct SqlitePlanStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqlitePlanStore {
    /// Opens (creating if needed) a plan store at `config.path`.
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

impl PlanStore for SqlitePlanStore {
    fn load_latest(&self, plan_id: &PlanId) -> Result<Option<DatumPlan>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Io("plan store mutex poisoned".to_owned()))?;
        let row: Option<(Vec<u8>, String)> = guard
            .query_row(
                "SELECT plan_json, content_hash FROM plan_versions WHERE plan_id = ?1 \
                 ORDER BY version DESC LIMIT 1",
                params![plan_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|(bytes, hash)| decode_plan(&bytes, &hash)).transpose()
    }

    fn load_version(&self, plan_id: &PlanId, version: u32) -> Result<Option<DatumPlan>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Io("plan store mutex poisoned".to_owned()))?;
        let row: Option<(Vec<u8>, String)> = guard
            .query_row(
                "SELECT plan_json, content_hash FROM plan_versions WHERE plan_id = ?1 AND version = ?2",
                params![plan_id.as_str(), version],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|(bytes, hash)| decode_plan(&bytes, &hash)).transpose()
    }

    fn list_versions(&self, plan_id: &PlanId) -> Result<Vec<u32>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Io("plan store mutex poisoned".to_owned()))?;
        let mut stmt = guard
            .prepare("SELECT version FROM plan_versions WHERE plan_id = ?1 ORDER BY version ASC")
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = stmt
            .query_map(params![plan_id.as_str()], |row| row.get::<_, i64>(0))
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let mut versions = Vec::new();
        for row in rows {
            let value = row.map_err(|err| StoreError::Io(err.to_string()))?;
            versions.push(u32::try_from(value).map_err(|err| StoreError::Corrupt(err.to_string()))?);
        }
        Ok(versions)
    }

    fn create_version(&self, plan: &DatumPlan) -> Result<(), StoreError> {
        let canonical = canonical_json_bytes(plan).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let content_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical);
        let guard = self.connection.lock().map_err(|_| StoreError::Io("plan store mutex poisoned".to_owned()))?;
        let result = guard.execute(
            "INSERT INTO plan_versions (plan_id, version, plan_json, content_hash) VALUES (?1, ?2, ?3, ?4)",
            params![plan.plan_id.as_str(), plan.version, canonical, content_hash],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::VersionConflict {
                    entity_id: plan.plan_id.to_string(),
                    attempted: plan.version.to_string(),
                })
            }
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }
}

fn decode_plan(bytes: &[u8], stored_hash: &str) -> Result<DatumPlan, StoreError> {
    let expected = hash_bytes(DEFAULT_HASH_ALGORITHM, bytes);
    if expected != stored_hash {
        return Err(StoreError::Corrupt("plan content hash mismatch".to_owned()));
    }
    serde_json::from_slice(bytes).map_err(|err| StoreError::Corrupt(err.to_string()))
}
