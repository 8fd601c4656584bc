// manuplan-cli/src/catalog.rs
// ============================================================================
// Module: File-Backed Catalogs
// Description: Directory-of-JSON-files PackCatalog, plus a ProfileCatalog
//              adapter over a versioned ProfileStore and static bundle/
//              industry directories.
// Purpose: Let the CLI stand up the read-only catalog dependencies the SOE
//          engine needs without a database.
// Dependencies: manuplan-core, serde_json
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use manuplan_core::BundleId;
use manuplan_core::IndustryId;
use manuplan_core::PackId;
use manuplan_core::ProfileId;
use manuplan_core::ProfileStore;
use manuplan_core::domain::ProfileBundle;
use manuplan_core::domain::StandardsPack;
use manuplan_core::domain::StandardsProfile;
use manuplan_core::domain::profile::IndustryProfile;
use manuplan_core::interfaces::CatalogError;
use manuplan_core::interfaces::PackCatalog;
use manuplan_core::interfaces::ProfileCatalog;

/// Packs, industries, and bundles loaded once from a directory tree at
/// startup. Catalog data is immutable for the life of one CLI invocation.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    packs: Vec<StandardsPack>,
    industries: Vec<IndustryProfile>,
    bundles: Vec<ProfileBundle>,
}

/// Errors loading catalog data from disk.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    /// The catalog root or one of its subdirectories could not be read.
    #[error("catalog read error at {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A catalog file's JSON did not match its expected shape.
    #[error("catalog file {path} is invalid: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl FileCatalog {
    /// Loads every `*.json` file under `root/packs`, `root/industries`, and
    /// `root/bundles`. Missing subdirectories are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogLoadError`] if a present subdirectory cannot be read
    /// or a file inside it fails to parse.
    pub fn load(root: &Path) -> Result<Self, CatalogLoadError> {
        Ok(Self {
            packs: load_json_dir(&root.join("packs"))?,
            industries: load_json_dir(&root.join("industries"))?,
            bundles: load_json_dir(&root.join("bundles"))?,
        })
    }
}

fn load_json_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>, CatalogLoadError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| CatalogLoadError::Read { path: dir.to_path_buf(), source })?;
    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogLoadError::Read { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let bytes = fs::read(&path).map_err(|source| CatalogLoadError::Read { path: path.clone(), source })?;
        let item = serde_json::from_slice(&bytes).map_err(|source| CatalogLoadError::Parse { path, source })?;
        items.push(item);
    }
    Ok(items)
}

impl PackCatalog for FileCatalog {
    fn get_pack(&self, pack_id: &PackId) -> Result<StandardsPack, CatalogError> {
        self.packs
            .iter()
            .find(|pack| &pack.pack_id == pack_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(pack_id.to_string()))
    }
}

/// A [`ProfileCatalog`] that resolves profiles through a versioned
/// [`ProfileStore`] (always the latest version) and bundles/industries from
/// a [`FileCatalog`].
///
/// Profiles are governed and versioned, so they live in the store; bundles
/// and industry defaults are not versioned entities and are read from
/// static catalog files instead.
pub struct StoreBackedProfileCatalog<'a, S: ProfileStore> {
    store: &'a S,
    catalog: &'a FileCatalog,
}

impl<'a, S: ProfileStore> StoreBackedProfileCatalog<'a, S> {
    /// Builds an adapter over `store` and `catalog`.
    #[must_use]
    pub const fn new(store: &'a S, catalog: &'a FileCatalog) -> Self {
        Self { store, catalog }
    }
}

impl<S: ProfileStore> ProfileCatalog for StoreBackedProfileCatalog<'_, S> {
    fn get_profile(&self, profile_id: &ProfileId) -> Result<StandardsProfile, CatalogError> {
        self.store
            .load_latest(profile_id)
            .map_err(|err| CatalogError::Invalid(err.to_string()))?
            .ok_or_else(|| CatalogError::NotFound(profile_id.to_string()))
    }

    fn get_industry(&self, industry_id: &IndustryId) -> Result<IndustryProfile, CatalogError> {
        self.catalog
            .industries
            .iter()
            .find(|industry| &industry.industry_id == industry_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(industry_id.to_string()))
    }

    fn get_bundle(&self, bundle_id: &BundleId) -> Result<ProfileBundle, CatalogError> {
        self.catalog
            .bundles
            .iter()
            .find(|bundle| &bundle.bundle_id == bundle_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(bundle_id.to_string()))
    }
}
