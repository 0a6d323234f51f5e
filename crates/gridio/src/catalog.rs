//! On-disk catalogue of downloaded monthly grid files.
//!
//! The download stage maintains a JSON record
//! `{category: [{file, year, month, size}]}` next to the data tree. Its
//! absence is a hard precondition failure for an extraction run; missing
//! individual monthly files are not.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// One catalogued grid file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// File name relative to the data root.
    pub file: String,
    /// Year the file covers.
    pub year: i32,
    /// Month the file covers (1-12).
    pub month: u8,
    /// File size in bytes at download time.
    pub size: u64,
}

/// The full catalogue, keyed by grid category
/// (e.g. `era5_pressure_levels`, `era5_single_level`, `oras5`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Catalog {
    /// Loads the catalogue from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CatalogNotFound`] if the file does not exist and
    /// [`GridError::CatalogParse`] if it is not valid catalogue JSON.
    pub fn load(path: &Path) -> Result<Self, GridError> {
        if !path.exists() {
            return Err(GridError::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| GridError::CatalogParse {
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| GridError::CatalogParse {
            reason: e.to_string(),
        })
    }

    /// Category names present in the catalogue.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Number of files recorded for `category` (0 if unknown).
    pub fn n_entries(&self, category: &str) -> usize {
        self.categories.get(category).map_or(0, Vec::len)
    }

    /// The sorted set of (year, month) keys covered by any category.
    pub fn months(&self) -> BTreeSet<(i32, u8)> {
        self.categories
            .values()
            .flatten()
            .map(|e| (e.year, e.month))
            .collect()
    }
}
