//! Static reference tables: the crop catalog and the unit price table.
//!
//! Both are TOML arrays-of-tables loaded once per planning run. Lookups are
//! case-insensitive; display names keep the casing from the table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::PlanningError;

/// One row of the crop reference table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropCatalogEntry {
    pub name: String,
    pub yield_kg_per_m2: f64,
    pub cycle_days: i64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    crops: Vec<CropCatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    crop: String,
    price_usd_per_kg: f64,
}

#[derive(Debug, Deserialize)]
struct PriceFile {
    prices: Vec<PriceRow>,
}

/// Normalized key used for all by-name lookups.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The crop catalog, keyed by normalized crop name.
#[derive(Debug, Clone, Default)]
pub struct CropCatalog {
    entries: HashMap<String, CropCatalogEntry>,
}

impl CropCatalog {
    pub fn from_entries(entries: Vec<CropCatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (normalize_name(&e.name), e))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&CropCatalogEntry> {
        self.entries.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display names in stable alphabetical order, for prompt building.
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.values().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }
}

/// Unit prices in USD per kg, keyed by normalized crop name.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    pub fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        let prices = pairs
            .into_iter()
            .map(|(name, price)| (normalize_name(&name), price))
            .collect();
        Self { prices }
    }

    pub fn unit_price(&self, name: &str) -> Option<f64> {
        self.prices.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Loads the crop catalog. An unreadable or unparseable table is fatal.
pub fn load_crop_catalog(path: &Path) -> Result<CropCatalog, PlanningError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| PlanningError::data_unavailable(path, e))?;
    let file: CatalogFile =
        toml::from_str(&content).map_err(|e| PlanningError::data_unavailable(path, e))?;
    Ok(CropCatalog::from_entries(file.crops))
}

/// Loads a unit price table from `path`. Used both for the default reference
/// table and for caller-supplied overrides, which replace it wholesale.
pub fn load_price_table(path: &Path) -> Result<PriceTable, PlanningError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| PlanningError::data_unavailable(path, e))?;
    let file: PriceFile =
        toml::from_str(&content).map_err(|e| PlanningError::data_unavailable(path, e))?;
    Ok(PriceTable::from_pairs(
        file.prices
            .into_iter()
            .map(|row| (row.crop, row.price_usd_per_kg))
            .collect(),
    ))
}
