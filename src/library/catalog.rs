//! Canonical category catalog and the fragment index derived from it.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FabricMapError, Result};

/// Category lists grouped by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CategoryGroups {
    #[serde(default)]
    woven: Vec<String>,
    #[serde(default)]
    knit: Vec<String>,
    /// Group keys this tool does not manage are carried through untouched.
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

/// The canonical taxonomy, backed by `mappingLib.json`.
///
/// Holds the flat list of every category string plus the per-construction
/// group lists. The flat list drives fragment matching and new-category
/// detection; the group lists exist for the taxonomy's human maintainers
/// and are kept in sync when new categories are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    fabric_types: CategoryGroups,
    #[serde(default)]
    all_fabric_types: Vec<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

/// What [`CategoryCatalog::add_categories`] actually changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogUpdate {
    /// Added to the `woven` group (and the flat list).
    pub woven: Vec<String>,
    /// Added to the `knit` group (and the flat list).
    pub knit: Vec<String>,
    /// Added to the flat list only: no recognized group prefix.
    pub unprefixed: Vec<String>,
}

impl CatalogUpdate {
    pub fn is_empty(&self) -> bool {
        self.woven.is_empty() && self.knit.is_empty() && self.unprefixed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.woven.len() + self.knit.len() + self.unprefixed.len()
    }
}

impl CategoryCatalog {
    /// Load the catalog from disk.
    ///
    /// A missing file yields an empty catalog, which disables fragment
    /// matching until categories are learned. An unparsable file is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            FabricMapError::MalformedLibrary(format!("{}: {}", path.display(), e))
        })
    }

    /// Rewrite the whole catalog to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Derive the fragment index: descriptive remainder -> category.
    ///
    /// Each category string is split on its first `_`; the remainder (which
    /// may itself contain underscores, as in `knit_french_terry`) becomes
    /// the fragment key. Categories without a separator contribute nothing.
    /// When two categories share a remainder the later one overwrites the
    /// earlier, keeping the earlier position. Keys and values are
    /// lowercased so they compare cleanly against normalized labels.
    pub fn fragment_index(&self) -> IndexMap<String, String> {
        let mut index = IndexMap::new();
        for category in &self.all_fabric_types {
            if let Some((_, fragment)) = category.split_once('_') {
                index.insert(fragment.to_lowercase(), category.to_lowercase());
            }
        }
        index
    }

    /// Case-insensitive membership test against the flat category list.
    pub fn contains_category(&self, category: &str) -> bool {
        self.all_fabric_types
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Fold new categories into the catalog.
    ///
    /// Categories already present (case-insensitively) are skipped, so
    /// re-applying the same review sheet changes nothing. `woven_`- and
    /// `knit_`-prefixed names land in their group list and the flat list;
    /// anything else lands in the flat list only and is reported back so
    /// the caller can warn. All three lists are sorted and deduplicated
    /// afterwards.
    pub fn add_categories(&mut self, categories: &[String]) -> CatalogUpdate {
        let mut update = CatalogUpdate::default();
        for category in categories {
            if self.contains_category(category) {
                continue;
            }
            if category.starts_with("woven_") {
                self.fabric_types.woven.push(category.clone());
                update.woven.push(category.clone());
            } else if category.starts_with("knit_") {
                self.fabric_types.knit.push(category.clone());
                update.knit.push(category.clone());
            } else {
                update.unprefixed.push(category.clone());
            }
            self.all_fabric_types.push(category.clone());
        }

        for list in [
            &mut self.fabric_types.woven,
            &mut self.fabric_types.knit,
            &mut self.all_fabric_types,
        ] {
            list.sort();
            list.dedup();
        }
        update
    }

    pub fn all_categories(&self) -> &[String] {
        &self.all_fabric_types
    }

    pub fn woven(&self) -> &[String] {
        &self.fabric_types.woven
    }

    pub fn knit(&self) -> &[String] {
        &self.fabric_types.knit
    }

    pub fn is_empty(&self) -> bool {
        self.all_fabric_types.is_empty()
    }
}
