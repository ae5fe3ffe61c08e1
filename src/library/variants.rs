//! Category -> variant-spelling library (the exact-match knowledge base).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{FabricMapError, Result};

/// Known label spellings per canonical category, in file order.
///
/// Backed by `mainlib.json`: a JSON object whose keys are category strings
/// (`woven_poplin`) and whose values are arrays of raw labels previously
/// confirmed to mean that category. Keys and variants are lowercased on
/// load; variant lists are kept sorted across updates.
///
/// Category iteration order is the file's key order, so exact-match lookup
/// is stable across runs as long as the file is rewritten through [`save`].
///
/// [`save`]: VariantLibrary::save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantLibrary {
    entries: IndexMap<String, Vec<String>>,
}

impl VariantLibrary {
    /// Load the library from disk.
    ///
    /// A missing file yields an empty library (first run). A file that
    /// exists but does not parse as `{category: [variants]}` is fatal
    /// before any mutation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        let raw: IndexMap<String, Vec<String>> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                FabricMapError::MalformedLibrary(format!("{}: {}", path.display(), e))
            })?;

        let mut entries = IndexMap::with_capacity(raw.len());
        for (category, variants) in raw {
            let variants = variants.iter().map(|v| v.to_lowercase()).collect();
            entries.insert(category.to_lowercase(), variants);
        }
        Ok(Self { entries })
    }

    /// Rewrite the whole library to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.entries)?;
        Ok(())
    }

    /// Find the category that lists `label` as one of its variants.
    ///
    /// Categories are scanned in insertion order and the first hit wins.
    /// `label` is expected to be normalized (trimmed, lowercased) already.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, variants)| variants.iter().any(|v| v == label))
            .map(|(category, _)| category.as_str())
    }

    /// Record `label` as a variant of `category`.
    ///
    /// Creates the category entry if needed and keeps the variant list
    /// sorted. Returns `false` when the variant was already present, so
    /// re-applying the same review sheet is a no-op.
    pub fn insert_variant(&mut self, category: &str, label: &str) -> bool {
        let variants = self.entries.entry(category.to_string()).or_default();
        if variants.iter().any(|v| v == label) {
            return false;
        }
        variants.push(label.to_string());
        variants.sort();
        true
    }

    /// Variants that appear under more than one category.
    ///
    /// Lookup still resolves these (first category wins) but they usually
    /// mean the library needs a manual cleanup, so the pipeline surfaces
    /// them as warnings. Returns `(variant, categories)` pairs sorted by
    /// variant.
    pub fn cross_category_duplicates(&self) -> Vec<(String, Vec<String>)> {
        let mut by_variant: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (category, variants) in &self.entries {
            for variant in variants {
                by_variant
                    .entry(variant.as_str())
                    .or_default()
                    .push(category.as_str());
            }
        }

        let mut duplicates: Vec<(String, Vec<String>)> = by_variant
            .into_iter()
            .filter(|(_, categories)| categories.len() > 1)
            .map(|(variant, categories)| {
                (
                    variant.to_string(),
                    categories.into_iter().map(String::from).collect(),
                )
            })
            .collect();
        duplicates.sort();
        duplicates
    }

    pub fn variants(&self, category: &str) -> Option<&[String]> {
        self.entries.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
