//! Product record batches.
//!
//! A batch is a JSON array of objects as produced by the scrape/cleaning
//! stages. Only `fabric_type` is interpreted here; every other member is
//! carried through untouched so upstream fields (description, material,
//! gsm, qa_pairs, ...) survive the reconciliation pass byte-for-byte.

use crate::error::{FabricMapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Free-text fabric type as scraped/extracted. Arbitrary JSON is
    /// tolerated on input; the final rewrite replaces it with a canonical
    /// category string or an explicit null, never removes it.
    #[serde(default)]
    pub fabric_type: Option<Value>,

    /// All remaining members, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ProductRecord {
    /// The raw fabric type, only when it is actually a string.
    /// Numbers, arrays and null are treated as "no usable label".
    pub fn fabric_type_str(&self) -> Option<&str> {
        match &self.fabric_type {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Replace the fabric type with a category string, or with an explicit
    /// null when no category applies.
    pub fn set_fabric_type(&mut self, category: Option<String>) {
        self.fabric_type = category.map(Value::String);
    }
}

/// Load a record batch from a JSON array file.
pub fn load_batch(path: &Path) -> Result<Vec<ProductRecord>> {
    if !path.exists() {
        return Err(FabricMapError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let records: Vec<ProductRecord> = serde_json::from_reader(reader)?;
    Ok(records)
}

/// Write a record batch as pretty-printed JSON.
pub fn save_batch(path: &Path, records: &[ProductRecord]) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Output path for the rewritten batch: `Cleaned<stem>.json` next to the
/// input file.
pub fn cleaned_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("Cleaned{}.json", stem))
}
