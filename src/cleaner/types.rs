//! Data shapes for the cleaning stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scraped product row before cleaning.
///
/// Scrapers disagree about casing and about whether `details` is a real
/// object or a stringified one, so both are tolerated on input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(alias = "Description", default)]
    pub description: String,
    #[serde(alias = "Details", default)]
    pub details: Option<Value>,
}

impl SourceRecord {
    /// The `details` block as string key/value pairs.
    ///
    /// Accepts an embedded object directly, or a string cell that parses
    /// as a JSON object. Non-string values are rendered; anything else
    /// yields an empty map.
    pub fn details_map(&self) -> Vec<(String, String)> {
        let object = match &self.details {
            Some(Value::Object(map)) => Some(map.clone()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(text)
                .ok()
                .and_then(|v| v.as_object().cloned()),
            _ => None,
        };
        let object = match object {
            Some(object) => object,
            None => return Vec::new(),
        };
        object
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect()
    }

    pub fn detail(&self, key: &str) -> Option<String> {
        self.details_map()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Metadata fields the model extracts from a product description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FabricMetadata {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub fabric_type: Option<String>,
    #[serde(default)]
    pub gsm: Option<u32>,
    #[serde(default)]
    pub end_use: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Fabric weight: measured grams per square meter when a number is
/// available, otherwise the descriptor word found in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gsm {
    Grams(u32),
    Descriptor(String),
}

/// One shopper question with its answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// A fully cleaned product record, ready for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub description: String,
    pub material: Option<String>,
    pub fabric_type: Option<String>,
    pub gsm: Option<Gsm>,
    #[serde(default)]
    pub end_use: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub season: Vec<String>,
    #[serde(default)]
    pub use_case: Vec<String>,
    #[serde(default)]
    pub occasion: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_pairs: Option<Vec<QaPair>>,
}
