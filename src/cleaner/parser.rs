//! Response parsers for the extraction model.
//!
//! Models wrap their JSON in markdown fences or chat prose often enough
//! that both parsers first cut the JSON body out of the response, then
//! read fields leniently: a missing or oddly typed field degrades to its
//! default instead of discarding the whole record.

use serde_json::Value;

use crate::cleaner::types::{FabricMetadata, QaPair};
use crate::error::{FabricMapError, Result};

/// Extract the JSON body from a model response.
///
/// Priority:
/// 1. a ```json fenced block
/// 2. the widest `open`..`close` span in the raw text
pub fn extract_json(response: &str, open: char, close: char) -> Result<&str> {
    if let Some(marker) = response.find("```json") {
        let start = marker + "```json".len();
        if let Some(offset) = response[start..].find("```") {
            return Ok(response[start..start + offset].trim());
        }
    }

    if let Some(start) = response.find(open) {
        if let Some(end) = response.rfind(close) {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(FabricMapError::ChatParse(format!(
        "no JSON {}..{} block in response",
        open, close
    )))
}

/// Parse a metadata response into [`FabricMetadata`].
pub fn parse_metadata_response(response: &str) -> Result<FabricMetadata> {
    let body = extract_json(response, '{', '}')?;
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FabricMapError::ChatParse(format!("metadata JSON: {}", e)))?;

    Ok(FabricMetadata {
        material: string_field(&value, "material"),
        fabric_type: string_field(&value, "fabric_type"),
        gsm: gsm_field(&value),
        end_use: list_field(&value, "end_use"),
        features: list_field(&value, "features"),
    })
}

/// Parse a Q&A response into pairs, dropping entries without a question.
pub fn parse_qa_response(response: &str) -> Result<Vec<QaPair>> {
    let body = extract_json(response, '[', ']')?;
    let mut pairs: Vec<QaPair> = serde_json::from_str(body)
        .map_err(|e| FabricMapError::ChatParse(format!("Q&A JSON: {}", e)))?;
    pairs.retain(|pair| !pair.question.trim().is_empty());
    Ok(pairs)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// `gsm` arrives as an integer on a good day, but also as a float, a
/// digit string, or null.
fn gsm_field(value: &Value) -> Option<u32> {
    match value.get("gsm") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_json_first() {
        let response = "Here you go:\n```json\n{\"material\": \"Linen\"}\n```\nDone.";
        assert_eq!(
            extract_json(response, '{', '}').unwrap(),
            "{\"material\": \"Linen\"}"
        );
    }

    #[test]
    fn test_extracts_bare_json_with_prose_around_it() {
        let response = "Sure! {\"material\": \"Linen\"} hope that helps";
        assert_eq!(
            extract_json(response, '{', '}').unwrap(),
            "{\"material\": \"Linen\"}"
        );
    }

    #[test]
    fn test_missing_json_is_an_error() {
        assert!(extract_json("no json here", '{', '}').is_err());
    }

    #[test]
    fn test_metadata_fields_are_read_leniently() {
        let response = r#"{
            "material": " 100% Rayon ",
            "fabric_type": null,
            "gsm": "195",
            "end_use": ["blouses", 3, "dresses"],
            "features": "soft"
        }"#;
        let metadata = parse_metadata_response(response).unwrap();
        assert_eq!(metadata.material.as_deref(), Some("100% Rayon"));
        assert_eq!(metadata.fabric_type, None);
        assert_eq!(metadata.gsm, Some(195));
        assert_eq!(metadata.end_use, vec!["blouses", "dresses"]);
        assert!(metadata.features.is_empty());
    }

    #[test]
    fn test_float_gsm_is_rounded() {
        let metadata = parse_metadata_response("{\"gsm\": 194.6}").unwrap();
        assert_eq!(metadata.gsm, Some(195));
    }

    #[test]
    fn test_qa_pairs_without_a_question_are_dropped() {
        let response = r#"[
            {"question": "Is it cool for summer?", "answer": "Very."},
            {"question": "", "answer": "orphan"},
            {"answer": "no question at all"}
        ]"#;
        let pairs = parse_qa_response(response).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "Is it cool for summer?");
    }
}
