//! Keyword-table tag inference from extracted metadata.

use std::collections::BTreeSet;

const SUMMER_FEATURES: &[&str] = &["breathable", "lightweight", "airy"];
const WINTER_FEATURES: &[&str] = &["cozy", "thick", "warm"];

const CASUAL_WORDS: &[&str] = &["shirt", "blouse", "t-shirt", "pants", "leggings"];
const LOUNGE_WORDS: &[&str] = &["underwear", "pajama", "leggings", "lounge"];
const HOME_WORDS: &[&str] = &["curtain", "bedding", "furnishing"];
const FORMAL_WORDS: &[&str] = &["dress", "skirt", "gown"];
const DAILY_WORDS: &[&str] = &["shirt", "casual", "blouse"];

/// Shopping-oriented tags derived from `features` and `end_use`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferredTags {
    pub season: Vec<String>,
    pub use_case: Vec<String>,
    pub occasion: Vec<String>,
}

/// Infer tags from the extracted metadata.
///
/// Season comes from exact feature membership, with `year-round` when
/// neither season table matches. Use case and occasion come from substring
/// scans of each end use. All three lists are sorted and deduplicated.
pub fn infer_tags(features: &[String], end_use: &[String]) -> InferredTags {
    let mut season: BTreeSet<&str> = BTreeSet::new();
    if features.iter().any(|f| SUMMER_FEATURES.contains(&f.as_str())) {
        season.insert("summer");
    }
    if features.iter().any(|f| WINTER_FEATURES.contains(&f.as_str())) {
        season.insert("winter");
    }
    if season.is_empty() {
        season.insert("year-round");
    }

    let mut use_case: BTreeSet<&str> = BTreeSet::new();
    let mut occasion: BTreeSet<&str> = BTreeSet::new();
    for entry in end_use {
        let entry = entry.to_lowercase();
        if CASUAL_WORDS.iter().any(|w| entry.contains(w)) {
            use_case.insert("casual");
        }
        if LOUNGE_WORDS.iter().any(|w| entry.contains(w)) {
            use_case.insert("loungewear");
        }
        if HOME_WORDS.iter().any(|w| entry.contains(w)) {
            use_case.insert("home textile");
        }
        if FORMAL_WORDS.iter().any(|w| entry.contains(w)) {
            use_case.insert("formal");
        }

        if entry.contains("wedding") {
            occasion.insert("wedding");
        }
        if entry.contains("party") {
            occasion.insert("party");
        }
        if entry.contains("work") || entry.contains("office") {
            occasion.insert("workwear");
        }
        if DAILY_WORDS.iter().any(|w| entry.contains(w)) {
            occasion.insert("daily");
        }
    }

    InferredTags {
        season: season.into_iter().map(String::from).collect(),
        use_case: use_case.into_iter().map(String::from).collect(),
        occasion: occasion.into_iter().map(String::from).collect(),
    }
}
