//! Automatic label -> category resolution.
//!
//! Labels are matched against the knowledge bases in a fixed order:
//! 1. Exact: the label is a known variant in the [`VariantLibrary`]
//! 2. Whole token: one of the label's whitespace tokens (trailing
//!    punctuation stripped) is a catalog fragment; the leftmost hitting
//!    token decides
//! 3. Substring: a fragment occurs anywhere inside the label; the first
//!    hit in fragment-index order decides
//!
//! The first rung that produces a category wins; labels that fall through
//! all three are left for human review.

use indexmap::IndexMap;

use crate::library::VariantLibrary;
use crate::records::ProductRecord;

/// How (or whether) a label was resolved to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Known variant in the library.
    Exact(String),
    /// Catalog fragment matched a whole token of the label.
    WholeToken(String),
    /// Catalog fragment occurred as a substring of the label.
    Substring(String),
    /// No rung matched; needs review.
    Unresolved,
}

impl Resolution {
    pub fn category(&self) -> Option<&str> {
        match self {
            Resolution::Exact(c) | Resolution::WholeToken(c) | Resolution::Substring(c) => {
                Some(c)
            }
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// One label together with its automatic resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    pub label: String,
    pub resolution: Resolution,
}

/// Tally of how the automatic pass resolved a label set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingStats {
    pub exact: usize,
    pub whole_token: usize,
    pub substring: usize,
    pub unresolved: usize,
}

impl MappingStats {
    pub fn from_mappings(mappings: &[LabelMapping]) -> Self {
        let mut stats = Self::default();
        for mapping in mappings {
            match mapping.resolution {
                Resolution::Exact(_) => stats.exact += 1,
                Resolution::WholeToken(_) => stats.whole_token += 1,
                Resolution::Substring(_) => stats.substring += 1,
                Resolution::Unresolved => stats.unresolved += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.exact + self.whole_token + self.substring + self.unresolved
    }

    pub fn resolved(&self) -> usize {
        self.exact + self.whole_token + self.substring
    }
}

/// Counts from rewriting a record batch with a confirmed mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteCounts {
    /// Records whose label resolved to a category.
    pub rewritten: usize,
    /// Records left with an explicit `null` fabric type.
    pub nulled: usize,
}

/// Canonical form used everywhere labels are compared: trimmed, lowercased.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Collect the distinct normalized labels of a record batch, sorted.
///
/// Records without a string label contribute nothing, and so do labels
/// that normalize to the empty string.
pub fn extract_labels(records: &[ProductRecord]) -> Vec<String> {
    let mut labels: Vec<String> = records
        .iter()
        .filter_map(ProductRecord::fabric_type_str)
        .map(normalize_label)
        .filter(|label| !label.is_empty())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

fn strip_trailing_punctuation(token: &str) -> &str {
    token.trim_end_matches(['.', ',', '!', '?', ';', ':'])
}

/// Resolve a single normalized label through the three-rung ladder.
///
/// The token rung walks the label's tokens left to right and takes the
/// first one that is a known fragment; the substring rung then scans the
/// fragment index in its insertion order.
pub fn auto_map_label(
    label: &str,
    library: &VariantLibrary,
    fragments: &IndexMap<String, String>,
) -> Resolution {
    if let Some(category) = library.lookup(label) {
        return Resolution::Exact(category.to_string());
    }

    for token in label.split_whitespace() {
        if let Some(category) = fragments.get(strip_trailing_punctuation(token)) {
            return Resolution::WholeToken(category.clone());
        }
    }

    for (fragment, category) in fragments {
        if label.contains(fragment.as_str()) {
            return Resolution::Substring(category.clone());
        }
    }

    Resolution::Unresolved
}

/// Run the ladder over every label, preserving the input order.
pub fn auto_map_all(
    labels: &[String],
    library: &VariantLibrary,
    fragments: &IndexMap<String, String>,
) -> Vec<LabelMapping> {
    labels
        .iter()
        .map(|label| LabelMapping {
            label: label.clone(),
            resolution: auto_map_label(label, library, fragments),
        })
        .collect()
}

/// Rewrite every record's label through the confirmed mapping.
///
/// Mapped labels become their category string; everything else, including
/// records that never had a usable label, becomes an explicit `null` so
/// downstream consumers can rely on the field being present.
pub fn rewrite_records(
    records: &mut [ProductRecord],
    mapping: &IndexMap<String, Option<String>>,
) -> RewriteCounts {
    let mut counts = RewriteCounts::default();
    for record in records.iter_mut() {
        let category = record
            .fabric_type_str()
            .map(normalize_label)
            .and_then(|label| mapping.get(&label).cloned().flatten());
        match category {
            Some(category) => {
                record.set_fabric_type(Some(category));
                counts.rewritten += 1;
            }
            None => {
                record.set_fabric_type(None);
                counts.nulled += 1;
            }
        }
    }
    counts
}
