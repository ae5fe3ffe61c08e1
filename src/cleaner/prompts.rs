//! Prompt templates for metadata extraction and Q&A generation.
//!
//! The `/no_think` marker suppresses qwen's reasoning preamble; other
//! models ignore it.

pub const METADATA_SYSTEM: &str =
    "You are a fabric analysis assistant that returns structured data only in JSON.";

pub const QA_SYSTEM: &str = "You generate user questions from structured fabric metadata.";

pub fn build_metadata_prompt(description: &str) -> String {
    format!(
        r#"You are a textile domain expert and data cleaner.

You will receive unstructured fabric product data that includes a title, URL, technical description block, and image URLs.

Your task is to extract and standardize the following fields:

1. `material`: the fiber content (e.g., "100% Rayon"). Use the exact phrase from the text.
2. `fabric_type`: the fabric type based on title and description (e.g., "tribal print rayon challis").
3. `gsm`: the weight in grams per square meter as an integer (e.g., 195). Return null if not found.
4. `end_use`: list of applications (e.g., ["blouses", "dresses"]).
5. `features`: list of sensory or physical attributes (e.g., ["soft", "opaque"]).

Respond ONLY in this JSON format:
{{
  "material": "...",
  "fabric_type": "...",
  "gsm": 195,
  "end_use": ["...", "..."],
  "features": ["...", "..."]
}}

Text:
"""{description}"""

/no_think
"#
    )
}

pub fn build_qa_prompt(metadata_json: &str) -> String {
    format!(
        r#"You are a creative assistant helping fabric shoppers understand fabric characteristics.

From the metadata below, generate 10 question-and-answer (Q&A) pairs in English.

Each question should be a realistic user query that might lead to selecting this fabric.
Each answer should:
- Avoid copying terms directly (e.g., instead of "soft", say "gentle on the skin")
- Describe how the fabric feels, behaves, or could be used, naturally and creatively
- Be helpful, informative, and approachable
- Include everyday examples like summer tops, comfy dresses, cool nights, lounging, layering, etc.

Do NOT include numeric specs like GSM or fiber percentages.

Return a list like this:
[
  {{ "question": "...", "answer": "..." }},
  ...
]

Metadata:
{metadata_json}

/no_think
"#
    )
}
