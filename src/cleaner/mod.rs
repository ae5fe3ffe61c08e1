//! Scrape-output cleaning stage.
//!
//! Turns raw scraped product rows into structured fabric records:
//! - extract `material` / `fabric_type` / `gsm` / `end_use` / `features`
//!   from the description with the chat model
//! - prefer the scraper's `Details` block over model output where both
//!   exist
//! - infer season / use case / occasion tags from keyword tables
//! - optionally generate shopper Q&A pairs per fabric
//!
//! The output file is rewritten after every fabric, and a rerun skips
//! fabrics whose description is already in the output, so an interrupted
//! batch resumes where it stopped.

mod client;
mod input;
mod parser;
mod prompts;
mod tags;
mod types;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

pub use client::ChatClient;
pub use input::load_sources;
pub use tags::{infer_tags, InferredTags};
pub use types::{CleanedRecord, FabricMetadata, Gsm, QaPair, SourceRecord};

use crate::config::Config;
use crate::error::{FabricMapError, Result};

/// Weight words recognized when no numeric GSM is available, scanned in
/// this order.
const WEIGHT_DESCRIPTORS: &[&str] = &[
    "lightweight",
    "light",
    "medium",
    "midweight",
    "heavy",
    "heavyweight",
];

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Also generate shopper Q&A pairs (one extra model call per fabric).
    pub with_qa: bool,
    /// Stop after this many source rows, for smoke runs on a new site.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CleanSummary {
    pub cleaned: usize,
    pub skipped: usize,
    /// Fabrics where the model call failed and only `Details` data was used.
    pub extraction_failures: usize,
    pub output: PathBuf,
}

/// Default cleaned-output path: `<model>_<stem>.json` next to the input,
/// with the model's tag stripped (`qwen3:14b` -> `qwen3`).
pub fn default_output_path(input: &Path, model: &str) -> PathBuf {
    let prefix = model.split(':').next().unwrap_or(model);
    let prefix: String = prefix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}_{}.json", prefix, stem))
}

/// Clean a source batch end to end.
pub async fn run(config: &Config, options: &CleanOptions) -> Result<CleanSummary> {
    let started = chrono::Local::now();
    println!("🚀 Started at {}", started.format("%Y-%m-%d %H:%M:%S"));

    let sources = load_sources(&options.input)?;
    println!(
        "📖 {} source records from {}",
        sources.len(),
        options.input.display()
    );

    let mut cleaned = load_resume(&options.output)?;
    let done: HashSet<String> = cleaned.iter().map(|r| r.description.clone()).collect();
    if !cleaned.is_empty() {
        println!("🔁 Resuming: {} fabrics already cleaned", cleaned.len());
    }

    let client = ChatClient::new(config)?;
    println!(
        "🧵 Cleaning with {} at {}{}",
        client.model(),
        config.endpoint,
        if options.with_qa { " (with Q&A)" } else { "" }
    );

    let total = options
        .limit
        .map_or(sources.len(), |limit| sources.len().min(limit));
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut summary = CleanSummary {
        cleaned: 0,
        skipped: 0,
        extraction_failures: 0,
        output: options.output.clone(),
    };

    for source in sources.iter().take(total) {
        if done.contains(&source.description) {
            summary.skipped += 1;
            pb.inc(1);
            continue;
        }
        pb.set_message(source.description.chars().take(40).collect::<String>());

        let (record, extraction_ok) = clean_one(&client, source, options.with_qa, &pb).await;
        if !extraction_ok {
            summary.extraction_failures += 1;
        }
        cleaned.push(record);
        // Checkpoint after every fabric; a crash loses at most one.
        save_checkpoint(&options.output, &cleaned)?;
        summary.cleaned += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let elapsed = chrono::Local::now().signed_duration_since(started);
    println!(
        "🎉 {} fabrics cleaned, {} already done, saved to {} ({}m {}s)",
        summary.cleaned,
        summary.skipped,
        options.output.display(),
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    );
    if summary.extraction_failures > 0 {
        eprintln!(
            "⚠️  {} fabrics fell back to Details-only metadata",
            summary.extraction_failures
        );
    }
    Ok(summary)
}

async fn clean_one(
    client: &ChatClient,
    source: &SourceRecord,
    with_qa: bool,
    pb: &ProgressBar,
) -> (CleanedRecord, bool) {
    let metadata = match extract_metadata(client, &source.description).await {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            pb.println(format!("❌ Metadata extraction failed: {}", e));
            None
        }
    };
    let extraction_ok = metadata.is_some();
    let mut record = merge_record(source, metadata.unwrap_or_default());

    if with_qa {
        let pairs = match generate_qa(client, &record).await {
            Ok(pairs) => pairs,
            Err(e) => {
                pb.println(format!("❌ Q&A generation failed: {}", e));
                Vec::new()
            }
        };
        record.qa_pairs = Some(pairs);
    }
    (record, extraction_ok)
}

async fn extract_metadata(client: &ChatClient, description: &str) -> Result<FabricMetadata> {
    let prompt = prompts::build_metadata_prompt(description);
    let response = client.chat(prompts::METADATA_SYSTEM, &prompt).await?;
    parser::parse_metadata_response(&response)
}

async fn generate_qa(client: &ChatClient, record: &CleanedRecord) -> Result<Vec<QaPair>> {
    let metadata = json!({
        "description": record.description,
        "material": record.material,
        "fabric_type": record.fabric_type,
        "end_use": record.end_use,
        "features": record.features,
    });
    let prompt = prompts::build_qa_prompt(&serde_json::to_string_pretty(&metadata)?);
    let response = client.chat(prompts::QA_SYSTEM, &prompt).await?;
    parser::parse_qa_response(&response)
}

/// Combine the scraper's `Details` block with the model's metadata.
/// Scraped fields win; the model fills the gaps.
fn merge_record(source: &SourceRecord, metadata: FabricMetadata) -> CleanedRecord {
    let details = source.details_map();
    let detail = |key: &str| {
        details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let material = detail("Material")
        .or_else(|| {
            detail("Content").and_then(|content| {
                let line = content.lines().next().unwrap_or("").trim().to_string();
                (!line.is_empty()).then_some(line)
            })
        })
        .or(metadata.material);

    let fabric_type = detail("Fabric Type").or(metadata.fabric_type);

    let gsm = detail("Weight")
        .or_else(|| detail("Industry Weight"))
        .and_then(|weight| parse_gsm(&weight))
        .map(Gsm::Grams)
        .or(metadata.gsm.map(Gsm::Grams))
        .or_else(|| {
            weight_descriptor(&source.description).map(|word| Gsm::Descriptor(word.to_string()))
        });

    let tags = infer_tags(&metadata.features, &metadata.end_use);

    CleanedRecord {
        description: source.description.clone(),
        material,
        fabric_type,
        gsm,
        end_use: metadata.end_use,
        features: metadata.features,
        season: tags.season,
        use_case: tags.use_case,
        occasion: tags.occasion,
        qa_pairs: None,
    }
}

/// Numeric GSM from a weight cell like `"293-306gsm / 8.6-9oz"`: take the
/// part before any `/`, then before any range dash, then its digits.
fn parse_gsm(weight: &str) -> Option<u32> {
    let part = weight.split('/').next().unwrap_or(weight);
    let part = part.split('-').next().unwrap_or(part);
    let digits: String = part.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn weight_descriptor(description: &str) -> Option<&'static str> {
    let lower = description.to_lowercase();
    WEIGHT_DESCRIPTORS
        .iter()
        .find(|word| lower.contains(*word))
        .copied()
}

fn load_resume(path: &Path) -> Result<Vec<CleanedRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let records = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        FabricMapError::InputFormat(format!(
            "{}: existing output could not be parsed: {}",
            path.display(),
            e
        ))
    })?;
    Ok(records)
}

fn save_checkpoint(path: &Path, records: &[CleanedRecord]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}
