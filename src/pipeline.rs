//! Reconciliation pipeline with an explicit human gate.
//!
//! The run is split into two halves so the review can happen out of
//! process, hours or days later:
//! - [`propose`]: load everything, auto-map the labels, write the review
//!   workbook, stop
//! - [`apply`]: read the reviewed workbook, fold confirmed mappings into
//!   the knowledge bases, persist them, rewrite the record batch
//!
//! `apply` reloads all inputs itself, so the two halves can run in
//! separate invocations. All parsing happens before any file is written;
//! a malformed input aborts the run with the libraries untouched.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::Result;
use crate::library::{CatalogUpdate, CategoryCatalog, VariantLibrary};
use crate::mapper::{
    auto_map_all, extract_labels, rewrite_records, MappingStats, Resolution, RewriteCounts,
};
use crate::records::{load_batch, save_batch};
use crate::review::{read_review_workbook, write_review_workbook};

/// File locations for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    /// Record batch to reconcile (JSON array).
    pub input: PathBuf,
    /// Review workbook written by `propose` and read by `apply`.
    pub workbook: PathBuf,
    /// Variant library file (`mainlib.json`).
    pub library_path: PathBuf,
    /// Category catalog file (`mappingLib.json`).
    pub catalog_path: PathBuf,
    /// Rewritten batch destination.
    pub output: PathBuf,
    /// Print per-label resolutions during `propose`.
    pub verbose: bool,
}

/// What `propose` produced.
#[derive(Debug, Clone)]
pub struct ProposeSummary {
    pub records: usize,
    pub labels: usize,
    pub stats: MappingStats,
    pub workbook: PathBuf,
}

/// What folding a review table changed in the knowledge bases.
#[derive(Debug, Clone, Default)]
pub struct FoldOutcome {
    pub mapped_rows: usize,
    pub unmapped_rows: usize,
    pub variants_added: usize,
    pub catalog_update: CatalogUpdate,
}

/// What `apply` changed end to end.
#[derive(Debug, Clone)]
pub struct ApplySummary {
    pub fold: FoldOutcome,
    pub rewrite: RewriteCounts,
    pub output: PathBuf,
}

/// First half: auto-map the batch's labels and write the review sheet.
pub fn propose(ctx: &ReconcileContext) -> Result<ProposeSummary> {
    let records = load_batch(&ctx.input)?;
    println!(
        "📖 Loaded {} records from {}",
        records.len(),
        ctx.input.display()
    );

    let (library, catalog) = load_knowledge_bases(ctx)?;

    let labels = extract_labels(&records);
    println!("🏷️  {} distinct fabric type labels", labels.len());

    let fragments = catalog.fragment_index();
    let mappings = auto_map_all(&labels, &library, &fragments);
    let stats = MappingStats::from_mappings(&mappings);
    println!(
        "🔎 Auto-mapped {}/{} labels ({} exact, {} token, {} substring)",
        stats.resolved(),
        stats.total(),
        stats.exact,
        stats.whole_token,
        stats.substring
    );

    if ctx.verbose {
        for mapping in &mappings {
            match &mapping.resolution {
                Resolution::Exact(c) => println!("   ✔ {} -> {} (exact)", mapping.label, c),
                Resolution::WholeToken(c) => println!("   ✔ {} -> {} (token)", mapping.label, c),
                Resolution::Substring(c) => {
                    println!("   ✔ {} -> {} (substring)", mapping.label, c)
                }
                Resolution::Unresolved => {}
            }
        }
    }
    for mapping in &mappings {
        if !mapping.resolution.is_resolved() {
            println!("   ❓ {}", mapping.label);
        }
    }

    write_review_workbook(&ctx.workbook, &mappings)?;
    println!("📝 Review sheet written to {}", ctx.workbook.display());
    if stats.unresolved > 0 {
        println!(
            "⏸️  {} labels need review. Fill the '{}' column, save, then run apply.",
            stats.unresolved,
            crate::review::CATEGORY_HEADER
        );
    }

    Ok(ProposeSummary {
        records: records.len(),
        labels: labels.len(),
        stats,
        workbook: ctx.workbook.clone(),
    })
}

/// Second half: fold the reviewed sheet into the knowledge bases, persist
/// them, and rewrite the batch.
pub fn apply(ctx: &ReconcileContext) -> Result<ApplySummary> {
    // Parse every input up front so a malformed file cannot leave a
    // half-written library behind.
    let mut records = load_batch(&ctx.input)?;
    let (mut library, mut catalog) = load_knowledge_bases(ctx)?;
    let table = read_review_workbook(&ctx.workbook)?;
    println!(
        "📋 {} reviewed rows from {}",
        table.len(),
        ctx.workbook.display()
    );

    let fold = fold_review(&table, &mut library, &mut catalog);
    report_fold(&fold);

    library.save(&ctx.library_path)?;
    catalog.save(&ctx.catalog_path)?;
    println!(
        "💾 Libraries saved ({} categories, {} catalog entries)",
        library.len(),
        catalog.all_categories().len()
    );

    let rewrite = rewrite_records(&mut records, &table);
    save_batch(&ctx.output, &records)?;
    println!(
        "✅ {} records written to {} ({} categorized, {} null)",
        rewrite.rewritten + rewrite.nulled,
        ctx.output.display(),
        rewrite.rewritten,
        rewrite.nulled
    );

    Ok(ApplySummary {
        fold,
        rewrite,
        output: ctx.output.clone(),
    })
}

/// Fold a reviewed label -> category table into the knowledge bases.
///
/// Every mapped row becomes a variant of its category; categories the
/// catalog has never seen are collected and added in one pass. Blank rows
/// change nothing. Safe to call with the same table twice.
pub fn fold_review(
    table: &IndexMap<String, Option<String>>,
    library: &mut VariantLibrary,
    catalog: &mut CategoryCatalog,
) -> FoldOutcome {
    let mut outcome = FoldOutcome::default();
    let mut new_categories: Vec<String> = Vec::new();

    for (label, category) in table {
        match category {
            Some(category) => {
                outcome.mapped_rows += 1;
                if !catalog.contains_category(category)
                    && !new_categories.iter().any(|c| c == category)
                {
                    new_categories.push(category.clone());
                }
                if library.insert_variant(category, label) {
                    outcome.variants_added += 1;
                }
            }
            None => outcome.unmapped_rows += 1,
        }
    }

    new_categories.sort();
    outcome.catalog_update = catalog.add_categories(&new_categories);
    outcome
}

fn load_knowledge_bases(ctx: &ReconcileContext) -> Result<(VariantLibrary, CategoryCatalog)> {
    if !ctx.library_path.exists() {
        println!(
            "ℹ️  No variant library at {}, starting empty",
            ctx.library_path.display()
        );
    }
    let library = VariantLibrary::load(&ctx.library_path)?;

    let duplicates = library.cross_category_duplicates();
    for (variant, categories) in &duplicates {
        eprintln!(
            "⚠️  Variant '{}' appears under several categories ({}); the first wins",
            variant,
            categories.join(", ")
        );
    }

    let catalog = CategoryCatalog::load(&ctx.catalog_path)?;
    if catalog.is_empty() {
        eprintln!(
            "⚠️  No category catalog at {}; fragment matching is disabled",
            ctx.catalog_path.display()
        );
    } else {
        println!(
            "📚 {} known categories, {} fragments",
            catalog.all_categories().len(),
            catalog.fragment_index().len()
        );
    }
    Ok((library, catalog))
}

fn report_fold(fold: &FoldOutcome) {
    println!(
        "🧶 {} mapped rows, {} left unmapped, {} new variants learned",
        fold.mapped_rows, fold.unmapped_rows, fold.variants_added
    );
    let update = &fold.catalog_update;
    if !update.is_empty() {
        println!("🆕 {} new categories:", update.total());
        for category in &update.woven {
            println!("   + {} (woven)", category);
        }
        for category in &update.knit {
            println!("   + {} (knit)", category);
        }
    }
    for category in &update.unprefixed {
        eprintln!(
            "⚠️  New category '{}' matches neither 'woven_' nor 'knit_'; added to the flat list only",
            category
        );
    }
}
