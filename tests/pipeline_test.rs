//! End-to-end reconciliation tests.
//!
//! Drive the propose -> review -> apply loop against real files in a
//! temp directory, standing in for the human with a rewritten workbook.

use std::path::{Path, PathBuf};

use fabric_map::pipeline::{self, ReconcileContext};
use fabric_map::review;
use fabric_map::FabricMapError;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn write_records(path: &Path) {
    std::fs::write(
        path,
        r#"[
            {"description": "classic shirting", "fabric_type": " 100% Cotton Poplin ", "gsm": 110},
            {"description": "drapey tee fabric", "fabric_type": "Slub Jersey"},
            {"description": "unknown weave", "fabric_type": "Mystery Cloth"},
            {"description": "no label at all", "fabric_type": null}
        ]"#,
    )
    .expect("Failed to write records");
}

fn write_mainlib(path: &Path) {
    std::fs::write(path, r#"{"woven_poplin": ["100% cotton poplin"]}"#)
        .expect("Failed to write mainlib");
}

fn write_mappinglib(path: &Path) {
    std::fs::write(
        path,
        r#"{
            "fabric_types": {
                "woven": ["woven_poplin", "woven_twill"],
                "knit": ["knit_jersey"]
            },
            "all_fabric_types": ["woven_poplin", "woven_twill", "knit_jersey"]
        }"#,
    )
    .expect("Failed to write mappingLib");
}

fn context(dir: &Path) -> ReconcileContext {
    ReconcileContext {
        input: dir.join("batch.json"),
        workbook: dir.join("mapping_batch.xlsx"),
        library_path: dir.join("mainlib.json"),
        catalog_path: dir.join("mappingLib.json"),
        output: dir.join("Cleanedbatch.json"),
        verbose: false,
    }
}

fn seed(dir: &Path) -> ReconcileContext {
    let ctx = context(dir);
    write_records(&ctx.input);
    write_mainlib(&ctx.library_path);
    write_mappinglib(&ctx.catalog_path);
    ctx
}

/// Stand in for the reviewer: rewrite the workbook with these rows.
fn write_reviewed(path: &Path, rows: &[(&str, Option<&str>)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write(0, 0, "fabric_type").unwrap();
    sheet.write(0, 1, "combined").unwrap();
    for (i, (label, category)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write(row, 0, *label).unwrap();
        if let Some(category) = category {
            sheet.write(row, 1, *category).unwrap();
        }
    }
    workbook.save(path).expect("Failed to write reviewed workbook");
}

/// Propose auto-maps through the ladder and leaves the rest blank.
#[test]
fn test_propose_writes_prefilled_review_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    let summary = pipeline::propose(&ctx).expect("propose failed");
    assert_eq!(summary.records, 4);
    assert_eq!(summary.labels, 3);
    assert_eq!(summary.stats.exact, 1);
    assert_eq!(summary.stats.whole_token, 1);
    assert_eq!(summary.stats.unresolved, 1);

    let table = review::read_review_workbook(&ctx.workbook).expect("workbook unreadable");
    assert_eq!(
        table.get("100% cotton poplin"),
        Some(&Some("woven_poplin".to_string()))
    );
    assert_eq!(
        table.get("slub jersey"),
        Some(&Some("knit_jersey".to_string()))
    );
    assert_eq!(table.get("mystery cloth"), Some(&None));
}

/// Same inputs, same proposal.
#[test]
fn test_propose_is_deterministic() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("first propose failed");
    let first = review::read_review_workbook(&ctx.workbook).unwrap();

    let mut second_ctx = ctx.clone();
    second_ctx.workbook = dir.path().join("mapping_again.xlsx");
    pipeline::propose(&second_ctx).expect("second propose failed");
    let second = review::read_review_workbook(&second_ctx.workbook).unwrap();

    assert_eq!(first, second);
}

/// The full loop: propose, reviewer fills the blank, apply.
#[test]
fn test_apply_updates_libraries_and_rewrites_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("propose failed");
    write_reviewed(
        &ctx.workbook,
        &[
            ("100% cotton poplin", Some("woven_poplin")),
            ("slub jersey", Some("knit_jersey")),
            ("mystery cloth", Some("woven_dobby")),
        ],
    );

    let summary = pipeline::apply(&ctx).expect("apply failed");
    assert_eq!(summary.fold.mapped_rows, 3);
    assert_eq!(summary.fold.catalog_update.woven, vec!["woven_dobby"]);
    assert_eq!(summary.rewrite.rewritten, 3);
    assert_eq!(summary.rewrite.nulled, 1);

    // Rewritten batch: canonical categories, explicit null, fields intact.
    let output: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.output).unwrap()).unwrap();
    assert_eq!(output[0]["fabric_type"], "woven_poplin");
    assert_eq!(output[0]["description"], "classic shirting");
    assert_eq!(output[0]["gsm"], 110);
    assert_eq!(output[1]["fabric_type"], "knit_jersey");
    assert_eq!(output[2]["fabric_type"], "woven_dobby");
    assert_eq!(output[3]["fabric_type"], serde_json::Value::Null);

    // Libraries learned the confirmed mappings.
    let mainlib: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.library_path).unwrap()).unwrap();
    assert_eq!(mainlib["knit_jersey"][0], "slub jersey");
    assert_eq!(mainlib["woven_dobby"][0], "mystery cloth");

    let catalog: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.catalog_path).unwrap()).unwrap();
    let woven: Vec<&str> = catalog["fabric_types"]["woven"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(woven.contains(&"woven_dobby"));
    let flat = catalog["all_fabric_types"].as_array().unwrap();
    assert!(flat.iter().any(|v| v == "woven_dobby"));
}

/// Applying the same reviewed sheet again changes nothing on disk.
#[test]
fn test_apply_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("propose failed");
    write_reviewed(
        &ctx.workbook,
        &[
            ("100% cotton poplin", Some("woven_poplin")),
            ("slub jersey", Some("knit_jersey")),
            ("mystery cloth", Some("woven_dobby")),
        ],
    );

    pipeline::apply(&ctx).expect("first apply failed");
    let mainlib_before = std::fs::read_to_string(&ctx.library_path).unwrap();
    let catalog_before = std::fs::read_to_string(&ctx.catalog_path).unwrap();
    let output_before = std::fs::read_to_string(&ctx.output).unwrap();

    let second = pipeline::apply(&ctx).expect("second apply failed");
    assert_eq!(second.fold.variants_added, 0);
    assert!(second.fold.catalog_update.is_empty());
    assert_eq!(std::fs::read_to_string(&ctx.library_path).unwrap(), mainlib_before);
    assert_eq!(std::fs::read_to_string(&ctx.catalog_path).unwrap(), catalog_before);
    assert_eq!(std::fs::read_to_string(&ctx.output).unwrap(), output_before);
}

/// A category without a group prefix lands in the flat list only.
#[test]
fn test_unprefixed_category_stays_out_of_the_groups() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("propose failed");
    write_reviewed(&ctx.workbook, &[("mystery cloth", Some("double_knit"))]);

    // "double_knit" starts with neither prefix even though it mentions knit.
    let summary = pipeline::apply(&ctx).expect("apply failed");
    assert_eq!(
        summary.fold.catalog_update.unprefixed,
        vec!["double_knit"]
    );

    let catalog: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.catalog_path).unwrap()).unwrap();
    assert!(catalog["all_fabric_types"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "double_knit"));
    assert!(!catalog["fabric_types"]["knit"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "double_knit"));
}

/// Blank review rows leave their labels unmapped, never "nan"-mapped.
#[test]
fn test_blank_review_rows_null_their_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("propose failed");
    write_reviewed(
        &ctx.workbook,
        &[
            ("100% cotton poplin", Some("woven_poplin")),
            ("slub jersey", None),
            ("mystery cloth", None),
        ],
    );

    let summary = pipeline::apply(&ctx).expect("apply failed");
    assert_eq!(summary.fold.unmapped_rows, 2);
    assert_eq!(summary.rewrite.nulled, 3);

    let output: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.output).unwrap()).unwrap();
    assert_eq!(output[1]["fabric_type"], serde_json::Value::Null);
    assert_eq!(output[2]["fabric_type"], serde_json::Value::Null);
}

/// A malformed library aborts apply before anything is written.
#[test]
fn test_malformed_library_fails_before_any_write() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = seed(dir.path());

    pipeline::propose(&ctx).expect("propose failed");
    write_reviewed(&ctx.workbook, &[("mystery cloth", Some("woven_dobby"))]);

    std::fs::write(&ctx.library_path, "{broken").unwrap();
    let catalog_before = std::fs::read_to_string(&ctx.catalog_path).unwrap();

    let err = pipeline::apply(&ctx).unwrap_err();
    assert!(matches!(err, FabricMapError::MalformedLibrary(_)));
    assert_eq!(
        std::fs::read_to_string(&ctx.catalog_path).unwrap(),
        catalog_before
    );
    assert!(!ctx.output.exists());
}

/// No catalog file: exact matches still work, fragments are simply off.
#[test]
fn test_missing_catalog_degrades_to_exact_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = context(dir.path());
    write_records(&ctx.input);
    write_mainlib(&ctx.library_path);

    let summary = pipeline::propose(&ctx).expect("propose failed");
    assert_eq!(summary.stats.exact, 1);
    assert_eq!(summary.stats.whole_token, 0);
    assert_eq!(summary.stats.substring, 0);
    assert_eq!(summary.stats.unresolved, 2);
}

/// Missing knowledge bases entirely: first run starts from empty state.
#[test]
fn test_first_run_with_no_libraries() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = context(dir.path());
    write_records(&ctx.input);

    let summary = pipeline::propose(&ctx).expect("propose failed");
    assert_eq!(summary.stats.resolved(), 0);
    assert_eq!(summary.stats.unresolved, 3);

    write_reviewed(&ctx.workbook, &[("mystery cloth", Some("woven_dobby"))]);
    pipeline::apply(&ctx).expect("apply failed");

    // Both libraries now exist with the learned entries.
    assert!(ctx.library_path.exists());
    assert!(ctx.catalog_path.exists());
    let catalog: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ctx.catalog_path).unwrap()).unwrap();
    assert_eq!(catalog["all_fabric_types"][0], "woven_dobby");
}

/// A missing input batch is a hard error, not an empty run.
#[test]
fn test_missing_batch_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = context(dir.path());

    let err = pipeline::propose(&ctx).unwrap_err();
    assert!(matches!(err, FabricMapError::FileNotFound(_)));
}

/// Context paths derive from the input stem by default.
#[test]
fn test_default_artifact_naming() {
    let input = PathBuf::from("/data/RawVLLMFabricdepot.json");
    assert_eq!(
        review::default_workbook_path(&input),
        PathBuf::from("/data/mapping_RawVLLMFabricdepot.xlsx")
    );
    assert_eq!(
        fabric_map::records::cleaned_path(&input),
        PathBuf::from("/data/CleanedRawVLLMFabricdepot.json")
    );
}
