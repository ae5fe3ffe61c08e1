//! Error handling across the file boundaries.

use fabric_map::cleaner;
use fabric_map::library::{CategoryCatalog, VariantLibrary};
use fabric_map::records;
use fabric_map::review;
use fabric_map::FabricMapError;
use std::path::Path;
use tempfile::tempdir;

/// A missing record batch names the file it looked for.
#[test]
fn test_missing_batch_file() {
    let err = records::load_batch(Path::new("/nonexistent/batch_12345.json")).unwrap_err();
    match err {
        FabricMapError::FileNotFound(path) => assert!(path.contains("batch_12345.json")),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

/// Unparsable knowledge bases are fatal for both library shapes.
#[test]
fn test_malformed_knowledge_bases() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mainlib = dir.path().join("mainlib.json");
    std::fs::write(&mainlib, r#"{"woven_poplin": "not a list"}"#).unwrap();
    assert!(matches!(
        VariantLibrary::load(&mainlib).unwrap_err(),
        FabricMapError::MalformedLibrary(_)
    ));

    let mappinglib = dir.path().join("mappingLib.json");
    std::fs::write(&mappinglib, r#"{"all_fabric_types": 7}"#).unwrap();
    assert!(matches!(
        CategoryCatalog::load(&mappinglib).unwrap_err(),
        FabricMapError::MalformedLibrary(_)
    ));
}

/// A batch that is not a JSON array is rejected up front.
#[test]
fn test_non_array_batch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("batch.json");
    std::fs::write(&path, r#"{"fabric_type": "poplin"}"#).unwrap();

    assert!(matches!(
        records::load_batch(&path).unwrap_err(),
        FabricMapError::JsonParse(_)
    ));
}

/// Review sheets missing the expected header are reported per file.
#[test]
fn test_review_sheet_with_wrong_shape() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("reviewed.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write(0, 0, "something else").unwrap();
    workbook.save(&path).unwrap();

    let err = review::read_review_workbook(&path).unwrap_err();
    match err {
        FabricMapError::ReviewRead(msg) => {
            assert!(msg.contains("reviewed.xlsx"));
            assert!(msg.contains("fabric_type"));
        }
        other => panic!("expected ReviewRead, got {other:?}"),
    }
}

/// Cleaner inputs are restricted to the formats scrapers produce.
#[test]
fn test_unsupported_cleaner_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("scrape.parquet");
    std::fs::write(&path, "x").unwrap();

    assert!(matches!(
        cleaner::load_sources(&path).unwrap_err(),
        FabricMapError::InputFormat(_)
    ));
}

/// Display output stays terse and prefixed per variant.
#[test]
fn test_error_display() {
    let errors = vec![
        (
            FabricMapError::FileNotFound("x.json".to_string()),
            "file not found: x.json",
        ),
        (
            FabricMapError::MalformedLibrary("mainlib.json: oops".to_string()),
            "malformed knowledge base: mainlib.json: oops",
        ),
        (
            FabricMapError::ChatCall("connection refused".to_string()),
            "chat endpoint error: connection refused",
        ),
        (
            FabricMapError::InputFormat("bad extension".to_string()),
            "unsupported input: bad extension",
        ),
    ];
    for (err, expected) in errors {
        assert_eq!(err.to_string(), expected);
    }
}
