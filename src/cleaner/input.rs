//! Source batch loading for the cleaning stage.
//!
//! Scrape exports arrive as a JSON array of product objects, as the
//! scrapers' CSV export, or as a spreadsheet, the latter two with
//! `Description` / `Details` columns. All load into the same
//! [`SourceRecord`] rows; records with an empty description are dropped
//! with a warning since they can neither be cleaned nor resumed.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use crate::cleaner::types::SourceRecord;
use crate::error::{FabricMapError, Result};
use crate::review::cell_text;

/// Load source records, dispatching on the file extension.
pub fn load_sources(path: &Path) -> Result<Vec<SourceRecord>> {
    if !path.exists() {
        return Err(FabricMapError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let records = match extension.as_str() {
        "xlsx" | "xlsm" => load_excel(path)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => {
            return Err(FabricMapError::InputFormat(format!(
                "{}: unsupported input extension '{}', expected .json, .csv or .xlsx",
                path.display(),
                other
            )))
        }
    };

    let total = records.len();
    let records: Vec<SourceRecord> = records
        .into_iter()
        .filter(|r| !r.description.trim().is_empty())
        .collect();
    let dropped = total - records.len();
    if dropped > 0 {
        eprintln!("⚠️  {} records without a description were skipped", dropped);
    }
    Ok(records)
}

fn load_json(path: &Path) -> Result<Vec<SourceRecord>> {
    let file = File::open(path)?;
    let records: Vec<SourceRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| FabricMapError::InputFormat(format!("{}: {}", path.display(), e)))?;
    Ok(records)
}

/// Read the scrapers' CSV export. Same column rules as the Excel path:
/// a `Description` column is required, `Details` is optional and read as
/// a stringified object. Ragged rows are tolerated.
fn load_csv(path: &Path) -> Result<Vec<SourceRecord>> {
    let bad = |msg: String| FabricMapError::InputFormat(format!("{}: {}", path.display(), msg));

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| bad(e.to_string()))?;
    let headers = reader.headers().map_err(|e| bad(e.to_string()))?.clone();
    let find_column = |name: &str| {
        headers
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(name))
    };
    let description_col = find_column("description")
        .ok_or_else(|| bad("no 'Description' column in the header row".to_string()))?;
    let details_col = find_column("details");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| bad(e.to_string()))?;
        let description = row.get(description_col).unwrap_or("").trim().to_string();
        let details = details_col
            .and_then(|col| row.get(col))
            .filter(|text| !text.trim().is_empty())
            .map(|text| serde_json::Value::String(text.to_string()));
        records.push(SourceRecord {
            description,
            details,
        });
    }
    Ok(records)
}

/// Read the first sheet. The header row must contain a `Description`
/// column; a `Details` column is optional and read as a stringified
/// object.
fn load_excel(path: &Path) -> Result<Vec<SourceRecord>> {
    let bad = |msg: String| FabricMapError::InputFormat(format!("{}: {}", path.display(), msg));

    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: calamine::XlsxError| bad(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| bad("workbook has no sheets".to_string()))?
        .map_err(|e| bad(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| bad("sheet is empty".to_string()))?;
    let find_column = |name: &str| {
        header
            .iter()
            .position(|cell| cell_text(Some(cell)).trim().eq_ignore_ascii_case(name))
    };
    let description_col = find_column("description")
        .ok_or_else(|| bad("no 'Description' column in the header row".to_string()))?;
    let details_col = find_column("details");

    let records = rows
        .map(|row| {
            let description = cell_text(row.get(description_col)).trim().to_string();
            let details = details_col
                .map(|col| cell_text(row.get(col)))
                .filter(|text| !text.trim().is_empty())
                .map(serde_json::Value::String);
            SourceRecord {
                description,
                details,
            }
        })
        .collect();
    Ok(records)
}
