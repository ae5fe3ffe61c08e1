//! Excel review surface for the human mapping gate.
//!
//! The propose step writes one row per distinct label with the auto-mapped
//! category prefilled; a reviewer fills the blanks (or corrects rows) in
//! any spreadsheet tool, and the apply step reads the sheet back. A blank
//! category cell means "leave unmapped".

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use indexmap::IndexMap;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{FabricMapError, Result};
use crate::mapper::LabelMapping;

/// Column headers, matching what reviewers already know from the
/// hand-maintained sheets this tool replaced.
pub const LABEL_HEADER: &str = "fabric_type";
pub const CATEGORY_HEADER: &str = "combined";

/// Review workbook path for an input batch: `mapping_<stem>.xlsx` next to
/// the batch file.
pub fn default_workbook_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("mapping_{}.xlsx", stem))
}

/// Write the proposal sheet: bold headers, one row per label, category
/// cell prefilled where the automatic pass resolved it.
pub fn write_review_workbook(path: &Path, mappings: &[LabelMapping]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let excel = |e: rust_xlsxwriter::XlsxError| {
        FabricMapError::ExcelWrite(format!("{}: {}", path.display(), e))
    };

    sheet
        .write_string_with_format(0, 0, LABEL_HEADER, &bold)
        .map_err(excel)?;
    sheet
        .write_string_with_format(0, 1, CATEGORY_HEADER, &bold)
        .map_err(excel)?;
    sheet.set_column_width(0, 42).map_err(excel)?;
    sheet.set_column_width(1, 30).map_err(excel)?;

    for (i, mapping) in mappings.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &mapping.label).map_err(excel)?;
        if let Some(category) = mapping.resolution.category() {
            sheet.write_string(row, 1, category).map_err(excel)?;
        }
    }

    workbook.save(path).map_err(excel)?;
    Ok(())
}

/// Read a reviewed sheet back into a label -> category table.
///
/// Reads the first worksheet, expects the proposal headers in row one, and
/// normalizes both columns. Rows with an empty label cell are skipped;
/// an empty category cell becomes `None`; a label appearing twice keeps
/// the last row's category, like a reviewer overwriting an earlier line.
pub fn read_review_workbook(path: &Path) -> Result<IndexMap<String, Option<String>>> {
    if !path.exists() {
        return Err(FabricMapError::FileNotFound(path.display().to_string()));
    }

    let bad = |msg: String| FabricMapError::ReviewRead(format!("{}: {}", path.display(), msg));

    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: calamine::XlsxError| bad(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| bad("workbook has no sheets".to_string()))?
        .map_err(|e| bad(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| bad("sheet is empty".to_string()))?;
    let label_header = cell_text(header.first());
    if !label_header.trim().eq_ignore_ascii_case(LABEL_HEADER) {
        return Err(bad(format!(
            "expected '{}' in the first column header, found '{}'",
            LABEL_HEADER, label_header
        )));
    }

    let mut table = IndexMap::new();
    for row in rows {
        let label = cell_text(row.first()).trim().to_lowercase();
        if label.is_empty() {
            continue;
        }
        let category = cell_text(row.get(1)).trim().to_lowercase();
        let category = if category.is_empty() { None } else { Some(category) };
        table.insert(label, category);
    }
    Ok(table)
}

/// Best-effort text of a cell. Reviewers occasionally retype a category by
/// hand, so numeric and boolean cells are rendered rather than rejected.
pub(crate) fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
