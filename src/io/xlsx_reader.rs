//! Spreadsheet reader (xlsx, xls, xlsb, ods)
//!
//! Reads the first worksheet of a workbook into a [`RawTable`]. The first row
//! is the header; every later row is a data row. Cells keep their spreadsheet
//! type so the normalizer can tell a date serial from an account number.
//!
//! Fully blank rows are skipped but still count toward row numbering, so a
//! rejected row's index matches its position under the sheet's header.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use crate::types::{RawCell, RawRow, RawTable, ReconError};

/// Extensions handled by this reader
pub const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsb", "ods"];

/// Convert a calamine cell to a raw cell
pub fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::from_text(s),
        Data::Float(f) => RawCell::Float(*f),
        Data::Int(n) => RawCell::Integer(*n),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::Error(e) => RawCell::Text(format!("#{:?}", e)),
        // Serial in the 1900 date system; the normalizer converts it
        Data::DateTime(dt) => RawCell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::from_text(s),
    }
}

fn header_text(cell: &Data) -> String {
    match convert_cell(cell) {
        RawCell::Empty => String::new(),
        RawCell::Text(s) => s,
        RawCell::Integer(n) => n.to_string(),
        RawCell::Float(f) => f.to_string(),
    }
}

/// Read the first worksheet of the workbook at `path`
///
/// # Errors
///
/// - `FileNotFound` if `path` does not exist
/// - `Spreadsheet` if the workbook cannot be opened, has no worksheets, or
///   the first worksheet cannot be read
pub fn read_spreadsheet(path: &Path) -> Result<RawTable, ReconError> {
    if !path.exists() {
        return Err(ReconError::file_not_found(path));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| {
        ReconError::spreadsheet(format!("Failed to open '{}': {}", path.display(), e))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReconError::spreadsheet(format!("'{}' contains no sheets", path.display())))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        ReconError::spreadsheet(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(header_text).collect())
        .unwrap_or_default();

    let mut table = RawTable::new(headers);
    for (offset, row) in rows.enumerate() {
        let cells: Vec<RawCell> = row.iter().map(convert_cell).collect();
        // Ranges are dense; blank rows are padding, not records
        if cells.iter().all(RawCell::is_empty) {
            continue;
        }
        table.rows.push(RawRow { row: offset + 1, cells });
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = table.rows.len(),
        "Read spreadsheet"
    );

    Ok(table)
}
