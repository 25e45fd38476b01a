//! Raw tabular input
//!
//! Readers for CSV and spreadsheet sources all produce a [`RawTable`]: a header
//! row plus data rows of loosely-typed [`RawCell`]s. The normalizer is the only
//! consumer and the only place where cells are coerced to canonical types.

use crate::types::ReconError;

/// A single cell as it came out of the source
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Blank cell or empty CSV field
    Empty,
    /// Textual cell (every CSV field is text)
    Text(String),
    /// Integral spreadsheet number
    Integer(i64),
    /// Floating spreadsheet number; date cells arrive as 1900-system serials
    Float(f64),
}

impl RawCell {
    /// Build a cell from a CSV field; whitespace-only fields are empty
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::from_text(value)
    }
}

/// One data row with its 1-based position (header excluded)
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row: usize,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    /// Cell at `column`, or [`RawCell::Empty`] for short rows
    pub fn cell(&self, column: usize) -> &RawCell {
        const EMPTY: &RawCell = &RawCell::Empty;
        self.cells.get(column).unwrap_or(EMPTY)
    }
}

/// A whole source after reading
///
/// `rejected` holds rows the reader itself could not decode (for example a
/// broken CSV record); they are carried forward so no row disappears silently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub rejected: Vec<ReconError>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Index the next row read from the source will get
    pub fn next_row(&self) -> usize {
        self.rows.len() + self.rejected.len() + 1
    }

    /// Append a row, numbering it after the rows already present
    pub fn push_row(&mut self, cells: Vec<RawCell>) {
        let row = self.next_row();
        self.rows.push(RawRow { row, cells });
    }

    /// Position of a header, compared after trimming
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// Build a table from CSV-like string rows (tests and fixtures)
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| RawCell::from_text(v)).collect());
        }
        table
    }
}
