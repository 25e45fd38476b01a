//! I/O module
//!
//! Handles ledger input and reconciliation output.
//!
//! # Components
//!
//! - `csv_format` - CSV record conversion, results CSV and report JSON output
//! - `sync_reader` - Synchronous ledger reader
//! - `async_reader` - Asynchronous ledger reader
//! - `xlsx_reader` - Spreadsheet reader (first worksheet)

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;
pub mod xlsx_reader;

pub use async_reader::{load_table, AsyncReader};
pub use csv_format::{read_csv_table, write_report_json, write_results_csv, RESULT_HEADERS};
pub use sync_reader::SyncReader;
pub use xlsx_reader::read_spreadsheet;

use std::path::Path;

/// Input format of a ledger file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    Csv,
    Spreadsheet,
}

impl LedgerFormat {
    /// Spreadsheet extensions select the spreadsheet reader; anything else is CSV
    pub fn from_path(path: &Path) -> Self {
        let is_spreadsheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                xlsx_reader::SPREADSHEET_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_spreadsheet {
            LedgerFormat::Spreadsheet
        } else {
            LedgerFormat::Csv
        }
    }
}
