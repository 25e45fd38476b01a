//! Synchronous ledger reader
//!
//! Loads a whole ledger file into a [`RawTable`], choosing the CSV or the
//! spreadsheet path from the file extension.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable header or workbook) are returned
//!   from `read_table()`
//! - Individual CSV records that cannot be decoded are kept in
//!   `RawTable::rejected` with their row index

use std::fs::File;
use std::path::Path;

use crate::io::csv_format::read_csv_table;
use crate::io::xlsx_reader::read_spreadsheet;
use crate::io::LedgerFormat;
use crate::types::{LedgerSource, RawTable, ReconError};

/// Synchronous reader for one ledger file
#[derive(Debug, Clone)]
pub struct SyncReader<'a> {
    path: &'a Path,
    ledger: LedgerSource,
}

impl<'a> SyncReader<'a> {
    pub fn new(path: &'a Path, ledger: LedgerSource) -> Self {
        Self { path, ledger }
    }

    /// Read the whole ledger
    pub fn read_table(&self) -> Result<RawTable, ReconError> {
        let table = match LedgerFormat::from_path(self.path) {
            LedgerFormat::Csv => {
                let file = File::open(self.path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => ReconError::file_not_found(self.path),
                    _ => ReconError::from(e),
                })?;
                read_csv_table(file, self.ledger)?
            }
            LedgerFormat::Spreadsheet => read_spreadsheet(self.path)?,
        };

        tracing::debug!(
            ledger = %self.ledger,
            path = %self.path.display(),
            rows = table.rows.len(),
            rejected = table.rejected.len(),
            "Loaded ledger"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_reads_rows() {
        let file = create_temp_csv(b"transaction_date,amount\n2024-01-10,100\n2024-01-11,\n");

        let table = SyncReader::new(file.path(), LedgerSource::Bank)
            .read_table()
            .unwrap();

        assert_eq!(table.headers, vec!["transaction_date", "amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cell(1), &RawCell::Empty);
    }

    #[test]
    fn test_sync_reader_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"), LedgerSource::Bank).read_table();
        assert!(matches!(result, Err(ReconError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_reader_keeps_undecodable_record() {
        let file = create_temp_csv(b"name,amount\nKim,1\n\xff\xfe,2\nLee,3\n");

        let table = SyncReader::new(file.path(), LedgerSource::Invoice)
            .read_table()
            .unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].row, 3);
        assert_eq!(table.rejected.len(), 1);
        assert_eq!(table.rejected[0].row(), Some(2));
    }
}
