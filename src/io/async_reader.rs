//! Asynchronous ledger reader
//!
//! Provides an async counterpart to the synchronous reader so both ledgers can
//! be loaded concurrently.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for file access, wrapped with tokio-util's compat layer
//! - a blocking worker for spreadsheets, since calamine is synchronous

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::path::{Path, PathBuf};

use crate::io::csv_format::convert_csv_fields;
use crate::io::xlsx_reader::read_spreadsheet;
use crate::io::LedgerFormat;
use crate::types::{LedgerSource, RawTable, ReconError};

/// Asynchronous CSV reader
///
/// Reads a CSV stream into a raw table, record by record.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncReader<R>,
    ledger: LedgerSource,
}

impl<R: AsyncRead + Unpin + Send> AsyncReader<R> {
    pub fn new(reader: R, ledger: LedgerSource) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_reader(reader);

        Self { csv_reader, ledger }
    }

    /// Read every remaining record
    ///
    /// Records that cannot be decoded are kept in `RawTable::rejected`.
    pub async fn read_table(mut self) -> Result<RawTable, ReconError> {
        let headers = self
            .csv_reader
            .headers()
            .await
            .map_err(|e| ReconError::ParseError {
                line: None,
                message: e.to_string(),
            })?
            .iter()
            .map(str::to_string)
            .collect();
        let mut table = RawTable::new(headers);

        let mut records = self.csv_reader.records();
        while let Some(record) = records.next().await {
            match record {
                Ok(record) => table.push_row(convert_csv_fields(record.iter())),
                Err(e) => {
                    let row = table.next_row();
                    table.rejected.push(ReconError::malformed_record(
                        self.ledger,
                        row,
                        format!("CSV parse error: {}", e),
                    ));
                }
            }
        }

        Ok(table)
    }
}

/// Load one ledger file without blocking the runtime
pub async fn load_table(path: &Path, ledger: LedgerSource) -> Result<RawTable, ReconError> {
    let table = match LedgerFormat::from_path(path) {
        LedgerFormat::Csv => {
            let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReconError::file_not_found(path),
                _ => ReconError::from(e),
            })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            AsyncReader::new(compat_file, ledger).read_table().await?
        }
        LedgerFormat::Spreadsheet => {
            let owned: PathBuf = path.to_path_buf();
            tokio::task::spawn_blocking(move || read_spreadsheet(&owned))
                .await
                .map_err(|e| ReconError::runtime(format!("Spreadsheet reader failed: {}", e)))??
        }
    };

    tracing::debug!(
        %ledger,
        path = %path.display(),
        rows = table.rows.len(),
        rejected = table.rejected.len(),
        "Loaded ledger"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCell;
    use futures::io::Cursor;

    #[tokio::test]
    async fn test_async_reader_read_table() {
        let csv_content = "issue_date, total_amount\n2024-01-10, 500500 \n2024-01-11,\n";
        let reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()), LedgerSource::Invoice);

        let table = reader.read_table().await.unwrap();
        assert_eq!(table.headers, vec!["issue_date", "total_amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cell(1), &RawCell::Text("500500".to_string()));
        assert_eq!(table.rows[1].cell(1), &RawCell::Empty);
        assert_eq!(table.rows[1].row, 2);
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let reader = AsyncReader::new(Cursor::new("a,b\n".as_bytes()), LedgerSource::Bank);

        let table = reader.read_table().await.unwrap();
        assert!(table.rows.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_matches_sync_reader() {
        let csv_content = "name,amount\nKim,1\n Park ,2\nLee,\n";
        let async_table = AsyncReader::new(Cursor::new(csv_content.as_bytes()), LedgerSource::Bank)
            .read_table()
            .await
            .unwrap();
        let sync_table =
            crate::io::csv_format::read_csv_table(csv_content.as_bytes(), LedgerSource::Bank)
                .unwrap();

        assert_eq!(async_table, sync_table);
    }

    #[tokio::test]
    async fn test_load_table_missing_file() {
        let result = load_table(Path::new("nonexistent.csv"), LedgerSource::Bank).await;
        assert!(matches!(result, Err(ReconError::FileNotFound { .. })));
    }
}
