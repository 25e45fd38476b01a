//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Matching one bank transaction never depends on
//! another, so the bank ledger is split into batches that are matched in
//! parallel against a shared invoice index.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── load_table × 2 (both ledgers loaded concurrently)
//!     ├── Reconciler::normalize
//!     ├── spawn_blocking per batch → MatchingEngine::classify_all
//!     │       └── Arc<InvoiceIndex>, Arc<Vec<TaxInvoice>> shared read-only
//!     └── Reconciler::finish (aggregation on the reassembled results)
//! ```
//!
//! # Ordering
//!
//! Batches are awaited in submission order, so the reassembled MatchResult
//! sequence is in bank ledger order regardless of which worker finishes first.

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

use crate::core::{CancelToken, InvoiceIndex, Ledgers, Reconciler};
use crate::io::async_reader::load_table;
use crate::strategy::ProcessingStrategy;
use crate::types::{LedgerSource, MatchResult, Reconciliation, ReconError};

/// Configuration for batch processing
///
/// Controls how bank transactions are batched and how many batches are
/// matched at the same time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of bank transactions per batch
    pub batch_size: usize,
    /// Maximum number of batches matching concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size,
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches,
                default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of bank transactions per batch (default: 1000)
/// - `max_concurrent_batches`: Number of worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Match `ledgers.bank` in parallel batches, preserving input order
    async fn match_in_batches(
        &self,
        reconciler: &Reconciler,
        ledgers: Ledgers,
        cancel: &CancelToken,
    ) -> Result<(Ledgers, Vec<MatchResult>), ReconError> {
        let Ledgers {
            bank,
            invoices,
            rejected,
        } = ledgers;

        let engine = reconciler.engine();
        let index = Arc::new(InvoiceIndex::build(&invoices));
        let invoices = Arc::new(invoices);

        let batch_size = self.config.batch_size.max(1);
        tracing::debug!(
            batches = bank.len().div_ceil(batch_size),
            batch_size,
            "Matching in batches"
        );

        let mut batches = stream::iter(bank.chunks(batch_size))
            .map(|batch| {
                let batch = batch.to_vec();
                let engine = Arc::clone(&engine);
                let index = Arc::clone(&index);
                let invoices = Arc::clone(&invoices);
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || {
                    engine.classify_all(&batch, &invoices, &index, &cancel)
                })
            })
            .buffered(self.config.max_concurrent_batches.max(1));

        let mut results = Vec::with_capacity(bank.len());
        while let Some(joined) = batches.next().await {
            let batch = joined
                .map_err(|e| ReconError::runtime(format!("Matching worker failed: {}", e)))??;
            results.extend(batch);
        }
        drop(batches);

        let invoices = Arc::try_unwrap(invoices).unwrap_or_else(|shared| shared.as_ref().clone());

        Ok((
            Ledgers {
                bank,
                invoices,
                rejected,
            },
            results,
        ))
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    #[instrument(
        name = "async_strategy",
        skip_all,
        fields(batch_size = self.config.batch_size, workers = self.config.max_concurrent_batches)
    )]
    fn process(
        &self,
        bank_path: &Path,
        invoice_path: &Path,
        reconciler: &Reconciler,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, ReconError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches.max(1))
            .max_blocking_threads(self.config.max_concurrent_batches.max(2))
            .build()
            .map_err(|e| ReconError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let (bank, invoices) = futures::try_join!(
                load_table(bank_path, LedgerSource::Bank),
                load_table(invoice_path, LedgerSource::Invoice),
            )?;

            let ledgers = reconciler.normalize(&bank, &invoices)?;
            let (ledgers, results) = self.match_in_batches(reconciler, ledgers, cancel).await?;

            Ok(reconciler.finish(ledgers, results))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconSettings;
    use crate::strategy::SyncProcessingStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn bank_csv(rows: usize) -> String {
        let mut csv = String::from(
            "transaction_date,own_account_id,own_account_number,counterparty_account_number,counterparty_name,amount\n",
        );
        for i in 0..rows {
            csv.push_str(&format!(
                "2024-01-{:02},A,111,9{},Vendor{},{}\n",
                i % 28 + 1,
                i,
                i % 7,
                (i as i64 + 1) * 1000 * if i % 3 == 0 { -1 } else { 1 }
            ));
        }
        csv
    }

    fn invoice_csv(rows: usize) -> String {
        let mut csv =
            String::from("issue_date,account_number,item_description,supply_amount,total_amount\n");
        for i in 0..rows {
            csv.push_str(&format!(
                "2024-01-{:02},111,Vendor{},0,{}\n",
                (i * 2) % 28 + 1,
                i % 7,
                (i as i64 + 1) * 1000
            ));
        }
        csv
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(ReconSettings::default()).unwrap()
    }

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config, BatchConfig::default());
    }

    #[test]
    fn test_async_strategy_matches_sync_across_batches() {
        let bank = create_temp_csv(&bank_csv(50));
        let invoices = create_temp_csv(&invoice_csv(30));
        let reconciler = reconciler();

        let sync_run = SyncProcessingStrategy
            .process(bank.path(), invoices.path(), &reconciler, &CancelToken::new())
            .unwrap();

        // Use a small batch size to force many batches
        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(3, 4));
        let async_run = strategy
            .process(bank.path(), invoices.path(), &reconciler, &CancelToken::new())
            .unwrap();

        assert_eq!(async_run, sync_run);
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let invoices = create_temp_csv(&invoice_csv(1));
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());

        let result = strategy.process(
            Path::new("nonexistent.csv"),
            invoices.path(),
            &reconciler(),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(ReconError::FileNotFound { .. })));
    }

    #[test]
    fn test_async_strategy_cancelled() {
        let bank = create_temp_csv(&bank_csv(10));
        let invoices = create_temp_csv(&invoice_csv(10));
        let cancel = CancelToken::new();
        cancel.cancel();

        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 2));
        let result = strategy.process(bank.path(), invoices.path(), &reconciler(), &cancel);
        assert_eq!(result, Err(ReconError::Cancelled));
    }

    #[test]
    fn test_async_strategy_empty_bank() {
        let bank = create_temp_csv(&bank_csv(0));
        let invoices = create_temp_csv(&invoice_csv(2));

        let run = AsyncProcessingStrategy::new(BatchConfig::default())
            .process(bank.path(), invoices.path(), &reconciler(), &CancelToken::new())
            .unwrap();

        assert!(run.results.is_empty());
        assert_eq!(run.report.unmatched_count, 2);
    }
}
