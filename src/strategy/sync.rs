//! Synchronous processing strategy
//!
//! Loads both ledgers with the `SyncReader` and runs every stage on the
//! calling thread. This is the reference behavior the async strategy must
//! reproduce exactly.

use std::path::Path;
use tracing::instrument;

use crate::core::{CancelToken, Reconciler};
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::{LedgerSource, Reconciliation, ReconError};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ghost_ledger_recon::config::ReconSettings;
/// use ghost_ledger_recon::core::{CancelToken, Reconciler};
/// use ghost_ledger_recon::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let reconciler = Reconciler::new(ReconSettings::default()).expect("valid settings");
/// let run = SyncProcessingStrategy
///     .process(
///         Path::new("bank.csv"),
///         Path::new("invoices.xlsx"),
///         &reconciler,
///         &CancelToken::new(),
///     )
///     .expect("Processing failed");
/// println!("{} unmatched invoices", run.report.unmatched_count);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    #[instrument(name = "sync_strategy", skip_all)]
    fn process(
        &self,
        bank_path: &Path,
        invoice_path: &Path,
        reconciler: &Reconciler,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, ReconError> {
        let bank = SyncReader::new(bank_path, LedgerSource::Bank).read_table()?;
        let invoices = SyncReader::new(invoice_path, LedgerSource::Invoice).read_table()?;

        reconciler.reconcile(&bank, &invoices, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReconSettings, RowPolicy};
    use crate::types::MatchStatus;
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

    const BANK: &str = "transaction_date,own_account_id,own_account_number,counterparty_account_number,counterparty_name,amount\n\
                        2024-01-10,A,111,999,Hong Gildong,500000\n\
                        2024-01-11,A,111,998,Kim,-20000\n";

    const INVOICES: &str = "issue_date,account_number,item_description,supply_amount,total_amount\n\
                            2024-01-12,111,Hong Gildong,455000,500500\n";

    fn reconciler(row_policy: RowPolicy) -> Reconciler {
        Reconciler::new(ReconSettings {
            row_policy,
            ..ReconSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_sync_strategy_reconciles_files() {
        let bank = create_temp_csv(BANK);
        let invoices = create_temp_csv(INVOICES);

        let run = SyncProcessingStrategy
            .process(
                bank.path(),
                invoices.path(),
                &reconciler(RowPolicy::Skip),
                &CancelToken::new(),
            )
            .unwrap();

        let statuses: Vec<_> = run.results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![MatchStatus::Matched, MatchStatus::Unmatched]);
        assert_eq!(run.report.unmatched_count, 0);
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let invoices = create_temp_csv(INVOICES);

        let result = SyncProcessingStrategy.process(
            Path::new("nonexistent.csv"),
            invoices.path(),
            &reconciler(RowPolicy::Skip),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(ReconError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_record() {
        let bank = create_temp_csv(&format!("{}2024-13-45,A,111,999,Lee,100\n", BANK));
        let invoices = create_temp_csv(INVOICES);

        let run = SyncProcessingStrategy
            .process(
                bank.path(),
                invoices.path(),
                &reconciler(RowPolicy::Skip),
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(run.results.len(), 2);
        assert_eq!(run.rejected.len(), 1);
        assert_eq!(run.rejected[0].row(), Some(3));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
