//! Run orchestration
//!
//! The Reconciler owns one run's settings and drives the three stages in
//! order: normalize both ledgers, match every bank transaction, aggregate the
//! results. Processing strategies reuse the individual stages so that the
//! sequential and parallel paths share every rule except how matching is
//! scheduled.

use std::sync::Arc;
use tracing::instrument;

use crate::config::{ReconSettings, RowPolicy};
use crate::core::aggregator::aggregate;
use crate::core::cancel::CancelToken;
use crate::core::engine::MatchingEngine;
use crate::core::normalizer::{normalize_bank, normalize_invoices};
use crate::types::{
    BankTransaction, LedgerSource, MatchResult, RawTable, ReconError, Reconciliation, TaxInvoice,
};

/// Both ledgers after normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledgers {
    pub bank: Vec<BankTransaction>,
    pub invoices: Vec<TaxInvoice>,
    /// Rejected bank rows first, then rejected invoice rows
    pub rejected: Vec<ReconError>,
}

impl Ledgers {
    /// Ledgers built from already-normalized records
    pub fn from_records(bank: Vec<BankTransaction>, invoices: Vec<TaxInvoice>) -> Self {
        Self {
            bank,
            invoices,
            rejected: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Reconciler {
    settings: ReconSettings,
    engine: Arc<MatchingEngine>,
}

impl Reconciler {
    /// Create a Reconciler for one set of settings
    ///
    /// # Errors
    ///
    /// Returns `ReconError::Configuration` if the matching configuration is
    /// invalid. Nothing has been read at that point.
    pub fn new(settings: ReconSettings) -> Result<Self, ReconError> {
        let engine = MatchingEngine::new(settings.matching.clone())?;
        Ok(Self {
            settings,
            engine: Arc::new(engine),
        })
    }

    pub fn settings(&self) -> &ReconSettings {
        &self.settings
    }

    /// Shared handle to the engine for workers
    pub fn engine(&self) -> Arc<MatchingEngine> {
        Arc::clone(&self.engine)
    }

    /// Normalize both ledgers and apply the row policy
    ///
    /// # Errors
    ///
    /// - `MissingColumn` if either header lacks a mapped column
    /// - `MalformedRows` under `RowPolicy::Abort` when any row was rejected
    pub fn normalize(&self, bank: &RawTable, invoices: &RawTable) -> Result<Ledgers, ReconError> {
        let schema = &self.settings.schema;
        let bank = normalize_bank(bank, &schema.bank)?;
        let invoices = normalize_invoices(invoices, &schema.invoice)?;

        for rejected in bank.rejected.iter().chain(&invoices.rejected) {
            tracing::warn!(row = ?rejected.row(), "Rejected row: {}", rejected);
        }

        if self.settings.row_policy == RowPolicy::Abort {
            if !bank.rejected.is_empty() {
                return Err(ReconError::MalformedRows {
                    ledger: LedgerSource::Bank,
                    count: bank.rejected.len(),
                });
            }
            if !invoices.rejected.is_empty() {
                return Err(ReconError::MalformedRows {
                    ledger: LedgerSource::Invoice,
                    count: invoices.rejected.len(),
                });
            }
        }

        if bank.records.is_empty() {
            tracing::info!("Bank ledger has no usable rows; the report will be empty");
        }
        if invoices.records.is_empty() {
            tracing::info!("Invoice ledger has no usable rows; every transaction will be unmatched");
        }

        let mut rejected = bank.rejected;
        rejected.extend(invoices.rejected);

        Ok(Ledgers {
            bank: bank.records,
            invoices: invoices.records,
            rejected,
        })
    }

    /// Aggregate matched results into the final reconciliation
    pub fn finish(&self, ledgers: Ledgers, results: Vec<MatchResult>) -> Reconciliation {
        let report = aggregate(
            &results,
            &ledgers.invoices,
            &self.settings.report,
            self.engine.identity(),
        );

        tracing::info!(
            transactions = results.len(),
            matched = report.matched_transaction_count,
            unmatched_invoices = report.unmatched_count,
            suspicious = report.suspicious_transfers.len(),
            rejected = ledgers.rejected.len(),
            "Reconciliation complete"
        );

        Reconciliation {
            results,
            report,
            rejected: ledgers.rejected,
        }
    }

    /// Match and aggregate already-normalized ledgers on the calling thread
    pub fn reconcile_records(
        &self,
        ledgers: Ledgers,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, ReconError> {
        let results = self
            .engine
            .reconcile(&ledgers.bank, &ledgers.invoices, cancel)?;
        Ok(self.finish(ledgers, results))
    }

    /// Run all three stages on the calling thread
    #[instrument(skip_all, fields(bank_rows = bank.rows.len(), invoice_rows = invoices.rows.len()))]
    pub fn reconcile(
        &self,
        bank: &RawTable,
        invoices: &RawTable,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, ReconError> {
        let ledgers = self.normalize(bank, invoices)?;
        self.reconcile_records(ledgers, cancel)
    }
}
