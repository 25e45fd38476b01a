//! Matching engine
//!
//! This module provides the MatchingEngine that classifies every bank
//! transaction as matched or unmatched against the invoice ledger and raises
//! self-transfer flags.
//!
//! The engine enforces the following rules:
//! - The configuration is validated before any transaction is scanned
//! - Exactly one MatchResult per bank transaction, in input order
//! - Match status and suspicion flag are decided independently
//! - A cancelled run yields an error, never a partial result

use tracing::instrument;

use crate::config::{CandidatePolicy, MatchConfig};
use crate::core::cancel::CancelToken;
use crate::core::identity::SelfIdentity;
use crate::core::index::InvoiceIndex;
use crate::core::matcher::matcher_for;
use crate::core::traits::InvoiceMatcher;
use crate::types::{BankTransaction, MatchResult, ReconError, SuspicionFlag, TaxInvoice};

/// Invoice matching engine
///
/// Holds a validated configuration and the matcher it selects. The engine is
/// immutable and `Send + Sync`, so one instance can classify disjoint slices
/// of the bank ledger on several workers.
#[derive(Debug)]
pub struct MatchingEngine {
    config: MatchConfig,
    matcher: Box<dyn InvoiceMatcher>,
    identity: SelfIdentity,
}

impl MatchingEngine {
    /// Create a new MatchingEngine
    ///
    /// # Errors
    ///
    /// Returns `ReconError::Configuration` if the configuration is invalid
    /// (negative tolerances, flagging without identity markers, etc.).
    pub fn new(config: MatchConfig) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Self {
            matcher: matcher_for(&config),
            identity: SelfIdentity::from_config(&config),
            config,
        })
    }

    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// Classify every bank transaction against the invoice ledger
    ///
    /// # Arguments
    ///
    /// * `bank` - Normalized bank transactions
    /// * `invoices` - Normalized tax invoices
    /// * `cancel` - Checked before each transaction
    ///
    /// # Returns
    ///
    /// One `MatchResult` per transaction, in the order of `bank`
    ///
    /// # Errors
    ///
    /// Returns `ReconError::Cancelled` if the token fires mid-run.
    #[instrument(
        skip_all,
        fields(bank = bank.len(), invoices = invoices.len(), mode = ?self.config.mode)
    )]
    pub fn reconcile(
        &self,
        bank: &[BankTransaction],
        invoices: &[TaxInvoice],
        cancel: &CancelToken,
    ) -> Result<Vec<MatchResult>, ReconError> {
        let index = InvoiceIndex::build(invoices);
        let results = self.classify_all(bank, invoices, &index, cancel)?;

        tracing::debug!(
            matched = results.iter().filter(|r| r.is_matched()).count(),
            flagged = results.iter().filter(|r| r.is_flagged()).count(),
            "Matching complete"
        );

        Ok(results)
    }

    /// Classify a slice of bank transactions against a prebuilt index
    ///
    /// `index` must have been built from `invoices`.
    pub fn classify_all(
        &self,
        bank: &[BankTransaction],
        invoices: &[TaxInvoice],
        index: &InvoiceIndex,
        cancel: &CancelToken,
    ) -> Result<Vec<MatchResult>, ReconError> {
        let mut results = Vec::with_capacity(bank.len());

        for transaction in bank {
            if cancel.is_cancelled() {
                return Err(ReconError::Cancelled);
            }
            results.push(self.classify(transaction, invoices, index));
        }

        Ok(results)
    }

    /// Classify a single bank transaction
    pub fn classify(
        &self,
        transaction: &BankTransaction,
        invoices: &[TaxInvoice],
        index: &InvoiceIndex,
    ) -> MatchResult {
        let flag = self.suspicion_flag(transaction);

        match self.select_invoice(transaction, invoices, index) {
            Some(position) => {
                tracing::trace!(
                    counterparty = %transaction.counterparty_name,
                    position,
                    "Matched"
                );
                MatchResult::matched(
                    transaction.clone(),
                    invoices[position].clone(),
                    position,
                    flag,
                )
            }
            None => {
                tracing::trace!(counterparty = %transaction.counterparty_name, "Unmatched");
                MatchResult::unmatched(transaction.clone(), flag)
            }
        }
    }

    fn select_invoice(
        &self,
        transaction: &BankTransaction,
        invoices: &[TaxInvoice],
        index: &InvoiceIndex,
    ) -> Option<usize> {
        let mut qualifying = self
            .matcher
            .candidates(transaction, index)
            .into_iter()
            .filter(|&position| {
                invoices
                    .get(position)
                    .is_some_and(|invoice| self.matcher.corroborates(transaction, invoice))
            });

        match self.config.candidate_policy {
            CandidatePolicy::FirstMatch => qualifying.next(),
            CandidatePolicy::BestCandidate => qualifying.min_by(|&a, &b| {
                let (left, right) = (&invoices[a], &invoices[b]);
                self.matcher
                    .distance(transaction, left)
                    .cmp(&self.matcher.distance(transaction, right))
                    .then_with(|| left.issue_date.cmp(&right.issue_date))
                    .then_with(|| left.account_number.cmp(&right.account_number))
                    .then_with(|| left.item_description.cmp(&right.item_description))
                    .then_with(|| left.supply_amount.cmp(&right.supply_amount))
                    .then_with(|| left.total_amount.cmp(&right.total_amount))
                    .then_with(|| a.cmp(&b))
            }),
        }
    }

    fn suspicion_flag(&self, transaction: &BankTransaction) -> Option<SuspicionFlag> {
        let threshold = self.config.high_value_threshold?;
        if self.identity.is_account_holder(transaction) && transaction.amount.abs() >= threshold {
            Some(SuspicionFlag::HighValueSelfTransfer)
        } else {
            None
        }
    }
}
