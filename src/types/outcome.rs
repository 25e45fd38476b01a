//! Reconciliation outcomes
//!
//! [`MatchResult`] is produced once per bank transaction by the matching engine,
//! [`AggregateReport`] is derived from the full result sequence by the aggregator.
//! Neither is mutated after creation and neither outlives a single run.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{BankTransaction, ReconError, TaxInvoice};

/// Whether a bank transaction found a corroborating invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Unmatched => "unmatched",
        }
    }
}

/// Risk flags raised independently of match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionFlag {
    /// Counterparty is the account holder and the amount reaches the threshold
    HighValueSelfTransfer,
}

impl SuspicionFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspicionFlag::HighValueSelfTransfer => "high_value_self_transfer",
        }
    }
}

/// Classification of one bank transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The classified transaction
    pub source_transaction: BankTransaction,

    /// Matched iff `matched_invoice` is present
    pub status: MatchStatus,

    /// The corroborating invoice, if any
    pub matched_invoice: Option<TaxInvoice>,

    /// Position of `matched_invoice` in the invoice ledger
    ///
    /// The aggregator uses this identity to find invoices no transaction claimed.
    pub matched_invoice_position: Option<usize>,

    /// Risk flag, orthogonal to `status`
    pub suspicion_flag: Option<SuspicionFlag>,
}

impl MatchResult {
    /// Result for a transaction with a corroborating invoice at `position`
    pub fn matched(
        transaction: BankTransaction,
        invoice: TaxInvoice,
        position: usize,
        suspicion_flag: Option<SuspicionFlag>,
    ) -> Self {
        MatchResult {
            source_transaction: transaction,
            status: MatchStatus::Matched,
            matched_invoice: Some(invoice),
            matched_invoice_position: Some(position),
            suspicion_flag,
        }
    }

    /// Result for a transaction no invoice corroborates
    pub fn unmatched(transaction: BankTransaction, suspicion_flag: Option<SuspicionFlag>) -> Self {
        MatchResult {
            source_transaction: transaction,
            status: MatchStatus::Unmatched,
            matched_invoice: None,
            matched_invoice_position: None,
            suspicion_flag,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    pub fn is_flagged(&self) -> bool {
        self.suspicion_flag.is_some()
    }
}

/// One entry of the counterparty ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyTotal {
    pub name: String,
    /// Sum of absolute transaction amounts
    pub total_amount: Decimal,
    pub transaction_count: usize,
}

/// Derived views over one run's results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Invoices no matched bank transaction claimed
    pub unmatched_count: usize,

    /// Sum of absolute totals of the unclaimed invoices
    pub unmatched_total_amount: Decimal,

    /// Bank transactions with a corroborating invoice
    pub matched_transaction_count: usize,

    /// Bank transactions without one; distinct from `unmatched_count`
    pub unmatched_transaction_count: usize,

    /// At most `top_n` entries, non-increasing by `total_amount`
    pub top_counterparties: Vec<CounterpartyTotal>,

    /// Flagged results in original order
    pub suspicious_transfers: Vec<MatchResult>,
}

/// Everything a run hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// One result per usable bank transaction, in input order
    pub results: Vec<MatchResult>,
    pub report: AggregateReport,
    /// Rows from either ledger that failed to load or normalize
    pub rejected: Vec<ReconError>,
}
