//! Core traits for invoice matching
//!
//! The matching engine is agnostic of how corroboration is decided; it asks an
//! [`InvoiceMatcher`] for candidates and verdicts and applies the configured
//! candidate policy on top. Exact-key and fuzzy matching are the two
//! implementations and are selected from configuration at run time.

use rust_decimal::Decimal;
use std::fmt::Debug;

use crate::core::index::InvoiceIndex;
use crate::types::{BankTransaction, TaxInvoice};

/// How far a corroborating invoice is from a transaction
///
/// Ordered by amount distance first, then day distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchDistance {
    pub amount: Decimal,
    pub days: i64,
}

/// Trait for deciding whether an invoice corroborates a bank transaction
///
/// Implementations must be pure: the same pair always yields the same verdict,
/// which is what lets the engine split a run across workers.
pub trait InvoiceMatcher: Send + Sync + Debug {
    /// Invoice positions worth testing, in ascending ledger order
    fn candidates(&self, transaction: &BankTransaction, index: &InvoiceIndex) -> Vec<usize>;

    /// Whether `invoice` corroborates `transaction`
    fn corroborates(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> bool;

    /// Distance used to rank corroborating invoices
    fn distance(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> MatchDistance;
}
