//! Canonical ledger records
//!
//! These are the strongly-typed forms every raw ledger row is normalized into
//! before matching. Both are immutable once built; the engine only ever reads
//! them through shared references.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A single movement on one of the account holder's bank accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankTransaction {
    /// Calendar date the movement was booked
    pub transaction_date: NaiveDate,

    /// Internal identifier of the holder's account
    ///
    /// Falls back to `own_account_number` when the ledger carries no separate id.
    pub own_account_id: String,

    /// Account number of the holder's account (the exact-key join column)
    pub own_account_number: String,

    /// Account number on the other side of the movement
    pub counterparty_account_number: String,

    /// Name of the other party, trimmed, case preserved
    pub counterparty_name: String,

    /// Signed amount; the sign denotes inflow or outflow
    ///
    /// A missing amount normalizes to zero, and zero never matches an invoice.
    pub amount: Decimal,
}

/// A single issued tax invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxInvoice {
    /// Calendar date the invoice was issued
    pub issue_date: NaiveDate,

    /// Account number the invoice is settled against
    pub account_number: String,

    /// Item or description line, trimmed, case preserved
    pub item_description: String,

    /// Supply value before tax (compared in exact-key mode)
    pub supply_amount: Decimal,

    /// Invoice total including tax (compared in fuzzy mode)
    pub total_amount: Decimal,
}
