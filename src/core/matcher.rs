//! Exact-key and fuzzy invoice matchers

use rust_decimal::Decimal;

use crate::config::{AmountBasis, MatchConfig, MatchMode};
use crate::core::index::InvoiceIndex;
use crate::core::traits::{InvoiceMatcher, MatchDistance};
use crate::types::{BankTransaction, TaxInvoice};

fn day_distance(transaction: &BankTransaction, invoice: &TaxInvoice) -> i64 {
    (transaction.transaction_date - invoice.issue_date)
        .num_days()
        .abs()
}

/// Either name contains the other; empty names never overlap
pub fn names_overlap(counterparty_name: &str, item_description: &str) -> bool {
    let name = counterparty_name.trim();
    let item = item_description.trim();
    if name.is_empty() || item.is_empty() {
        return false;
    }
    name.contains(item) || item.contains(name)
}

/// Account-number join with a near-exact supply amount
///
/// Used when both ledgers carry a reliable account number.
#[derive(Debug, Clone)]
pub struct ExactKeyMatcher {
    /// Amount distance must be strictly below this
    pub epsilon: Decimal,
}

impl InvoiceMatcher for ExactKeyMatcher {
    fn candidates(&self, transaction: &BankTransaction, index: &InvoiceIndex) -> Vec<usize> {
        index.by_account(&transaction.own_account_number).to_vec()
    }

    fn corroborates(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> bool {
        if transaction.amount.is_zero() || transaction.own_account_number.is_empty() {
            return false;
        }
        invoice.account_number == transaction.own_account_number
            && (invoice.supply_amount - transaction.amount.abs()).abs() < self.epsilon
    }

    fn distance(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> MatchDistance {
        MatchDistance {
            amount: (invoice.supply_amount - transaction.amount.abs()).abs(),
            days: day_distance(transaction, invoice),
        }
    }
}

/// Name containment within date and amount windows
///
/// Used when the ledgers share no join key.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pub date_tolerance_days: i64,
    pub amount_tolerance: Decimal,
    pub amount_basis: AmountBasis,
}

impl FuzzyMatcher {
    fn compared_amount(&self, transaction: &BankTransaction) -> Decimal {
        match self.amount_basis {
            AmountBasis::Magnitude => transaction.amount.abs(),
            AmountBasis::Signed => transaction.amount,
        }
    }
}

impl InvoiceMatcher for FuzzyMatcher {
    fn candidates(&self, transaction: &BankTransaction, index: &InvoiceIndex) -> Vec<usize> {
        index.within_days(transaction.transaction_date, self.date_tolerance_days)
    }

    fn corroborates(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> bool {
        !transaction.amount.is_zero()
            && names_overlap(&transaction.counterparty_name, &invoice.item_description)
            && day_distance(transaction, invoice) <= self.date_tolerance_days
            && (self.compared_amount(transaction) - invoice.total_amount).abs()
                <= self.amount_tolerance
    }

    fn distance(&self, transaction: &BankTransaction, invoice: &TaxInvoice) -> MatchDistance {
        MatchDistance {
            amount: (self.compared_amount(transaction) - invoice.total_amount).abs(),
            days: day_distance(transaction, invoice),
        }
    }
}

/// Build the matcher selected by `config.mode`
pub fn matcher_for(config: &MatchConfig) -> Box<dyn InvoiceMatcher> {
    match config.mode {
        MatchMode::ExactKey => Box::new(ExactKeyMatcher {
            epsilon: config.exact_epsilon,
        }),
        MatchMode::Fuzzy => Box::new(FuzzyMatcher {
            date_tolerance_days: config.date_tolerance_days,
            amount_tolerance: config.amount_tolerance,
            amount_basis: config.amount_basis,
        }),
    }
}
