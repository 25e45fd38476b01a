//! Invoice candidate index
//!
//! A naive scan compares every bank transaction with every invoice, which is
//! O(bank × invoices) and only reasonable for ledgers in the low thousands.
//! The index is built once per run and bounds each lookup to the invoices
//! that can possibly qualify: the same account number in exact-key mode, or
//! an issue date inside the tolerance window in fuzzy mode.
//!
//! Lookups return invoice positions in ascending ledger order, so a
//! first-match scan over the candidates picks the same invoice a full scan
//! would.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::types::TaxInvoice;

#[derive(Debug, Clone, Default)]
pub struct InvoiceIndex {
    by_account: HashMap<String, Vec<usize>>,
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    len: usize,
}

impl InvoiceIndex {
    pub fn build(invoices: &[TaxInvoice]) -> Self {
        let mut index = InvoiceIndex {
            len: invoices.len(),
            ..Default::default()
        };

        for (position, invoice) in invoices.iter().enumerate() {
            if !invoice.account_number.is_empty() {
                index
                    .by_account
                    .entry(invoice.account_number.clone())
                    .or_default()
                    .push(position);
            }
            index
                .by_date
                .entry(invoice.issue_date)
                .or_default()
                .push(position);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Invoices settled against `account_number`; empty numbers have none
    pub fn by_account(&self, account_number: &str) -> &[usize] {
        if account_number.is_empty() {
            return &[];
        }
        self.by_account
            .get(account_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Invoices issued within `tolerance_days` of `date`, inclusive
    pub fn within_days(&self, date: NaiveDate, tolerance_days: i64) -> Vec<usize> {
        let (from, to) = match Duration::try_days(tolerance_days.max(0)) {
            Some(window) => (
                date.checked_sub_signed(window).unwrap_or(NaiveDate::MIN),
                date.checked_add_signed(window).unwrap_or(NaiveDate::MAX),
            ),
            None => (NaiveDate::MIN, NaiveDate::MAX),
        };

        let mut positions: Vec<usize> = self
            .by_date
            .range(from..=to)
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions
    }
}
