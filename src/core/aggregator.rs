//! Aggregates over one run's match results
//!
//! Everything here is a pure function of its inputs. Groupings keep
//! first-encounter order and rankings use a stable sort, so the same results
//! always produce the same report.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

use crate::config::{CounterpartyScope, ReportOptions};
use crate::core::identity::SelfIdentity;
use crate::types::{AggregateReport, CounterpartyTotal, MatchResult, TaxInvoice};

/// Build the aggregate report for `results` against the invoice ledger
///
/// `invoices` must be the ledger the results were matched against; matched
/// invoices are correlated back to it by position.
#[instrument(skip_all, fields(results = results.len(), invoices = invoices.len()))]
pub fn aggregate(
    results: &[MatchResult],
    invoices: &[TaxInvoice],
    options: &ReportOptions,
    identity: &SelfIdentity,
) -> AggregateReport {
    let (unmatched_count, unmatched_total_amount) = unclaimed_invoices(results, invoices);
    let matched_transaction_count = results.iter().filter(|r| r.is_matched()).count();

    let report = AggregateReport {
        unmatched_count,
        unmatched_total_amount,
        matched_transaction_count,
        unmatched_transaction_count: results.len() - matched_transaction_count,
        top_counterparties: top_counterparties(results, options, identity),
        suspicious_transfers: suspicious_transfers(results),
    };

    tracing::debug!(
        unmatched_invoices = report.unmatched_count,
        counterparties = report.top_counterparties.len(),
        suspicious = report.suspicious_transfers.len(),
        "Aggregation complete"
    );

    report
}

/// Count and absolute total of invoices no matched transaction claimed
pub fn unclaimed_invoices(results: &[MatchResult], invoices: &[TaxInvoice]) -> (usize, Decimal) {
    let mut claimed = vec![false; invoices.len()];
    for position in results.iter().filter_map(|r| r.matched_invoice_position) {
        if let Some(slot) = claimed.get_mut(position) {
            *slot = true;
        }
    }

    invoices
        .iter()
        .zip(claimed)
        .filter(|&(_, is_claimed)| !is_claimed)
        .fold((0, Decimal::ZERO), |(count, total), (invoice, _)| {
            (count + 1, total + invoice.total_amount.abs())
        })
}

/// Counterparties ranked by absolute volume, account holder excluded
///
/// Ties keep the order in which the names were first seen.
pub fn top_counterparties(
    results: &[MatchResult],
    options: &ReportOptions,
    identity: &SelfIdentity,
) -> Vec<CounterpartyTotal> {
    let mut totals: Vec<CounterpartyTotal> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    let in_scope = results.iter().filter(|r| match options.counterparty_scope {
        CounterpartyScope::All => true,
        CounterpartyScope::Unmatched => !r.is_matched(),
    });

    for result in in_scope {
        let transaction = &result.source_transaction;
        if identity.is_account_holder(transaction) {
            continue;
        }

        let amount = transaction.amount.abs();
        match slots.get(transaction.counterparty_name.as_str()) {
            Some(&slot) => {
                let entry = &mut totals[slot];
                entry.total_amount += amount;
                entry.transaction_count += 1;
            }
            None => {
                slots.insert(&transaction.counterparty_name, totals.len());
                totals.push(CounterpartyTotal {
                    name: transaction.counterparty_name.clone(),
                    total_amount: amount,
                    transaction_count: 1,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    totals.truncate(options.top_n);
    totals
}

/// Flagged results in their original order
pub fn suspicious_transfers(results: &[MatchResult]) -> Vec<MatchResult> {
    results.iter().filter(|r| r.is_flagged()).cloned().collect()
}
