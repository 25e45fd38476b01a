//! Ghost Ledger Reconciler Library
//! # Overview
//!
//! This library reconciles a bank ledger against a tax-invoice ledger to
//! surface transactions one source records and the other does not, the
//! pattern behind fabricated ("ghost") invoices and undeclared income.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Records, raw tables, outcomes and the error type
//! - [`config`] - Matching configuration, report options, column schemas and TOML profiles
//! - [`core`] - Reconciliation components, in data-flow order:
//!   - [`core::normalizer`] - Raw rows to canonical records
//!   - [`core::engine`] - Per-transaction matching and self-transfer flagging
//!   - [`core::aggregator`] - Unclaimed invoices, counterparty ranking, suspicious transfers
//!   - [`core::reconciler`] - Orchestration of one run
//! - [`io`] - CSV and spreadsheet readers, results and report writers
//! - [`strategy`] - Sync and async processing pipelines
//! - [`cli`] - CLI argument parsing
//!
//! # Matching Modes
//!
//! - **Exact-key**: the invoice account number equals the transaction's own
//!   account number and the supply amount is within an epsilon of the
//!   absolute transaction amount
//! - **Fuzzy**: counterparty name and invoice item contain one another, and
//!   date and amount fall inside configured tolerance windows
//!
//! Either mode can keep the first qualifying invoice in ledger order or the
//! closest one by amount and then date distance.
//!
//! # Example
//!
//! ```
//! use ghost_ledger_recon::config::ReconSettings;
//! use ghost_ledger_recon::core::{CancelToken, Ledgers, Reconciler};
//! use ghost_ledger_recon::types::{BankTransaction, TaxInvoice};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let bank = vec![BankTransaction {
//!     transaction_date: date,
//!     own_account_id: "A".to_string(),
//!     own_account_number: "111".to_string(),
//!     counterparty_account_number: "999".to_string(),
//!     counterparty_name: "Hong Gildong".to_string(),
//!     amount: Decimal::from(500_000),
//! }];
//! let invoices = vec![TaxInvoice {
//!     issue_date: date.succ_opt().unwrap(),
//!     account_number: "111".to_string(),
//!     item_description: "Hong Gildong".to_string(),
//!     supply_amount: Decimal::from(455_000),
//!     total_amount: Decimal::from(500_500),
//! }];
//!
//! let reconciler = Reconciler::new(ReconSettings::default()).unwrap();
//! let run = reconciler
//!     .reconcile_records(Ledgers::from_records(bank, invoices), &CancelToken::new())
//!     .unwrap();
//! assert!(run.results[0].is_matched());
//! assert_eq!(run.report.unmatched_count, 0);
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use config::{MatchConfig, ReconSettings};
pub use self::core::{CancelToken, MatchingEngine, Reconciler};
pub use io::{write_report_json, write_results_csv};
pub use types::{
    AggregateReport, BankTransaction, MatchResult, MatchStatus, ReconError, Reconciliation,
    SuspicionFlag, TaxInvoice,
};
