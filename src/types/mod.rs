//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: canonical bank transactions and tax invoices
//! - `raw`: loosely-typed tabular input produced by the readers
//! - `outcome`: match results and aggregate reports
//! - `error`: error types for the reconciliation engine

pub mod error;
pub mod outcome;
pub mod raw;
pub mod record;

pub use error::{LedgerSource, ReconError};
pub use outcome::{
    AggregateReport, CounterpartyTotal, MatchResult, MatchStatus, Reconciliation, SuspicionFlag,
};
pub use raw::{RawCell, RawRow, RawTable};
pub use record::{BankTransaction, TaxInvoice};
