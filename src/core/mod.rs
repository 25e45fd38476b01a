//! Core reconciliation logic
//!
//! This module contains the reconciliation components, in data-flow order:
//! - `normalizer` - Raw tables to canonical records
//! - `index` - Invoice candidate lookup
//! - `traits` / `matcher` - Exact-key and fuzzy corroboration rules
//! - `identity` - Account-holder recognition
//! - `engine` - Per-transaction classification
//! - `aggregator` - Report over the classified results
//! - `reconciler` - Orchestration of one run

pub mod aggregator;
pub mod cancel;
pub mod engine;
pub mod identity;
pub mod index;
pub mod matcher;
pub mod normalizer;
pub mod reconciler;
pub mod traits;

pub use aggregator::aggregate;
pub use cancel::CancelToken;
pub use engine::MatchingEngine;
pub use identity::SelfIdentity;
pub use index::InvoiceIndex;
pub use matcher::{matcher_for, ExactKeyMatcher, FuzzyMatcher};
pub use normalizer::{normalize_bank, normalize_invoices, Normalized};
pub use reconciler::{Ledgers, Reconciler};
pub use traits::{InvoiceMatcher, MatchDistance};
