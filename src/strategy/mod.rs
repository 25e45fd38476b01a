//! Processing strategy module for ledger reconciliation
//!
//! This module defines the Strategy pattern for complete reconciliation
//! pipelines, covering both ledger loading and matching. This allows different
//! processing implementations (synchronous, asynchronous batch) to be selected
//! at runtime. Every strategy must produce the same `Reconciliation` for the
//! same inputs.

use std::path::Path;

use crate::cli::StrategyType;
use crate::core::{CancelToken, Reconciler};
use crate::types::{Reconciliation, ReconError};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete reconciliation pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Load both ledgers and reconcile them
    ///
    /// # Arguments
    ///
    /// * `bank_path` - Bank ledger file (CSV or spreadsheet)
    /// * `invoice_path` - Invoice ledger file (CSV or spreadsheet)
    /// * `reconciler` - Validated settings for this run
    /// * `cancel` - Cooperative cancellation token
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A ledger file cannot be opened or its header cannot be read
    /// - A mapped column is missing from a header
    /// - Rows were rejected under `RowPolicy::Abort`
    /// - The run was cancelled or a worker failed
    ///
    /// Rows rejected under `RowPolicy::Skip` are not errors; they are returned
    /// in `Reconciliation::rejected`.
    fn process(
        &self,
        bank_path: &Path,
        invoice_path: &Path,
        reconciler: &Reconciler,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, ReconError>;
}

/// Build the pipeline selected on the command line
///
/// `config` only applies to the async strategy; `None` means
/// `BatchConfig::default()`.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
