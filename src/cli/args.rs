use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::config::{
    AmountBasis, CandidatePolicy, CounterpartyScope, IdentityRule, MatchMode, ReconProfile,
    ReconSettings, RowPolicy, SchemaPreset,
};
use crate::strategy::BatchConfig;
use crate::types::ReconError;

/// Reconcile a bank ledger against a tax-invoice ledger
#[derive(Parser, Debug)]
#[command(name = "ghost-ledger-recon")]
#[command(
    about = "Reconcile a bank ledger against a tax-invoice ledger and flag uncorroborated transactions",
    long_about = None
)]
pub struct CliArgs {
    /// Bank ledger (CSV or spreadsheet)
    #[arg(value_name = "BANK", help = "Path to the bank ledger (.csv, .xlsx, .xls, .xlsb, .ods)")]
    pub bank_file: PathBuf,

    /// Invoice ledger (CSV or spreadsheet)
    #[arg(value_name = "INVOICES", help = "Path to the tax-invoice ledger (.csv, .xlsx, .xls, .xlsb, .ods)")]
    pub invoice_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for parallel batch matching"
    )]
    pub strategy: StrategyType,

    /// TOML profile with schema, matching and report settings
    #[arg(long = "profile", value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Built-in column schema (overrides the profile)
    #[arg(long = "schema", value_name = "PRESET")]
    pub schema: Option<SchemaPreset>,

    #[arg(long = "mode", value_name = "MODE", help = "Matching mode")]
    pub mode: Option<MatchMode>,

    #[arg(long = "date-tolerance", value_name = "DAYS", allow_negative_numbers = true)]
    pub date_tolerance_days: Option<i64>,

    #[arg(long = "amount-tolerance", value_name = "AMOUNT", allow_negative_numbers = true)]
    pub amount_tolerance: Option<Decimal>,

    /// Exact-key amount epsilon
    #[arg(long = "epsilon", value_name = "AMOUNT")]
    pub exact_epsilon: Option<Decimal>,

    #[arg(long = "policy", value_name = "POLICY", help = "Which qualifying invoice wins")]
    pub candidate_policy: Option<CandidatePolicy>,

    #[arg(long = "amount-basis", value_name = "BASIS")]
    pub amount_basis: Option<AmountBasis>,

    #[arg(long = "identity-rule", value_name = "RULE")]
    pub identity_rule: Option<IdentityRule>,

    /// Account-holder marker; repeat for several (replaces the profile's list)
    #[arg(long = "self-marker", value_name = "MARKER")]
    pub self_markers: Vec<String>,

    /// Flag self-transfers whose absolute amount reaches this value
    #[arg(long = "high-value-threshold", value_name = "AMOUNT", allow_negative_numbers = true)]
    pub high_value_threshold: Option<Decimal>,

    #[arg(long = "top-n", value_name = "N")]
    pub top_n: Option<usize>,

    #[arg(long = "scope", value_name = "SCOPE", help = "Results ranked in top counterparties")]
    pub counterparty_scope: Option<CounterpartyScope>,

    /// Fail the run if any row is rejected
    #[arg(long = "strict")]
    pub strict: bool,

    /// Write the results CSV here instead of stdout
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the aggregate report as JSON
    #[arg(long = "summary", value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Number of bank transactions per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of bank transactions per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent batches (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of batches matching concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Resolve run settings: defaults, then `--profile`, then flags
    ///
    /// The result is not validated here; `Reconciler::new` does that before
    /// any ledger is read.
    pub fn to_settings(&self) -> Result<ReconSettings, ReconError> {
        let mut profile = match &self.profile {
            Some(path) => ReconProfile::load(path)?,
            None => ReconProfile::default(),
        };

        if let Some(schema) = self.schema {
            profile.schema = schema;
            profile.columns = None;
        }

        let matching = &mut profile.matching;
        if let Some(mode) = self.mode {
            matching.mode = mode;
        }
        if let Some(days) = self.date_tolerance_days {
            matching.date_tolerance_days = days;
        }
        if let Some(amount) = self.amount_tolerance {
            matching.amount_tolerance = amount;
        }
        if let Some(epsilon) = self.exact_epsilon {
            matching.exact_epsilon = epsilon;
        }
        if let Some(policy) = self.candidate_policy {
            matching.candidate_policy = policy;
        }
        if let Some(basis) = self.amount_basis {
            matching.amount_basis = basis;
        }
        if let Some(rule) = self.identity_rule {
            matching.identity_rule = rule;
        }
        if !self.self_markers.is_empty() {
            matching.self_identity_markers = self.self_markers.clone();
        }
        if let Some(threshold) = self.high_value_threshold {
            matching.high_value_threshold = Some(threshold);
        }

        if let Some(top_n) = self.top_n {
            profile.report.top_n = top_n;
        }
        if let Some(scope) = self.counterparty_scope {
            profile.report.counterparty_scope = scope;
        }

        let mut settings = profile.into_settings();
        if self.strict {
            settings.row_policy = RowPolicy::Abort;
        }
        Ok(settings)
    }
}
