//! Aggregation options

use serde::Deserialize;

/// Which results feed the counterparty ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CounterpartyScope {
    /// Every non-self transaction
    #[default]
    All,
    /// Only transactions without a corroborating invoice
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    /// Length cap of the counterparty ranking
    pub top_n: usize,
    pub counterparty_scope: CounterpartyScope,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            counterparty_scope: CounterpartyScope::All,
        }
    }
}
