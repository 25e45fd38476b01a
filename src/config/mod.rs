//! Run configuration
//!
//! Settings are resolved in three layers, later layers winning:
//! built-in defaults, an optional TOML profile, then command-line flags.
//!
//! ```toml
//! schema = "korean-name-ledger"
//!
//! [matching]
//! mode = "fuzzy"
//! date_tolerance_days = 3
//! amount_tolerance = 1000
//! self_identity_markers = ["홍길동"]
//! high_value_threshold = 1000000
//!
//! [report]
//! top_n = 5
//! counterparty_scope = "unmatched"
//! ```

pub mod matching;
pub mod report;
pub mod schema;

pub use matching::{AmountBasis, CandidatePolicy, IdentityRule, MatchConfig, MatchMode};
pub use report::{CounterpartyScope, ReportOptions};
pub use schema::{BankColumns, InvoiceColumns, LedgerSchema, SchemaPreset};

use serde::Deserialize;
use std::path::Path;

use crate::types::ReconError;

/// What to do with rows that fail to load or normalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Report them and reconcile the remaining rows
    #[default]
    Skip,
    /// Fail the run if any row was rejected
    Abort,
}

/// TOML profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconProfile {
    /// Built-in column schema, ignored when `columns` is present
    pub schema: SchemaPreset,
    /// Explicit column schema
    pub columns: Option<LedgerSchema>,
    pub matching: MatchConfig,
    pub report: ReportOptions,
}

impl ReconProfile {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        toml::from_str(input).map_err(|e| ReconError::Profile {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        if !path.exists() {
            return Err(ReconError::file_not_found(path));
        }
        let input = std::fs::read_to_string(path)?;
        Self::from_toml(&input)
    }

    pub fn into_settings(self) -> ReconSettings {
        ReconSettings {
            schema: self.columns.unwrap_or_else(|| self.schema.schema()),
            matching: self.matching,
            report: self.report,
            row_policy: RowPolicy::default(),
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconSettings {
    pub schema: LedgerSchema,
    pub matching: MatchConfig,
    pub report: ReportOptions,
    pub row_policy: RowPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_profile_is_all_defaults() {
        let profile = ReconProfile::from_toml("").unwrap();
        assert_eq!(profile, ReconProfile::default());
        assert_eq!(profile.into_settings(), ReconSettings::default());
    }

    #[test]
    fn test_profile_sections() {
        let profile = ReconProfile::from_toml(
            r#"
            schema = "korean-name-ledger"

            [matching]
            date_tolerance_days = 5
            self_identity_markers = ["홍길동"]
            high_value_threshold = 1000000

            [report]
            top_n = 3
            counterparty_scope = "unmatched"
            "#,
        )
        .unwrap();

        let settings = profile.into_settings();
        assert_eq!(settings.schema, SchemaPreset::KoreanNameLedger.schema());
        assert_eq!(settings.matching.date_tolerance_days, 5);
        assert_eq!(
            settings.matching.high_value_threshold,
            Some(Decimal::from(1_000_000))
        );
        assert_eq!(settings.report.top_n, 3);
        assert_eq!(settings.report.counterparty_scope, CounterpartyScope::Unmatched);
    }

    #[test]
    fn test_explicit_columns_override_preset() {
        let profile = ReconProfile::from_toml(
            r#"
            schema = "korean-account-ledger"

            [columns.bank]
            transaction_date = "date"
            counterparty_name = "name"
            amount = "amt"

            [columns.invoice]
            issue_date = "date"
            total_amount = "total"
            "#,
        )
        .unwrap();

        let settings = profile.into_settings();
        assert_eq!(settings.schema.bank.amount, "amt");
        assert_eq!(settings.schema.invoice.item_description, None);
    }

    #[test]
    fn test_unknown_key_is_profile_error() {
        let err = ReconProfile::from_toml("[matching]\ntolerance = 3\n").unwrap_err();
        assert!(matches!(err, ReconError::Profile { .. }));
    }

    #[test]
    fn test_missing_profile_file() {
        let err = ReconProfile::load(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ReconError::FileNotFound { .. }));
    }
}
