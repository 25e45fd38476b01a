//! Matching configuration
//!
//! [`MatchConfig`] is the full contract of a match: which mode decides
//! corroboration, how wide the date and amount windows are, and how the
//! account holder is recognized for self-transfer flagging. Tolerances are
//! properties of the run, never of individual records.
//!
//! # Match contract
//!
//! - **Exact-key**: `invoice.account_number == txn.own_account_number` and
//!   `| invoice.supply_amount - |txn.amount| | < exact_epsilon`.
//! - **Fuzzy**: counterparty name and invoice item contain one another (either
//!   direction, case-sensitive, trimmed), `|txn.date - invoice.date| <=
//!   date_tolerance_days` and `|amount - invoice.total_amount| <= amount_tolerance`
//!   where `amount` follows [`AmountBasis`] (signed by default).
//! - In both modes a zero transaction amount or an empty name never matches.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::ReconError;

/// How a bank transaction is corroborated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Join on account number, near-exact supply amount
    ExactKey,
    /// Name containment plus date and amount windows
    #[default]
    Fuzzy,
}

/// Which qualifying invoice wins when several qualify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CandidatePolicy {
    /// First qualifying invoice in ledger order
    #[default]
    FirstMatch,
    /// Closest by amount, then date distance, independent of ledger order
    BestCandidate,
}

/// Which transaction figure is compared against the invoice total in fuzzy mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AmountBasis {
    /// The signed amount as booked, so an outflow never meets a positive total
    #[default]
    Signed,
    /// `|amount|`, so outflows can corroborate too
    Magnitude,
}

/// How `self_identity_markers` recognize the account holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityRule {
    /// Counterparty name contains a marker
    #[default]
    NameContains,
    /// Counterparty name equals a marker
    ExactName,
    /// Counterparty account number equals a marker
    AccountNumber,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub mode: MatchMode,
    /// Allowed day distance in fuzzy mode, inclusive
    pub date_tolerance_days: i64,
    /// Allowed amount distance in fuzzy mode, inclusive
    pub amount_tolerance: Decimal,
    /// Exact-key amount distance must be strictly below this
    pub exact_epsilon: Decimal,
    pub candidate_policy: CandidatePolicy,
    pub amount_basis: AmountBasis,
    pub identity_rule: IdentityRule,
    pub self_identity_markers: Vec<String>,
    /// Flag self-transfers whose `|amount|` reaches this; `None` disables flagging
    pub high_value_threshold: Option<Decimal>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Fuzzy,
            date_tolerance_days: 3,
            amount_tolerance: Decimal::from(1000),
            exact_epsilon: Decimal::ONE,
            candidate_policy: CandidatePolicy::FirstMatch,
            amount_basis: AmountBasis::Signed,
            identity_rule: IdentityRule::NameContains,
            self_identity_markers: Vec::new(),
            high_value_threshold: None,
        }
    }
}

impl MatchConfig {
    /// Reject configurations that cannot be applied uniformly to every row
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.date_tolerance_days < 0 {
            return Err(ReconError::configuration(format!(
                "date_tolerance_days must not be negative, got {}",
                self.date_tolerance_days
            )));
        }

        if self.amount_tolerance < Decimal::ZERO {
            return Err(ReconError::configuration(format!(
                "amount_tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }

        if self.exact_epsilon <= Decimal::ZERO {
            return Err(ReconError::configuration(format!(
                "exact_epsilon must be positive, got {}",
                self.exact_epsilon
            )));
        }

        if let Some(marker) = self
            .self_identity_markers
            .iter()
            .find(|m| m.trim().is_empty())
        {
            return Err(ReconError::configuration(format!(
                "self identity marker '{}' is empty",
                marker
            )));
        }

        if let Some(threshold) = self.high_value_threshold {
            if threshold < Decimal::ZERO {
                return Err(ReconError::configuration(format!(
                    "high_value_threshold must not be negative, got {}",
                    threshold
                )));
            }
            if self.self_identity_markers.is_empty() {
                return Err(ReconError::configuration(
                    "self-transfer flagging requested but no self identity markers configured",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case::negative_days(
        MatchConfig { date_tolerance_days: -1, ..MatchConfig::default() },
        "date_tolerance_days"
    )]
    #[case::negative_amount(
        MatchConfig { amount_tolerance: Decimal::from(-5), ..MatchConfig::default() },
        "amount_tolerance"
    )]
    #[case::zero_epsilon(
        MatchConfig { exact_epsilon: Decimal::ZERO, ..MatchConfig::default() },
        "exact_epsilon"
    )]
    #[case::blank_marker(
        MatchConfig { self_identity_markers: vec!["  ".to_string()], ..MatchConfig::default() },
        "is empty"
    )]
    #[case::flagging_without_markers(
        MatchConfig { high_value_threshold: Some(Decimal::from(1_000_000)), ..MatchConfig::default() },
        "no self identity markers"
    )]
    #[case::negative_threshold(
        MatchConfig {
            high_value_threshold: Some(Decimal::from(-1)),
            self_identity_markers: vec!["Hong Gildong".to_string()],
            ..MatchConfig::default()
        },
        "high_value_threshold"
    )]
    fn test_invalid_configurations(#[case] config: MatchConfig, #[case] expected: &str) {
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReconError::Configuration { .. }));
        assert!(err.to_string().contains(expected), "{}", err);
    }

    #[test]
    fn test_zero_tolerances_are_valid() {
        let config = MatchConfig {
            date_tolerance_days: 0,
            amount_tolerance: Decimal::ZERO,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flagging_with_markers_is_valid() {
        let config = MatchConfig {
            self_identity_markers: vec!["홍길동".to_string()],
            high_value_threshold: Some(Decimal::from(1_000_000)),
            ..MatchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: MatchConfig = toml::from_str(
            r#"
            mode = "exact-key"
            amount_tolerance = 250
            candidate_policy = "best-candidate"
            self_identity_markers = ["홍길동"]
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, MatchMode::ExactKey);
        assert_eq!(config.amount_tolerance, Decimal::from(250));
        assert_eq!(config.candidate_policy, CandidatePolicy::BestCandidate);
        assert_eq!(config.date_tolerance_days, 3);
        assert_eq!(config.high_value_threshold, None);
    }
}
