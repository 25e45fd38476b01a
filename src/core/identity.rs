//! Account-holder recognition
//!
//! Decides whether a transaction's counterparty is the account holder. The
//! predicate is configured by an [`IdentityRule`] plus marker strings and is
//! shared by the engine (self-transfer flagging) and the aggregator
//! (excluding the holder from the counterparty ranking).

use crate::config::{IdentityRule, MatchConfig};
use crate::types::BankTransaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    rule: IdentityRule,
    markers: Vec<String>,
}

impl SelfIdentity {
    pub fn new(rule: IdentityRule, markers: &[String]) -> Self {
        Self {
            rule,
            markers: markers.iter().map(|m| m.trim().to_string()).collect(),
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.identity_rule, &config.self_identity_markers)
    }

    pub fn is_account_holder(&self, transaction: &BankTransaction) -> bool {
        match self.rule {
            IdentityRule::NameContains => self
                .markers
                .iter()
                .any(|m| transaction.counterparty_name.contains(m.as_str())),
            IdentityRule::ExactName => self
                .markers
                .iter()
                .any(|m| transaction.counterparty_name == *m),
            IdentityRule::AccountNumber => self
                .markers
                .iter()
                .any(|m| transaction.counterparty_account_number == *m),
        }
    }
}
