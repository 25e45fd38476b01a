//! Ledger column schemas
//!
//! A schema maps canonical record fields to the header names a particular
//! ledger export uses. The same engine serves every export variant; only the
//! schema changes. Optional columns may be left unmapped and normalize to an
//! empty string (identifiers) or zero (amounts).

use serde::Deserialize;

/// Bank ledger header names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BankColumns {
    pub transaction_date: String,
    #[serde(default)]
    pub own_account_id: Option<String>,
    #[serde(default)]
    pub own_account_number: Option<String>,
    #[serde(default)]
    pub counterparty_account_number: Option<String>,
    pub counterparty_name: String,
    pub amount: String,
}

/// Invoice ledger header names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceColumns {
    pub issue_date: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
    #[serde(default)]
    pub supply_amount: Option<String>,
    pub total_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSchema {
    pub bank: BankColumns,
    pub invoice: InvoiceColumns,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        SchemaPreset::Standard.schema()
    }
}

/// Built-in schemas for the ledger exports seen in practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaPreset {
    /// Column names equal the canonical field names
    #[default]
    Standard,
    /// Name-keyed export: no account columns, invoice total only
    KoreanNameLedger,
    /// Account-keyed export with own and counterparty account numbers
    KoreanAccountLedger,
}

fn col(name: &str) -> Option<String> {
    Some(name.to_string())
}

impl SchemaPreset {
    pub fn schema(&self) -> LedgerSchema {
        match self {
            SchemaPreset::Standard => LedgerSchema {
                bank: BankColumns {
                    transaction_date: "transaction_date".to_string(),
                    own_account_id: col("own_account_id"),
                    own_account_number: col("own_account_number"),
                    counterparty_account_number: col("counterparty_account_number"),
                    counterparty_name: "counterparty_name".to_string(),
                    amount: "amount".to_string(),
                },
                invoice: InvoiceColumns {
                    issue_date: "issue_date".to_string(),
                    account_number: col("account_number"),
                    item_description: col("item_description"),
                    supply_amount: col("supply_amount"),
                    total_amount: "total_amount".to_string(),
                },
            },
            SchemaPreset::KoreanNameLedger => LedgerSchema {
                bank: BankColumns {
                    transaction_date: "거래연월일".to_string(),
                    own_account_id: None,
                    own_account_number: None,
                    counterparty_account_number: None,
                    counterparty_name: "상대 계좌주".to_string(),
                    amount: "입출금액".to_string(),
                },
                invoice: InvoiceColumns {
                    issue_date: "세금계산서 발급일".to_string(),
                    account_number: None,
                    item_description: col("품목명"),
                    supply_amount: None,
                    total_amount: "합계".to_string(),
                },
            },
            SchemaPreset::KoreanAccountLedger => LedgerSchema {
                bank: BankColumns {
                    transaction_date: "거래년월일".to_string(),
                    own_account_id: None,
                    own_account_number: col("본인계좌번호"),
                    counterparty_account_number: col("상대계좌번호"),
                    counterparty_name: "상대계좌주".to_string(),
                    amount: "거래금액".to_string(),
                },
                invoice: InvoiceColumns {
                    issue_date: "작성일자".to_string(),
                    account_number: col("계좌번호"),
                    item_description: col("품목명"),
                    supply_amount: col("공급가액"),
                    total_amount: "합계금액".to_string(),
                },
            },
        }
    }
}
