//! Record normalization
//!
//! Converts [`RawTable`]s into canonical [`BankTransaction`]s and
//! [`TaxInvoice`]s according to a column schema.
//!
//! # Coercion rules
//!
//! - **Dates**: `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD`, `YYYYMMDD`, optionally
//!   followed by a time component; spreadsheet date cells, which the reader
//!   hands over as serial numbers (1900 date system). Anything else rejects
//!   the row.
//! - **Amounts**: thousands separators, a leading `₩` and a trailing `원` are
//!   accepted. An empty cell or unmapped column is **zero**, not an error; zero
//!   never matches, so an absent amount surfaces as unmatched rather than
//!   disappearing. Non-numeric text rejects the row.
//! - **Identifiers**: always strings. Integral spreadsheet numbers lose their
//!   fractional part (`1234.0` becomes `"1234"`) so numeric and textual account
//!   columns compare equal.
//! - **Names**: trimmed, case preserved.
//!
//! Row failures never abort normalization: every rejected row is returned with
//! its ledger and 1-based row index next to the usable records.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{BankColumns, InvoiceColumns};
use crate::types::{BankTransaction, LedgerSource, RawCell, RawRow, RawTable, ReconError, TaxInvoice};

/// Records that normalized cleanly plus the rows that did not
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    /// `MalformedRecord` errors ordered by row
    pub rejected: Vec<ReconError>,
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

// Largest serial a spreadsheet can hold (9999-12-31)
const MAX_SERIAL: i64 = 2_958_465;

/// Parse a date cell
pub fn parse_date(cell: &RawCell) -> Result<NaiveDate, String> {
    match cell {
        RawCell::Empty => Err("missing date".to_string()),
        RawCell::Text(text) => parse_date_text(text),
        RawCell::Integer(n) => parse_date_number(*n)
            .ok_or_else(|| format!("unparsable date '{}'", n)),
        RawCell::Float(f) if f.is_finite() => parse_date_number(f.floor() as i64)
            .ok_or_else(|| format!("unparsable date '{}'", f)),
        RawCell::Float(f) => Err(format!("unparsable date '{}'", f)),
    }
}

fn parse_date_text(text: &str) -> Result<NaiveDate, String> {
    let trimmed = text.trim();
    let date_part = trimmed
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.');

    if date_part.len() == 8 && date_part.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(date) = compact_date(date_part) {
            return Ok(date);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .ok_or_else(|| format!("unparsable date '{}'", trimmed))
}

// YYYYMMDD
fn compact_date(digits: &str) -> Option<NaiveDate> {
    let year = digits[0..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_date_number(n: i64) -> Option<NaiveDate> {
    if (1..=MAX_SERIAL).contains(&n) {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(Duration::days(n))
    } else if (10_000_101..=99_991_231).contains(&n) {
        compact_date(&n.to_string())
    } else {
        None
    }
}

/// Parse an amount cell; empty means zero
pub fn parse_amount(cell: &RawCell) -> Result<Decimal, String> {
    match cell {
        RawCell::Empty => Ok(Decimal::ZERO),
        RawCell::Integer(n) => Ok(Decimal::from(*n)),
        RawCell::Float(f) => {
            Decimal::try_from(*f).map_err(|_| format!("invalid amount '{}'", f))
        }
        RawCell::Text(text) => parse_amount_text(text),
    }
}

fn parse_amount_text(text: &str) -> Result<Decimal, String> {
    let trimmed = text.trim();
    let cleaned: String = trimmed
        .trim_start_matches('₩')
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    Decimal::from_str(cleaned).map_err(|_| format!("invalid amount '{}'", trimmed))
}

/// Render an identifier cell as a string regardless of its source type
pub fn coerce_identifier(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(text) => text.trim().to_string(),
        RawCell::Integer(n) => n.to_string(),
        RawCell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        RawCell::Float(f) => f.to_string(),
    }
}

fn required_column(
    table: &RawTable,
    ledger: LedgerSource,
    name: &str,
) -> Result<usize, ReconError> {
    table
        .column_index(name)
        .ok_or_else(|| ReconError::missing_column(ledger, name))
}

fn optional_column(
    table: &RawTable,
    ledger: LedgerSource,
    name: Option<&String>,
) -> Result<Option<usize>, ReconError> {
    name.map(|n| required_column(table, ledger, n)).transpose()
}

fn optional_cell(row: &RawRow, column: Option<usize>) -> &RawCell {
    const EMPTY: &RawCell = &RawCell::Empty;
    column.map(|c| row.cell(c)).unwrap_or(EMPTY)
}

/// Resolved column positions for a bank ledger
struct BankLayout {
    transaction_date: usize,
    own_account_id: Option<usize>,
    own_account_number: Option<usize>,
    counterparty_account_number: Option<usize>,
    counterparty_name: usize,
    amount: usize,
}

impl BankLayout {
    fn resolve(table: &RawTable, columns: &BankColumns) -> Result<Self, ReconError> {
        let ledger = LedgerSource::Bank;
        Ok(Self {
            transaction_date: required_column(table, ledger, &columns.transaction_date)?,
            own_account_id: optional_column(table, ledger, columns.own_account_id.as_ref())?,
            own_account_number: optional_column(
                table,
                ledger,
                columns.own_account_number.as_ref(),
            )?,
            counterparty_account_number: optional_column(
                table,
                ledger,
                columns.counterparty_account_number.as_ref(),
            )?,
            counterparty_name: required_column(table, ledger, &columns.counterparty_name)?,
            amount: required_column(table, ledger, &columns.amount)?,
        })
    }

    fn read(&self, row: &RawRow) -> Result<BankTransaction, String> {
        let transaction_date = parse_date(row.cell(self.transaction_date))
            .map_err(|e| format!("transaction_date: {}", e))?;
        let amount =
            parse_amount(row.cell(self.amount)).map_err(|e| format!("amount: {}", e))?;

        let own_account_number = coerce_identifier(optional_cell(row, self.own_account_number));
        let own_account_id = match coerce_identifier(optional_cell(row, self.own_account_id)) {
            id if id.is_empty() => own_account_number.clone(),
            id => id,
        };

        Ok(BankTransaction {
            transaction_date,
            own_account_id,
            own_account_number,
            counterparty_account_number: coerce_identifier(optional_cell(
                row,
                self.counterparty_account_number,
            )),
            counterparty_name: coerce_identifier(row.cell(self.counterparty_name)),
            amount,
        })
    }
}

/// Resolved column positions for an invoice ledger
struct InvoiceLayout {
    issue_date: usize,
    account_number: Option<usize>,
    item_description: Option<usize>,
    supply_amount: Option<usize>,
    total_amount: usize,
}

impl InvoiceLayout {
    fn resolve(table: &RawTable, columns: &InvoiceColumns) -> Result<Self, ReconError> {
        let ledger = LedgerSource::Invoice;
        Ok(Self {
            issue_date: required_column(table, ledger, &columns.issue_date)?,
            account_number: optional_column(table, ledger, columns.account_number.as_ref())?,
            item_description: optional_column(
                table,
                ledger,
                columns.item_description.as_ref(),
            )?,
            supply_amount: optional_column(table, ledger, columns.supply_amount.as_ref())?,
            total_amount: required_column(table, ledger, &columns.total_amount)?,
        })
    }

    fn read(&self, row: &RawRow) -> Result<TaxInvoice, String> {
        let issue_date =
            parse_date(row.cell(self.issue_date)).map_err(|e| format!("issue_date: {}", e))?;
        let supply_amount = parse_amount(optional_cell(row, self.supply_amount))
            .map_err(|e| format!("supply_amount: {}", e))?;
        let total_amount = parse_amount(row.cell(self.total_amount))
            .map_err(|e| format!("total_amount: {}", e))?;

        Ok(TaxInvoice {
            issue_date,
            account_number: coerce_identifier(optional_cell(row, self.account_number)),
            item_description: coerce_identifier(optional_cell(row, self.item_description)),
            supply_amount,
            total_amount,
        })
    }
}

fn collect<T>(
    table: &RawTable,
    ledger: LedgerSource,
    read: impl Fn(&RawRow) -> Result<T, String>,
) -> Normalized<T> {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut rejected = table.rejected.clone();

    for row in &table.rows {
        match read(row) {
            Ok(record) => records.push(record),
            Err(message) => rejected.push(ReconError::malformed_record(ledger, row.row, message)),
        }
    }

    rejected.sort_by_key(|e| e.row());
    tracing::debug!(
        %ledger,
        records = records.len(),
        rejected = rejected.len(),
        "Normalized ledger"
    );

    Normalized { records, rejected }
}

/// Normalize a bank ledger
///
/// Fails as a whole only when a mapped column is missing from the header.
pub fn normalize_bank(
    table: &RawTable,
    columns: &BankColumns,
) -> Result<Normalized<BankTransaction>, ReconError> {
    let layout = BankLayout::resolve(table, columns)?;
    Ok(collect(table, LedgerSource::Bank, |row| layout.read(row)))
}

/// Normalize an invoice ledger
///
/// Fails as a whole only when a mapped column is missing from the header.
pub fn normalize_invoices(
    table: &RawTable,
    columns: &InvoiceColumns,
) -> Result<Normalized<TaxInvoice>, ReconError> {
    let layout = InvoiceLayout::resolve(table, columns)?;
    Ok(collect(table, LedgerSource::Invoice, |row| layout.read(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaPreset;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::iso("2024-01-10", date(2024, 1, 10))]
    #[case::slashes("2024/01/10", date(2024, 1, 10))]
    #[case::dots("2024.01.10", date(2024, 1, 10))]
    #[case::dots_trailing("2024.01.10.", date(2024, 1, 10))]
    #[case::compact("20240110", date(2024, 1, 10))]
    #[case::with_time("2024-01-10 13:45:00", date(2024, 1, 10))]
    #[case::iso_datetime("2024-01-10T13:45:00", date(2024, 1, 10))]
    #[case::padded("  2024-01-10  ", date(2024, 1, 10))]
    fn test_parse_date_text(#[case] text: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(&RawCell::Text(text.to_string())), Ok(expected));
    }

    #[rstest]
    #[case::serial(RawCell::Integer(45301), date(2024, 1, 10))]
    #[case::serial_with_time(RawCell::Float(45301.75), date(2024, 1, 10))]
    #[case::compact_number(RawCell::Integer(20240110), date(2024, 1, 10))]
    fn test_parse_date_cells(#[case] cell: RawCell, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(&cell), Ok(expected));
    }

    #[rstest]
    #[case::empty(RawCell::Empty, "missing date")]
    #[case::garbage(RawCell::Text("yesterday".to_string()), "unparsable date 'yesterday'")]
    #[case::bad_month(RawCell::Text("2024-13-01".to_string()), "unparsable date")]
    #[case::bad_compact(RawCell::Text("20241341".to_string()), "unparsable date")]
    #[case::negative(RawCell::Integer(-3), "unparsable date")]
    fn test_parse_date_errors(#[case] cell: RawCell, #[case] expected: &str) {
        assert!(parse_date(&cell).unwrap_err().contains(expected));
    }

    #[rstest]
    #[case::plain("500000", Decimal::from(500_000))]
    #[case::separators("500,500", Decimal::from(500_500))]
    #[case::negative("-1,200", Decimal::from(-1200))]
    #[case::explicit_plus("+300", Decimal::from(300))]
    #[case::won_suffix("2,000,000원", Decimal::from(2_000_000))]
    #[case::won_sign("₩ 15,000", Decimal::from(15_000))]
    #[case::fraction("100.25", Decimal::new(10025, 2))]
    fn test_parse_amount_text(#[case] text: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(&RawCell::Text(text.to_string())), Ok(expected));
    }

    #[test]
    fn test_missing_amount_is_zero() {
        assert_eq!(parse_amount(&RawCell::Empty), Ok(Decimal::ZERO));
    }

    #[rstest]
    #[case::integer(RawCell::Integer(1200), Decimal::from(1200))]
    #[case::float(RawCell::Float(1200.5), Decimal::new(12005, 1))]
    fn test_parse_amount_numbers(#[case] cell: RawCell, #[case] expected: Decimal) {
        assert_eq!(parse_amount(&cell), Ok(expected));
    }

    #[rstest]
    #[case::word(RawCell::Text("lots".to_string()))]
    #[case::nan(RawCell::Float(f64::NAN))]
    fn test_parse_amount_errors(#[case] cell: RawCell) {
        assert!(parse_amount(&cell).unwrap_err().contains("invalid amount"));
    }

    #[rstest]
    #[case::text(RawCell::Text(" 110-234-567890 ".to_string()), "110-234-567890")]
    #[case::integer(RawCell::Integer(1234567), "1234567")]
    #[case::integral_float(RawCell::Float(1234567.0), "1234567")]
    #[case::fractional_float(RawCell::Float(12.5), "12.5")]
    #[case::empty(RawCell::Empty, "")]
    fn test_coerce_identifier(#[case] cell: RawCell, #[case] expected: &str) {
        assert_eq!(coerce_identifier(&cell), expected);
    }

    fn standard_bank_table(rows: &[&[&str]]) -> RawTable {
        RawTable::from_rows(
            &[
                "transaction_date",
                "own_account_id",
                "own_account_number",
                "counterparty_account_number",
                "counterparty_name",
                "amount",
            ],
            rows,
        )
    }

    #[test]
    fn test_normalize_bank_collects_rejected_rows() {
        let table = standard_bank_table(&[
            &["2024-01-10", "acc-1", "111", "999", " Hong Gildong ", "500,000"],
            &["not a date", "acc-1", "111", "999", "Kim", "100"],
            &["2024-01-11", "", "111", "888", "Lee", ""],
            &["2024-01-12", "acc-1", "111", "777", "Park", "ten"],
        ]);
        let columns = SchemaPreset::Standard.schema().bank;

        let normalized = normalize_bank(&table, &columns).unwrap();

        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[0].counterparty_name, "Hong Gildong");
        assert_eq!(normalized.records[0].amount, Decimal::from(500_000));
        assert_eq!(normalized.records[1].own_account_id, "111");
        assert_eq!(normalized.records[1].amount, Decimal::ZERO);

        let rows: Vec<_> = normalized.rejected.iter().map(|e| e.row()).collect();
        assert_eq!(rows, vec![Some(2), Some(4)]);
        assert!(matches!(
            &normalized.rejected[0],
            ReconError::MalformedRecord { ledger: LedgerSource::Bank, .. }
        ));
    }

    #[test]
    fn test_normalize_bank_missing_column_fails_whole_source() {
        let table = RawTable::from_rows(&["transaction_date", "amount"], &[]);
        let columns = SchemaPreset::Standard.schema().bank;

        let err = normalize_bank(&table, &columns).unwrap_err();
        assert_eq!(
            err,
            ReconError::missing_column(LedgerSource::Bank, "own_account_id")
        );
    }

    #[test]
    fn test_normalize_invoices_name_ledger_schema() {
        let table = RawTable::from_rows(
            &["세금계산서 발급일", "품목명", "합계"],
            &[
                &["2024-01-12", "홍길동", "500,500"],
                &["2024-01-13", "김철수", ""],
            ],
        );
        let columns = SchemaPreset::KoreanNameLedger.schema().invoice;

        let normalized = normalize_invoices(&table, &columns).unwrap();

        assert!(normalized.rejected.is_empty());
        assert_eq!(normalized.records[0].item_description, "홍길동");
        assert_eq!(normalized.records[0].total_amount, Decimal::from(500_500));
        assert_eq!(normalized.records[0].supply_amount, Decimal::ZERO);
        assert_eq!(normalized.records[0].account_number, "");
        assert_eq!(normalized.records[1].total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_reader_rejections_are_carried_forward_in_row_order() {
        let mut table = standard_bank_table(&[]);
        table.push_row(
            ["2024-01-10", "a", "1", "2", "Kim", "bad"]
                .iter()
                .map(|v| RawCell::from_text(v))
                .collect(),
        );
        let next = table.next_row();
        table
            .rejected
            .push(ReconError::malformed_record(LedgerSource::Bank, next, "broken record"));
        let columns = SchemaPreset::Standard.schema().bank;

        let normalized = normalize_bank(&table, &columns).unwrap();
        let rows: Vec<_> = normalized.rejected.iter().map(|e| e.row()).collect();
        assert_eq!(rows, vec![Some(1), Some(2)]);
    }
}
