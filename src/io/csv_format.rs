//! CSV format handling for ledger input and reconciliation output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Conversion from CSV records to raw table rows
//! - Serialization of the MatchResult sequence
//! - JSON serialization of the aggregate report
//!
//! All functions work on in-memory readers and writers for easy testing.

use rust_decimal::Decimal;
use std::io::Write;

use crate::types::{AggregateReport, LedgerSource, MatchResult, RawCell, RawTable, ReconError};

/// Column order of the results export
pub const RESULT_HEADERS: [&str; 13] = [
    "transaction_date",
    "own_account_id",
    "own_account_number",
    "counterparty_account_number",
    "counterparty_name",
    "amount",
    "status",
    "suspicion_flag",
    "invoice_issue_date",
    "invoice_account_number",
    "invoice_item_description",
    "invoice_supply_amount",
    "invoice_total_amount",
];

/// Convert the fields of one CSV record to raw cells
pub fn convert_csv_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<RawCell> {
    fields.into_iter().map(RawCell::from_text).collect()
}

/// Read a whole CSV ledger into a raw table
///
/// Records the CSV layer cannot decode are kept in `RawTable::rejected`
/// with their data row index; only an unreadable header fails the source.
pub fn read_csv_table<R: std::io::Read>(
    input: R,
    ledger: LedgerSource,
) -> Result<RawTable, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(input);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers);

    for record in reader.records() {
        match record {
            Ok(record) => table.push_row(convert_csv_fields(record.iter())),
            Err(e) => {
                let row = table.next_row();
                table
                    .rejected
                    .push(ReconError::malformed_record(ledger, row, format!("CSV parse error: {}", e)));
            }
        }
    }

    Ok(table)
}

fn decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Write the MatchResult sequence as CSV, one row per bank transaction
///
/// Invoice columns are empty for unmatched transactions.
pub fn write_results_csv(results: &[MatchResult], output: &mut dyn Write) -> Result<(), ReconError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(RESULT_HEADERS)?;

    for result in results {
        let txn = &result.source_transaction;
        let mut record = vec![
            txn.transaction_date.to_string(),
            txn.own_account_id.clone(),
            txn.own_account_number.clone(),
            txn.counterparty_account_number.clone(),
            txn.counterparty_name.clone(),
            decimal(txn.amount),
            result.status.as_str().to_string(),
            result
                .suspicion_flag
                .map(|flag| flag.as_str().to_string())
                .unwrap_or_default(),
        ];

        match &result.matched_invoice {
            Some(invoice) => record.extend([
                invoice.issue_date.to_string(),
                invoice.account_number.clone(),
                invoice.item_description.clone(),
                decimal(invoice.supply_amount),
                decimal(invoice.total_amount),
            ]),
            None => record.extend(std::iter::repeat(String::new()).take(5)),
        }

        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the aggregate report as pretty-printed JSON
pub fn write_report_json(report: &AggregateReport, output: &mut dyn Write) -> Result<(), ReconError> {
    serde_json::to_writer_pretty(&mut *output, report).map_err(|e| ReconError::IoError {
        message: format!("Failed to write report: {}", e),
    })?;
    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BankTransaction, SuspicionFlag, TaxInvoice};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn txn(name: &str, amount: Decimal) -> BankTransaction {
        BankTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            own_account_id: "A1".to_string(),
            own_account_number: "111".to_string(),
            counterparty_account_number: "999".to_string(),
            counterparty_name: name.to_string(),
            amount,
        }
    }

    fn invoice() -> TaxInvoice {
        TaxInvoice {
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            account_number: "111".to_string(),
            item_description: "Hong, Gildong".to_string(),
            supply_amount: Decimal::new(4550000, 1),
            total_amount: Decimal::from(500_500),
        }
    }

    const HEADER: &str = "transaction_date,own_account_id,own_account_number,counterparty_account_number,counterparty_name,amount,status,suspicion_flag,invoice_issue_date,invoice_account_number,invoice_item_description,invoice_supply_amount,invoice_total_amount\n";

    #[rstest]
    #[case::empty(vec![], "")]
    #[case::unmatched(
        vec![MatchResult::unmatched(txn("Kim", Decimal::from(-20_000)), None)],
        "2024-01-10,A1,111,999,Kim,-20000,unmatched,,,,,,\n"
    )]
    #[case::matched_and_flagged(
        vec![MatchResult::matched(
            txn("Hong Gildong", Decimal::new(50000000, 2)),
            invoice(),
            0,
            Some(SuspicionFlag::HighValueSelfTransfer),
        )],
        "2024-01-10,A1,111,999,Hong Gildong,500000,matched,high_value_self_transfer,2024-01-12,111,\"Hong, Gildong\",455000,500500\n"
    )]
    fn test_write_results_csv(#[case] results: Vec<MatchResult>, #[case] expected_rows: &str) {
        let mut output = Vec::new();
        write_results_csv(&results, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, format!("{}{}", HEADER, expected_rows));
    }

    #[test]
    fn test_read_csv_table_trims_and_keeps_empty_cells() {
        let input = "date , name,amount\n2024-01-10,  Kim ,\n2024-01-11,Lee,5\n";
        let table = read_csv_table(input.as_bytes(), LedgerSource::Bank).unwrap();

        assert_eq!(table.headers, vec!["date", "name", "amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cell(1), &RawCell::Text("Kim".to_string()));
        assert_eq!(table.rows[0].cell(2), &RawCell::Empty);
        assert_eq!(table.rows[1].row, 2);
    }

    #[test]
    fn test_read_csv_table_strips_bom() {
        let input = "\u{feff}거래연월일,입출금액\n2024-01-10,100\n";
        let table = read_csv_table(input.as_bytes(), LedgerSource::Bank).unwrap();
        assert_eq!(table.column_index("거래연월일"), Some(0));
    }

    #[test]
    fn test_read_csv_table_header_only() {
        let table = read_csv_table("a,b\n".as_bytes(), LedgerSource::Invoice).unwrap();
        assert!(table.rows.is_empty());
        assert!(table.rejected.is_empty());
    }

    #[test]
    fn test_write_report_json_is_deterministic() {
        let report = AggregateReport {
            unmatched_count: 2,
            unmatched_total_amount: Decimal::from(1500),
            ..AggregateReport::default()
        };

        let mut first = Vec::new();
        let mut second = Vec::new();
        write_report_json(&report, &mut first).unwrap();
        write_report_json(&report, &mut second).unwrap();

        assert_eq!(first, second);
        let json = String::from_utf8(first).unwrap();
        assert!(json.contains("\"unmatched_count\": 2"));
        assert!(json.contains("\"top_counterparties\": []"));
    }
}
