//! Ghost Ledger Reconciler CLI
//!
//! Command-line interface for reconciling a bank ledger against a
//! tax-invoice ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- bank.csv invoices.xlsx > results.csv
//! cargo run -- --schema korean-name-ledger --self-marker 홍길동 --high-value-threshold 1000000 bank.csv invoices.xlsx
//! cargo run -- --mode exact-key --schema korean-account-ledger --summary report.json bank.xlsx invoices.xlsx
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 bank.csv invoices.csv > results.csv
//! ```
//!
//! The program writes one CSV row per bank transaction to stdout (or
//! `--output`), the aggregate report as JSON to `--summary`, and logs to
//! stderr. Set `RUST_LOG` to change the log level (default `info`).
//!
//! # Processing Strategies
//!
//! - **sync**: Single-threaded matching (default)
//! - **async**: Both ledgers loaded concurrently, matching in parallel batches
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid configuration, file not found, missing column, etc.)

use ghost_ledger_recon::cli::{self, CliArgs};
use ghost_ledger_recon::core::{CancelToken, Reconciler};
use ghost_ledger_recon::io::{write_report_json, write_results_csv};
use ghost_ledger_recon::strategy;
use ghost_ledger_recon::types::ReconError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_output(path: &std::path::Path) -> Result<BufWriter<File>, ReconError> {
    File::create(path).map(BufWriter::new).map_err(|e| ReconError::IoError {
        message: format!("Failed to create '{}': {}", path.display(), e),
    })
}

fn run(args: &CliArgs) -> Result<(), ReconError> {
    let reconciler = Reconciler::new(args.to_settings()?)?;

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let run = strategy.process(
        &args.bank_file,
        &args.invoice_file,
        &reconciler,
        &CancelToken::new(),
    )?;

    match &args.output {
        Some(path) => {
            let mut output = create_output(path)?;
            write_results_csv(&run.results, &mut output)?;
            output.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut output = stdout.lock();
            write_results_csv(&run.results, &mut output)?;
        }
    }

    if let Some(path) = &args.summary {
        let mut output = create_output(path)?;
        write_report_json(&run.report, &mut output)?;
        output.flush()?;
        tracing::info!(path = %path.display(), "Wrote report");
    }

    if !run.rejected.is_empty() {
        tracing::warn!(count = run.rejected.len(), "Some rows were skipped");
    }

    Ok(())
}

fn main() {
    init_tracing();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
