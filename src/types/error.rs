//! Error types for the ledger reconciliation engine
//!
//! This module defines all error types that can occur while loading,
//! normalizing and reconciling the two ledgers.
//!
//! # Error Categories
//!
//! - **Row Errors**: a single ledger row failed normalization (`MalformedRecord`).
//!   These are collected per row and never abort the run on their own.
//! - **Configuration Errors**: the matching configuration or profile is invalid.
//!   These fail the whole run before any matching begins.
//! - **Source Errors**: file not found, unreadable spreadsheets, missing columns.
//! - **Runtime Errors**: cancellation and worker pool failures.

use std::fmt;
use thiserror::Error;

/// Which ledger a record or failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerSource {
    /// Bank account movements
    Bank,
    /// Issued tax invoices
    Invoice,
}

impl fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Invoice => write!(f, "invoice"),
        }
    }
}

/// Main error type for the reconciliation engine
///
/// Each variant carries enough context to tell the operator which ledger,
/// row or setting caused the problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconError {
    /// A ledger row could not be normalized
    ///
    /// This is a recoverable error - the row is reported alongside the
    /// usable records and the caller decides whether to skip or abort.
    #[error("{ledger} row {row}: {message}")]
    MalformedRecord {
        /// Ledger the row came from
        ledger: LedgerSource,
        /// 1-based data row index (header excluded)
        row: usize,
        /// What was wrong with the row
        message: String,
    },

    /// One or more rows were rejected and the run was asked to abort on them
    #[error("{count} malformed {ledger} row(s); aborting")]
    MalformedRows {
        /// Ledger containing the rejected rows
        ledger: LedgerSource,
        /// Number of rejected rows
        count: usize,
    },

    /// Invalid matching or report configuration
    ///
    /// This is a fatal error raised before any ledger row is scanned.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the invalid setting
        message: String,
    },

    /// A mapped column is absent from a ledger header
    #[error("{ledger} ledger is missing column '{column}'")]
    MissingColumn {
        /// Ledger whose header lacks the column
        ledger: LedgerSource,
        /// Column name expected by the schema
        column: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A spreadsheet could not be opened or read
    #[error("Spreadsheet error: {message}")]
    Spreadsheet {
        /// Description of the spreadsheet failure
        message: String,
    },

    /// A TOML profile could not be parsed
    #[error("Profile error: {message}")]
    Profile {
        /// Description of the profile failure
        message: String,
    },

    /// The run was cancelled through its cancellation token
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// The async worker pool failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },
}

// Conversion from io::Error to ReconError
impl From<std::io::Error> for ReconError {
    fn from(error: std::io::Error) -> Self {
        ReconError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to ReconError
impl From<csv::Error> for ReconError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ReconError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ReconError {
    /// Create a MalformedRecord error
    pub fn malformed_record(ledger: LedgerSource, row: usize, message: impl Into<String>) -> Self {
        ReconError::MalformedRecord {
            ledger,
            row,
            message: message.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ReconError::Configuration {
            message: message.into(),
        }
    }

    /// Create a MissingColumn error
    pub fn missing_column(ledger: LedgerSource, column: &str) -> Self {
        ReconError::MissingColumn {
            ledger,
            column: column.to_string(),
        }
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        ReconError::FileNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create a Spreadsheet error
    pub fn spreadsheet(message: impl Into<String>) -> Self {
        ReconError::Spreadsheet {
            message: message.into(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        ReconError::Runtime {
            message: message.into(),
        }
    }

    /// Row index for row-level errors
    pub fn row(&self) -> Option<usize> {
        match self {
            ReconError::MalformedRecord { row, .. } => Some(*row),
            _ => None,
        }
    }
}
