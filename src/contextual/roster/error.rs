use std::path::PathBuf;

use thiserror::Error;

use crate::contextual::roster::api::ApiError;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Fatal failures that stop a run before (or instead of) producing a report.
///
/// Per-entry platform failures never surface here; they are recorded in the
/// [`OperationReport`](crate::model::OperationReport) instead.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading the roster file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the CSV reader cannot decode the roster.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the explicitly requested email column is absent.
    #[error("column '{column}' not found; available columns: {}", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// Raised when no header matches a known email column alias.
    #[error(
        "could not find an email column; pass --email-column (available columns: {})",
        .available.join(", ")
    )]
    MissingEmailColumn { available: Vec<String> },

    /// Raised when the API credential is absent from the environment.
    #[error("{0} environment variable not set (export {0}='your-key' or add it to .env)")]
    MissingCredential(&'static str),

    /// Raised when an optional setting holds an unusable value.
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },

    /// Raised when the HTTP client cannot be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Raised when current membership cannot be fetched, so no plan can be built.
    #[error("failed to list tenant users: {0}")]
    Api(#[from] ApiError),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
