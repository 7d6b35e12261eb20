use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::PolarsError;
use thiserror::Error;

pub type GridbookResult<T> = Result<T, GridbookError>;

#[derive(Debug, Error)]
pub enum GridbookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors raised while validating and coercing an input table.
///
/// Validation is fail-fast: the first violation aborts the whole run.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing column in {table}: {column}")]
    MissingColumn { table: &'static str, column: String },

    #[error("Column {column} in {table} must be {expected} type: {reason}")]
    Coercion {
        table: &'static str,
        column: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Column {column} in {table} must be string type")]
    NotString { table: &'static str, column: String },

    #[error("Period must be between {min} and {max}")]
    PeriodOutOfRange { min: i64, max: i64 },

    #[error("{column} must be non-negative")]
    Negative { column: String },

    #[error("BuySell must be 'Buy' or 'Sell'")]
    InvalidSide,
}

/// Errors raised while reconstructing a trade's delivery instant.
///
/// All of these are fatal for the whole run; a malformed timestamp cannot be
/// dropped without corrupting the aggregate sums.
#[derive(Debug, Error)]
pub enum TemporalError {
    #[error("Invalid timezone identifier '{zone}' at row {row}")]
    InvalidTimeZone { zone: String, row: usize },

    #[error("Local time {local} does not exist in timezone {zone}")]
    NonexistentLocalTime { local: NaiveDateTime, zone: String },

    #[error("Missing {column} value at row {row}")]
    MissingValue { column: &'static str, row: usize },
}

/// Errors related to frame operations and benchmark reconciliation.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("No forecast benchmark for month {month} ({bucket})")]
    MissingForecast { month: NaiveDate, bucket: String },
}

/// Errors related to the reporting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid peak window (start: {start}, end: {end}): {msg}")]
    InvalidPeakHours { start: u8, end: u8, msg: String },

    #[error("Invalid reporting window (start: {start}, end: {end}): {msg}")]
    InvalidReportingWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
        msg: String,
    },
}

/// Errors related to file I/O.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Failed to create writer: {0}")]
    WriterCreation(String),

    #[error("Failed to create reader: {0}")]
    ReaderCreation(String),

    #[error("Failed to write data: {0}")]
    WriteFailed(String),

    #[error("Failed to read data: {0}")]
    ReadFailed(String),
}

pub(crate) fn map_df_err(err: PolarsError) -> GridbookError {
    GridbookError::Data(DataError::DataFrame(err.to_string()))
}
