//! Error types for the analytic core.
//!
//! Input errors come from the CSV parser and mean the caller should supply a
//! different file. Forecast precondition errors are expected, user-facing
//! conditions and their messages are written to be shown verbatim.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The input text contained no rows at all.
    #[error("The CSV file is empty or contains no valid data.")]
    EmptyInput,

    /// A header row was present but no data rows followed it.
    #[error("The CSV file contains no data rows.")]
    MalformedRow,

    #[error("Error parsing CSV line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("No date column detected. Forecasting requires a date column.")]
    NoDateColumn,

    #[error("No numeric columns detected. Forecasting requires numeric data.")]
    NoNumericColumn,

    /// Fewer than `required` rows carried both a date and a numeric value.
    #[error("Not enough data points for forecasting (need at least {required}, found {actual}).")]
    InsufficientData { required: usize, actual: usize },

    /// Every retained date was identical, so the regression has no slope.
    #[error("Cannot compute regression with zero variance in dates.")]
    DegenerateRegression,

    #[error("Column \"{0}\" not found in dataset.")]
    ColumnNotFound(String),

    #[error("Column \"{0}\" is not numeric. Please select a numeric column.")]
    ColumnNotNumeric(String),

    #[error("Column \"{0}\" is not a date column. Please select a date column.")]
    ColumnNotDate(String),

    #[error("Unknown chart type: {0}. Supported types: line, bar, histogram, scatter")]
    UnknownChartType(String),

    #[error("{0}")]
    ChartUnavailable(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
