//! Error handling for the cohort builder.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Errors raised while loading tables, building the cohort or persisting the dataset
#[derive(Debug, Error)]
pub enum Error {
    /// Error opening, reading or renaming a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding or encoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error in an Arrow compute kernel or while assembling a record batch
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error parsing a JSON configuration or vocabulary file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input relation is absent from the input folder
    #[error("Required table '{table}' not found at {}", path.display())]
    MissingTable {
        /// Name of the OMOP table
        table: String,
        /// Location that was searched
        path: PathBuf,
    },

    /// A required column is absent from a record batch
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// Table being decoded
        table: String,
        /// Missing column
        column: String,
    },

    /// A column exists but cannot be interpreted as the expected type
    #[error("Column '{column}' has unsupported type {data_type}, expected {expected}")]
    InvalidColumnType {
        /// Offending column
        column: String,
        /// Actual Arrow type
        data_type: String,
        /// Expected logical type
        expected: String,
    },

    /// A date string that is not in `YYYY-MM-DD` format
    #[error("Not a valid date: '{0}'")]
    InvalidDate(String),

    /// A persisted dataset that does not have the expected layout
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A background loading task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Create a configuration error from any message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for cohort builder operations
pub type Result<T> = std::result::Result<T, Error>;
