//! Error types for taranis-tracks.

use std::path::PathBuf;

/// Error type for all fallible operations in the taranis-tracks crate.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a required column is not present in a table.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a time value cannot be interpreted.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time issue.
        reason: String,
    },
}

impl From<parquet::errors::ParquetError> for TrackError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        TrackError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for TrackError {
    fn from(e: arrow::error::ArrowError) -> Self {
        TrackError::Parquet {
            reason: e.to_string(),
        }
    }
}
