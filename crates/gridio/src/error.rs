//! Error types for taranis-gridio.

use std::path::PathBuf;

/// Error type for all fallible operations in the taranis-gridio crate.
///
/// [`GridError::MissingGridData`] is the one recoverable variant: callers
/// skip every observation of the affected month and continue. All other
/// variants indicate malformed files or a broken setup.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Returned when no grid file of any category exists for a month.
    #[error("no grid data available for {year}-{month:02}")]
    MissingGridData {
        /// Requested year.
        year: i32,
        /// Requested month (1-12).
        month: u8,
    },

    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when none of a variable's accepted names is present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Canonical name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a variable's data does not match its axes.
    #[error("shape mismatch for '{name}': expected {expected} values, got {got}")]
    ShapeMismatch {
        /// Name of the offending variable.
        name: String,
        /// Expected flat length from the axes.
        expected: usize,
        /// Actual flat length read.
        got: usize,
    },

    /// Returned when the on-disk catalogue file is absent.
    ///
    /// This is a hard precondition failure for an extraction run, unlike
    /// missing monthly files.
    #[error("monthly data catalogue not found: {}", path.display())]
    CatalogNotFound {
        /// Expected catalogue path.
        path: PathBuf,
    },

    /// Returned when the catalogue file cannot be parsed.
    #[error("failed to parse catalogue: {reason}")]
    CatalogParse {
        /// Description of the parse failure.
        reason: String,
    },
}

impl From<netcdf::Error> for GridError {
    fn from(e: netcdf::Error) -> Self {
        GridError::Netcdf {
            reason: e.to_string(),
        }
    }
}
