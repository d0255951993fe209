use std::path::PathBuf;

use thiserror::Error;

/// Result type shared by every engine operation.
pub type Result<T> = std::result::Result<T, CountsError>;

/// Error type covering the failures the engine reports to its callers.
#[derive(Debug, Error)]
pub enum CountsError {
    /// Wrapper for IO failures such as a locked or unwritable file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A shift workbook could not be produced.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// A shift workbook could not be parsed.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet lacks a column the engine relies on.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the persisted dataset does not have the expected shape.
    #[error("invalid store document: {0}")]
    InvalidStore(String),

    /// Raised when a role is not part of the tracked role catalog.
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    /// Raised when a metric carries a value but is not tracked for the role.
    #[error("metric '{metric}' is not recorded for role '{role}'")]
    UnknownMetric { role: String, metric: String },

    /// Raised when a record names a floor that does not match its role.
    #[error("floor '{floor}' does not match role '{role}'")]
    FloorMismatch { role: String, floor: String },

    /// Raised when a count is not an optional non-negative integer.
    #[error("invalid count '{value}' in column {column}")]
    InvalidCount { column: String, value: String },

    /// Raised when a total of counts exceeds the largest accepted count.
    #[error("total of column {column} exceeds the largest accepted count")]
    CountOverflow { column: String },

    /// Raised when a quarter label is not one of the tracked shift phases.
    #[error("unknown quarter '{0}'")]
    UnknownQuarter(String),

    /// Raised when a shift type label is neither day nor night.
    #[error("unknown shift type '{0}'")]
    UnknownShiftType(String),

    /// Raised when a shift date is not formatted as YYYY-MM-DD.
    #[error("invalid shift date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Raised when a submission batch is inconsistent.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// Raised when an import is requested without any files.
    #[error("no files selected for import")]
    NoImportFiles,

    /// Raised when import files are spread across several folders.
    #[error("import files must come from the same folder")]
    MixedImportFolders,

    /// Raised when the EoS rollup cannot be recomputed.
    #[error("EoS aggregation failed: {0}")]
    Aggregation(#[source] Box<CountsError>),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl CountsError {
    /// Returns true when the error was raised by input validation, meaning no
    /// document or store was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CountsError::UnknownRole(_)
                | CountsError::UnknownMetric { .. }
                | CountsError::FloorMismatch { .. }
                | CountsError::InvalidCount { .. }
                | CountsError::CountOverflow { .. }
                | CountsError::UnknownQuarter(_)
                | CountsError::UnknownShiftType(_)
                | CountsError::InvalidDate(_)
                | CountsError::InvalidBatch(_)
                | CountsError::NoImportFiles
                | CountsError::MixedImportFolders
        )
    }
}
