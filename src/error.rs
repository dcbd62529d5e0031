use thiserror::Error;

use crate::reconcile::Side;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Convenience result type for processing operations.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Convenience result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV and (optional) Excel ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not conform to the provided schema (missing required columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by [`crate::reconcile`] operations.
///
/// Reconciliation never returns a partial result: an operation either succeeds completely or
/// fails with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// The requested comparison columns are not available in one or both datasets, or no
    /// comparable columns remain after exclusions.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A required key column does not exist in one of the datasets.
    #[error("missing column '{column}' in {side} dataset")]
    MissingColumn { column: String, side: Side },
}

/// Error type returned by [`crate::processing`] transformations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid value at row {row} column '{column}': {message}")]
    InvalidValue {
        row: usize,
        column: String,
        message: String,
    },
}

/// Error type returned by [`crate::export`] writers.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    /// The dataset does not fit on a single worksheet.
    #[error("{rows} data rows exceed the worksheet limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },
}

/// Convenience result type for [`crate::job`].
pub type JobResult<T> = Result<T, JobError>;

/// Error type returned by [`crate::job::ReconJob`]: any layer's error, or a bad job file.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Recon(#[from] ReconError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The job file is not valid JSON or does not match the job shape.
    #[error("invalid job file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The job parses but cannot be run as configured.
    #[error("invalid job: {message}")]
    Config { message: String },
}
