use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::loader::TableFormat;

/// Convenience result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type returned by pipeline step transforms.
pub type StepResult<T> = Result<T, StepError>;

/// Error type returned by [`crate::loader::load`] and the format readers.
///
/// A single error enum shared across CSV/JSON/Parquet (and optional Excel) readers, plus the two
/// fatal post-processing failures (unsupported extension, colliding canonical column names).
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel reader error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// No reader is registered for the file extension.
    #[error("unsupported file format '{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The format is known but its cargo feature is not enabled.
    #[error("{format} support is not enabled (enable cargo feature '{feature}')")]
    FormatDisabled {
        format: TableFormat,
        feature: &'static str,
    },

    /// Two input columns collapse to the same canonical name.
    #[error("columns '{first}' and '{second}' both canonicalize to '{canonical}'")]
    DuplicateColumnName {
        canonical: String,
        first: String,
        second: String,
    },

    /// The input is structurally unusable (e.g. a JSON row that is not an object).
    #[error("malformed input: {message}")]
    Malformed { message: String },
}

/// Error a pipeline step returns to signal failure.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl StepError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap any error type.
    pub fn other(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

/// A pipeline step that failed, as recorded in the run's outcome log.
///
/// [`crate::pipeline::Pipeline::execute`] never returns this; callers opt into treating a failed
/// run as an error via [`crate::pipeline::PipelineRun::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {index} '{step}' failed: {message}")]
pub struct StepExecutionError {
    pub step: String,
    pub index: usize,
    pub message: String,
}

/// Errors from comparing quality snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualityError {
    /// The baseline has no missing-value entry for a column present in the current snapshot.
    #[error("baseline has no missing-value entry for column '{column}'")]
    BaselineMismatch { column: String },
}

/// Errors from building validation rules out of external rule records.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown check_type '{check_type}' for column '{column}'")]
    UnknownCheckType { column: String, check_type: String },

    /// The rule record is not an object or has no string `check_type`.
    #[error("invalid rule for column '{column}': {message}")]
    InvalidRule { column: String, message: String },

    #[error("invalid date '{raw}' for column '{column}'")]
    InvalidDate { column: String, raw: String },

    #[error("invalid bounds for column '{column}': {message}")]
    InvalidBounds { column: String, message: String },

    #[error("invalid rule json: {0}")]
    Json(#[from] serde_json::Error),
}
