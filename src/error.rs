//! Error kinds surfaced by the pipeline stages.
//!
//! `SourceUnavailable` is recoverable (the loader falls back to synthetic
//! data). Per-record problems never become a `PipelineError`; they are
//! `FieldError`s that null the affected field and are counted instead.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),

    #[error("malformed source {}: {reason}", path.display())]
    MalformedSource { path: PathBuf, reason: String },

    #[error("storage write failed: {0}")]
    StorageWrite(#[source] sqlx::Error),

    #[error("storage query failed: {0}")]
    StorageQuery(#[source] sqlx::Error),

    #[error("export to {} failed: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Process exit code for a run that aborted with this error.
    /// `0` is reserved for success, including runs that ended with zero rows.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::MalformedSource { .. } => 2,
            PipelineError::StorageWrite(_) | PipelineError::StorageQuery(_) => 3,
            PipelineError::Export { .. } | PipelineError::Io(_) => 4,
            PipelineError::SourceUnavailable(_) | PipelineError::Config(_) => 1,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PipelineError::MalformedSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Why a single delimited field could not be turned into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field is missing")]
    Missing,
    #[error("leading field is empty")]
    Empty,
    #[error("leading field {0:?} is not parseable")]
    Unparseable(String),
}
