//! Error types for the sales indexer pipeline.

use std::path::PathBuf;

use sales_indexer_repository::{SearchIndexError, SourceError};
use sales_indexer_shared::TableError;
use thiserror::Error;

use crate::stage::StageName;

/// Errors that can occur in the sales indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The relational source failed (unreachable, query error, bad value).
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// The search index failed as a whole (unreachable, request rejected).
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// The data does not have the shape the cleaner requires.
    #[error("Data shape error: {0}")]
    DataShapeError(String),

    /// The search index accepted some documents and rejected others.
    #[error("Partial submission: {failed} of {total} documents rejected ({succeeded} indexed)")]
    PartialSubmission {
        failed: usize,
        succeeded: usize,
        total: usize,
    },

    /// The intermediate file a stage depends on does not exist.
    #[error("Missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    /// Intermediate file could not be parsed or written as CSV.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A blocking task panicked or was cancelled.
    #[error("Task error: {0}")]
    TaskError(String),

    /// Another run of this pipeline has not finished yet.
    #[error("A pipeline run is already in progress")]
    RunInProgress,

    /// The run was interrupted by a shutdown request.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// A stage failed; wraps the stage's own error.
    #[error("Stage {stage} failed: {source}")]
    StageFailed {
        stage: StageName,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Create a data shape error.
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShapeError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Attribute this error to `stage`.
    pub fn in_stage(self, stage: StageName) -> Self {
        match self {
            already @ Self::StageFailed { .. } => already,
            other => Self::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage that failed, if the error was raised inside one.
    pub fn failed_stage(&self) -> Option<StageName> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage attribution removed.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<TableError> for PipelineError {
    fn from(err: TableError) -> Self {
        Self::DataShapeError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskError(err.to_string())
    }
}
