//! # Sales Indexer
//!
//! Main library for the bike sales indexer.
//!
//! This crate provides the configuration, logging setup and dependency
//! wiring for running the sales indexer pipeline.

pub mod config;
pub mod logging;

pub use config::{Dependencies, PipelineConfig};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] sales_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] sales_indexer_repository::SearchIndexError),

    /// Source error.
    #[error("Source error: {0}")]
    SourceError(#[from] sales_indexer_repository::SourceError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
