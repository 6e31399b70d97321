//! Loader module for the sales indexer pipeline.
//!
//! Submits the clean file to the search index as one bulk request.

use std::path::Path;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::stage::{StageName, StageReport};
use crate::storage::read_table;
use sales_indexer_repository::SearchIndexClient;
use sales_indexer_shared::SaleDocument;

/// How many rejected documents are logged individually.
const LOGGED_FAILURES: usize = 10;

/// Loader that indexes the clean file into the search engine.
///
/// Every row becomes one document and all documents go out in a single
/// bulk submission. A rejected document fails the stage; nothing is
/// retried here.
pub struct Loader {
    client: SearchIndexClient,
}

impl Loader {
    /// Create a new loader with the given client.
    pub fn new(client: SearchIndexClient) -> Self {
        Self { client }
    }

    /// Index every row of the clean file at `input`.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::PartialSubmission`] if the engine rejected any document
    /// * [`PipelineError::SearchError`] if the bulk request failed as a whole
    /// * [`PipelineError::MissingInput`] if `input` does not exist
    #[instrument(skip(self, input), fields(input = %input.display()))]
    pub async fn run(&self, input: &Path) -> Result<StageReport, PipelineError> {
        let started = Instant::now();

        let path = input.to_path_buf();
        let documents = tokio::task::spawn_blocking(move || {
            read_table(&path).map(|table| SaleDocument::from_table(&table))
        })
        .await??;

        info!(count = documents.len(), "Submitting documents to search index");

        let summary = self.client.batch_index(&documents).await?;

        if summary.has_failures() {
            for failure in summary.failures().take(LOGGED_FAILURES) {
                warn!(
                    position = failure.position,
                    status = ?failure.status,
                    error = ?failure.error,
                    "Document rejected by search index"
                );
            }
            error!(
                failed = summary.failed,
                succeeded = summary.succeeded,
                total = summary.total,
                "Bulk submission partially failed"
            );
            return Err(PipelineError::PartialSubmission {
                failed: summary.failed,
                succeeded: summary.succeeded,
                total: summary.total,
            });
        }

        info!(count = summary.succeeded, "Successfully loaded documents");

        Ok(StageReport::new(
            StageName::Load,
            summary.succeeded,
            None,
            started.elapsed(),
        ))
    }

    /// Check whether the search index is reachable.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        Ok(self.client.health_check().await?)
    }
}
