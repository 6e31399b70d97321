//! Search index client implementation.
//!
//! This module provides the main client for writing to the search index.
//! Application code uses this to submit batches of sale documents.

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;
use sales_indexer_shared::SaleDocument;

/// The main client for writing to the search index.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Index a batch of documents in a single bulk submission.
    /// Input: Vec<SaleDocument> (the whole batch, in row order)
    /// Output: Result<BatchOperationSummary, SearchIndexError>
    ///
    /// Rejected documents are reported in the summary, not as an error; the
    /// caller decides what a partial failure means.
    ///
    /// The batch size is limited by the configured max_batch_size.
    pub async fn batch_index(
        &self,
        documents: &[SaleDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        self.provider.bulk_index_documents(documents).await
    }

    /// Check whether the underlying search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.provider.health_check().await
    }
}
