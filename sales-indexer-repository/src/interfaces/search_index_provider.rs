//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index writes,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use sales_indexer_shared::SaleDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `SearchIndexClient` to enable dependency
/// injection and easy testing with mock implementations. The target index is
/// part of the implementation's own configuration.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Index multiple documents in one bulk request and report the outcome per document.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents to index, in submission order
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Aggregate counts plus one result per document,
    ///   in the same order as `documents`
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index_documents(
        &self,
        documents: &[SaleDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Check whether the search engine is reachable and healthy.
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
