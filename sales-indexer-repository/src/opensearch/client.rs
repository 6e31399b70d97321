//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::bulk::{bulk_body, parse_bulk_response};
use crate::opensearch::index_config::IndexConfig;
use crate::types::BatchOperationSummary;
use sales_indexer_shared::SaleDocument;

/// OpenSearch client implementation.
///
/// Submits sale documents to a single index through the bulk API.
///
/// # Example
///
/// ```ignore
/// use sales_indexer_repository::opensearch::IndexConfig;
/// let config = IndexConfig::new("bike_sales_data")?;
/// let client = OpenSearchClient::new("http://localhost:9200", config).await?;
/// let summary = client.bulk_index_documents(&documents).await?;
/// println!("{} of {} indexed", summary.succeeded, summary.total);
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index every document is written to
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_config.name
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    /// Index all documents in one bulk request.
    ///
    /// A transport failure or a non-success HTTP status for the request as a
    /// whole is an error. Rejections of individual documents are reported in
    /// the returned summary.
    #[instrument(skip(self, documents), fields(index = %self.index_config.name, count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        documents: &[SaleDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body: Vec<JsonBody<Value>> = bulk_body(&self.index_config.name, documents)?
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::bulk_operation(e.to_string()))?;

        let summary = parse_bulk_response(&response_body, documents.len())?;

        if summary.has_failures() {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk request had rejected documents"
            );
        } else {
            debug!(succeeded = summary.succeeded, "Bulk request completed");
        }

        Ok(summary)
    }

    /// Cluster health is acceptable unless it is `red`.
    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let cluster_status = body.get("status").and_then(Value::as_str).unwrap_or("red");
        debug!(status = %cluster_status, "Cluster health");
        Ok(cluster_status != "red")
    }
}
