//! Relational source trait definition.

use async_trait::async_trait;

use crate::errors::SourceError;
use sales_indexer_shared::Table;

/// A relational store that can answer a fixed query with a full result set.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Run `query` and return every row with its header.
    ///
    /// Rows come back in the query's natural result order. The header is
    /// present even when the result is empty. Values are rendered as text
    /// and SQL `NULL` becomes an absent field.
    async fn fetch_table(&self, query: &str) -> Result<Table, SourceError>;

    /// Check whether the source is reachable.
    async fn health_check(&self) -> Result<bool, SourceError>;
}
