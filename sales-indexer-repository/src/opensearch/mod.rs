//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend. The bulk API is wire-compatible with
//! Elasticsearch.

mod bulk;
mod client;
mod index_config;

pub use bulk::parse_bulk_response;
pub use client::OpenSearchClient;
pub use index_config::{IndexConfig, DEFAULT_INDEX_NAME};
