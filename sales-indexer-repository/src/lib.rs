//! # Sales Indexer Repository
//!
//! This crate provides traits and implementations for the two external
//! stores the pipeline touches: the relational source the extractor reads
//! and the search index the loader writes. It includes definitions for
//! errors, interfaces, and concrete implementations for PostgreSQL and
//! OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use client::SearchIndexClient;
pub use config::SearchIndexConfig;
pub use errors::{SearchIndexError, SourceError};
pub use interfaces::{RecordSource, SearchIndexProvider};
pub use opensearch::{IndexConfig, OpenSearchClient};
pub use postgres::{ConnectionDescriptor, PostgresSource};
pub use types::{BatchOperationResult, BatchOperationSummary};
