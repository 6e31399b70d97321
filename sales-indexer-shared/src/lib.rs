//! # Sales Indexer Shared
//!
//! Types shared by every crate of the sales indexer: the in-memory table
//! that stages hand to each other through intermediate files, the document
//! submitted to the search index, and per-run metadata.

pub mod document;
pub mod run;
pub mod table;

pub use document::SaleDocument;
pub use run::{RunId, RunMetadata};
pub use table::{Field, Table, TableError};
