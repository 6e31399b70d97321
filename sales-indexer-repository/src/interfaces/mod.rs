//! Interface definitions for the external stores.
//!
//! The pipeline only ever talks to these traits, so stages can be driven
//! by in-memory fakes in tests and by real backends in production.

mod record_source;
mod search_index_provider;

pub use record_source::RecordSource;
pub use search_index_provider::SearchIndexProvider;
