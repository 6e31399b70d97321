//! # Sales Indexer Pipeline
//!
//! The extract, clean and load stages and the orchestrator that runs them.
//!
//! ## Architecture
//!
//! ```text
//! PostgreSQL → Extractor → data_raw.csv → Cleaner → data_clean.csv → Loader → OpenSearch
//! ```
//!
//! Stages hand data to each other only through CSV files in a directory
//! private to the run. Each file is written atomically, so a stage never
//! reads a partial file.
//!
//! ## Components
//!
//! - **Extractor**: copies the source table into the raw file
//! - **Cleaner**: deduplicates, normalizes and derives `id_transaction`
//! - **Loader**: submits the clean rows in one bulk request
//! - **Orchestrator**: runs the stages in order, retries, and schedules runs

pub mod cleaner;
pub mod errors;
pub mod extractor;
pub mod loader;
pub mod orchestrator;
pub mod schedule;
pub mod stage;
pub mod storage;

pub use cleaner::Cleaner;
pub use errors::PipelineError;
pub use extractor::Extractor;
pub use loader::Loader;
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunReport};
pub use schedule::{Schedule, ScheduleError};
pub use stage::{StageName, StageReport};
pub use storage::{FileLayout, RunDirectory};
