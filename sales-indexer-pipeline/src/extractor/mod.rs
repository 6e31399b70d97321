//! Extractor stage.
//!
//! Pulls the whole source table and writes it, header included, to the raw
//! intermediate file. No transformation happens here.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::stage::{StageName, StageReport};
use crate::storage::write_table;
use sales_indexer_repository::RecordSource;

/// Copies a source table into the raw intermediate file.
pub struct Extractor {
    source: Arc<dyn RecordSource>,
    table: String,
    query: String,
}

impl Extractor {
    /// Create an extractor reading `table` from `source`.
    ///
    /// The table name is interpolated into the query, so it must be a plain
    /// or schema-qualified identifier (`bike_sales_table`, `sales.bikes`).
    pub fn new(source: Arc<dyn RecordSource>, table: impl Into<String>) -> Result<Self, PipelineError> {
        let table = table.into();
        validate_table_name(&table)?;
        let query = format!("SELECT * FROM {table};");
        Ok(Self {
            source,
            table,
            query,
        })
    }

    /// The fixed query this extractor runs.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Run the query and write every row to `output`.
    ///
    /// The file is replaced atomically; on any failure nothing readable is
    /// left at `output`.
    #[instrument(skip(self, output), fields(table = %self.table))]
    pub async fn run(&self, output: &Path) -> Result<StageReport, PipelineError> {
        let started = Instant::now();

        let table = self.source.fetch_table(&self.query).await?;
        let rows = table.len();

        let path = output.to_path_buf();
        tokio::task::spawn_blocking(move || write_table(&path, &table)).await??;

        info!(
            rows = rows,
            output = %output.display(),
            "Extracted source table"
        );

        Ok(StageReport::new(
            StageName::Extract,
            rows,
            Some(output.to_path_buf()),
            started.elapsed(),
        ))
    }

    /// Check whether the source is reachable.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        Ok(self.source.health_check().await?)
    }
}

fn validate_table_name(table: &str) -> Result<(), PipelineError> {
    let valid = !table.is_empty()
        && table.split('.').all(|segment| {
            !segment.is_empty()
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !segment.starts_with(|c: char| c.is_ascii_digit())
        });

    if valid {
        Ok(())
    } else {
        Err(PipelineError::config(format!("invalid source table name: {table:?}")))
    }
}
