//! PostgreSQL record source.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Column, Executor, Statement};
use tracing::{debug, info, instrument};

use crate::errors::SourceError;
use crate::interfaces::RecordSource;
use crate::postgres::descriptor::ConnectionDescriptor;
use crate::postgres::value::render_column;
use sales_indexer_shared::Table;

/// Reads whole tables from PostgreSQL.
///
/// The pool connects lazily: building a source never touches the network,
/// so an unreachable database surfaces as a failure of the stage that uses
/// it rather than of process start-up.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Create a source for the given descriptor.
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresSource)` - A source with a lazily connecting pool
    /// * `Err(SourceError)` - If the descriptor cannot be turned into connect options
    pub fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, SourceError> {
        let options = descriptor.connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy_with(options);

        info!(source = %descriptor, "Created PostgreSQL source");

        Ok(Self { pool })
    }

    /// Close connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordSource for PostgresSource {
    #[instrument(skip(self))]
    async fn fetch_table(&self, query: &str) -> Result<Table, SourceError> {
        // Preparing first yields the header even for an empty result.
        let statement = (&self.pool).prepare(query).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = statement.query().fetch_all(&self.pool).await?;

        let mut table = Table::new(columns);
        for row in &rows {
            let fields = (0..table.columns().len())
                .map(|index| render_column(row, index))
                .collect::<Result<Vec<_>, _>>()?;
            table
                .push_row(fields)
                .map_err(|e| SourceError::query(e.to_string()))?;
        }

        debug!(
            columns = table.columns().len(),
            rows = table.len(),
            "Fetched table"
        );
        Ok(table)
    }

    async fn health_check(&self) -> Result<bool, SourceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }
}
