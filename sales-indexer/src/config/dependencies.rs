//! Dependency initialization and wiring for the sales indexer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::IndexingError;
use sales_indexer_pipeline::{Cleaner, Extractor, Loader, Orchestrator, Schedule};
use sales_indexer_repository::{OpenSearchClient, PostgresSource, SearchIndexClient};

/// How long a start-up health check may take before it is reported as failed.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// When scheduled runs fire.
    pub schedule: Schedule,
}

impl Dependencies {
    /// Build the stages and orchestrator from `config`.
    ///
    /// Both external stores are probed once. An unreachable store is only
    /// logged: it may come up before the next trigger, and a run against a
    /// store that is still down fails in the stage that uses it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration cannot be turned into clients
    pub async fn new(config: &PipelineConfig) -> Result<Self, IndexingError> {
        info!(
            source = %config.source.descriptor,
            table = %config.source.table,
            opensearch_url = %config.index.url,
            index = %config.index.index.name,
            data_dir = %config.files.data_dir.display(),
            "Initializing dependencies"
        );

        let source = PostgresSource::connect(&config.source.descriptor)?;
        let extractor = Extractor::new(Arc::new(source), config.source.table.clone())
            .map_err(|e| IndexingError::config(e.to_string()))?;

        let search_client = OpenSearchClient::new(&config.index.url, config.index.index.clone())
            .await
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;
        let loader = Loader::new(SearchIndexClient::with_config(
            Box::new(search_client),
            config.index.client_config(),
        ));

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, extractor.health_check()).await {
            Ok(Ok(true)) => info!("Source connection verified"),
            Ok(Ok(false)) => warn!("Source reported unhealthy"),
            Ok(Err(e)) => warn!(error = %e, "Source health check failed"),
            Err(_) => warn!("Source health check timed out"),
        }

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, loader.health_check()).await {
            Ok(Ok(true)) => info!("OpenSearch connection verified"),
            Ok(Ok(false)) => warn!("OpenSearch cluster is unhealthy"),
            Ok(Err(e)) => warn!(error = %e, "OpenSearch health check failed"),
            Err(_) => warn!("OpenSearch health check timed out"),
        }

        let orchestrator = Orchestrator::with_config(
            extractor,
            Cleaner::new(),
            loader,
            config.orchestrator_config(),
        );

        Ok(Self {
            orchestrator,
            schedule: config.schedule.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn unreachable_config(extra: &[(&str, &str)]) -> PipelineConfig {
        let mut vars: HashMap<String, String> = [
            ("SOURCE_HOST", "127.0.0.1"),
            ("SOURCE_PORT", "1"),
            ("OPENSEARCH_URL", "http://127.0.0.1:1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        PipelineConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_stores_do_not_block_startup() {
        let deps = Dependencies::new(&unreachable_config(&[])).await.unwrap();
        assert_eq!(deps.schedule, Schedule::weekly_default().unwrap());
        assert_eq!(deps.orchestrator.config().retries, 1);
    }

    #[tokio::test]
    async fn test_invalid_table_is_config_error() {
        let config = unreachable_config(&[("SOURCE_TABLE", "sales; DROP TABLE x")]);
        assert!(matches!(
            Dependencies::new(&config).await,
            Err(IndexingError::ConfigError(_))
        ));
    }
}
