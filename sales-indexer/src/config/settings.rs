//! Pipeline settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::IndexingError;
use sales_indexer_pipeline::schedule::{DEFAULT_CRON, DEFAULT_TIMEZONE};
use sales_indexer_pipeline::{FileLayout, OrchestratorConfig, Schedule};
use sales_indexer_repository::{ConnectionDescriptor, IndexConfig, SearchIndexConfig};

const DEFAULT_SOURCE_HOST: &str = "postgres";
const DEFAULT_SOURCE_PORT: u16 = 5432;
const DEFAULT_SOURCE_USER: &str = "airflow";
const DEFAULT_SOURCE_PASSWORD: &str = "airflow";
const DEFAULT_SOURCE_DATABASE: &str = "bike_sales_database";
const DEFAULT_SOURCE_TABLE: &str = "bike_sales_table";

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://elasticsearch:9200";

const DEFAULT_RUN_OWNER: &str = "Ferryansa";
const DEFAULT_RUN_RETRIES: u32 = 1;
const DEFAULT_RUN_RETRY_DELAY_SECS: u64 = 300;

/// The relational source to extract from.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub descriptor: ConnectionDescriptor,
    /// Table read with `SELECT *`.
    pub table: String,
}

/// The search index to load into.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub url: String,
    pub index: IndexConfig,
    /// Largest bulk submission accepted; `None` for no limit.
    pub max_batch_size: Option<usize>,
}

impl IndexSettings {
    pub fn client_config(&self) -> SearchIndexConfig {
        match self.max_batch_size {
            Some(max) => SearchIndexConfig::with_max_batch_size(max),
            None => SearchIndexConfig::unlimited(),
        }
    }
}

/// Run bookkeeping applied by the orchestrator.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub owner: String,
    pub retries: u32,
    pub retry_delay: Duration,
}

/// Everything the indexer needs to run, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceSettings,
    pub index: IndexSettings,
    pub files: FileLayout,
    pub schedule: Schedule,
    pub run: RunSettings,
}

impl PipelineConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SOURCE_DATABASE_URL`: full PostgreSQL URL; overrides the parts below
    /// - `SOURCE_HOST`, `SOURCE_PORT`, `SOURCE_USER`, `SOURCE_PASSWORD`, `SOURCE_DATABASE`:
    ///   connection parts (default: postgres:5432, airflow/airflow, bike_sales_database)
    /// - `SOURCE_TABLE`: table to extract (default: bike_sales_table)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://elasticsearch:9200)
    /// - `INDEX_NAME`: target index (default: bike_sales_data)
    /// - `INDEX_MAX_BATCH_SIZE`: bulk size limit, `0` for none (default: none)
    /// - `DATA_DIR`: root of the per-run directories (default: ./data)
    /// - `RAW_FILE_NAME`, `CLEAN_FILE_NAME`: intermediate file names
    /// - `RETAIN_INTERMEDIATE`: keep run directories after success (default: false)
    /// - `SCHEDULE_CRON`: six field cron expression, seconds first
    ///   (default: `0 10,20,30 9 * * Sat`)
    /// - `SCHEDULE_TIMEZONE`: zone the expression is matched in (default: Asia/Jakarta)
    /// - `RUN_OWNER`, `RUN_RETRIES`, `RUN_RETRY_DELAY_SECS`: run metadata
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let descriptor = match get("SOURCE_DATABASE_URL") {
            Some(url) => ConnectionDescriptor::Url(url),
            None => ConnectionDescriptor::Parts {
                host: get_or("SOURCE_HOST", DEFAULT_SOURCE_HOST),
                port: parse_or("SOURCE_PORT", get("SOURCE_PORT"), DEFAULT_SOURCE_PORT)?,
                user: get_or("SOURCE_USER", DEFAULT_SOURCE_USER),
                password: get_or("SOURCE_PASSWORD", DEFAULT_SOURCE_PASSWORD),
                database: get_or("SOURCE_DATABASE", DEFAULT_SOURCE_DATABASE),
            },
        };
        let source = SourceSettings {
            descriptor,
            table: get_or("SOURCE_TABLE", DEFAULT_SOURCE_TABLE),
        };

        let index_name = get_or(
            "INDEX_NAME",
            sales_indexer_repository::opensearch::DEFAULT_INDEX_NAME,
        );
        let index = IndexConfig::new(index_name)
            .map_err(|e| IndexingError::config(format!("INDEX_NAME: {}", e)))?;
        let max_batch_size: usize =
            parse_or("INDEX_MAX_BATCH_SIZE", get("INDEX_MAX_BATCH_SIZE"), 0)?;
        let index = IndexSettings {
            url: get_or("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index,
            max_batch_size: (max_batch_size > 0).then_some(max_batch_size),
        };

        let defaults = FileLayout::default();
        let files = FileLayout {
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            raw_file_name: get("RAW_FILE_NAME").unwrap_or(defaults.raw_file_name),
            clean_file_name: get("CLEAN_FILE_NAME").unwrap_or(defaults.clean_file_name),
            retain_intermediate: match get("RETAIN_INTERMEDIATE") {
                Some(value) => parse_bool("RETAIN_INTERMEDIATE", &value)?,
                None => defaults.retain_intermediate,
            },
        };
        files
            .validate()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        let schedule = Schedule::parse(
            &get_or("SCHEDULE_CRON", DEFAULT_CRON),
            &get_or("SCHEDULE_TIMEZONE", DEFAULT_TIMEZONE),
        )
        .map_err(|e| IndexingError::config(format!("schedule: {}", e)))?;

        let run = RunSettings {
            owner: get_or("RUN_OWNER", DEFAULT_RUN_OWNER),
            retries: parse_or("RUN_RETRIES", get("RUN_RETRIES"), DEFAULT_RUN_RETRIES)?,
            retry_delay: Duration::from_secs(parse_or(
                "RUN_RETRY_DELAY_SECS",
                get("RUN_RETRY_DELAY_SECS"),
                DEFAULT_RUN_RETRY_DELAY_SECS,
            )?),
        };

        Ok(Self {
            source,
            index,
            files,
            schedule,
            run,
        })
    }

    /// The orchestrator's slice of the configuration.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            files: self.files.clone(),
            owner: self.run.owner.clone(),
            retries: self.run.retries,
            retry_delay: self.run.retry_delay,
        }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("{}={:?}: {}", key, value, e))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, IndexingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(IndexingError::config(format!(
            "{}={:?}: expected true or false",
            key, value
        ))),
    }
}
