//! Orchestrator module for the sales indexer pipeline.
//!
//! Runs extract, clean and load in order, one run at a time, with a
//! whole-run retry, and drives runs from a [`Schedule`].

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, instrument, warn};

use crate::cleaner::Cleaner;
use crate::errors::PipelineError;
use crate::extractor::Extractor;
use crate::loader::Loader;
use crate::schedule::Schedule;
use crate::stage::{StageName, StageReport};
use crate::storage::{FileLayout, RunDirectory};
use sales_indexer_shared::RunMetadata;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Intermediate file locations.
    pub files: FileLayout,
    /// Owner label recorded with every run.
    pub owner: String,
    /// How many times a failed run is retried from the first stage.
    pub retries: u32,
    /// Pause before each retry.
    pub retry_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            files: FileLayout::default(),
            owner: "Ferryansa".to_string(),
            retries: 1,
            retry_delay: Duration::from_secs(300),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Metadata of the attempt that succeeded.
    pub metadata: RunMetadata,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
    /// The run directory; it only still exists if intermediate files are retained.
    pub run_dir: PathBuf,
}

impl RunReport {
    /// Documents indexed by the load stage.
    pub fn indexed(&self) -> usize {
        self.stages
            .iter()
            .find(|s| s.stage == StageName::Load)
            .map_or(0, |s| s.rows)
    }
}

/// Orchestrator that coordinates the pipeline stages.
///
/// The orchestrator:
/// - Runs the stages strictly in order, each to completion
/// - Gives every attempt its own run directory
/// - Rejects a run while another one is still in progress
/// - Retries a failed run as a whole
/// - Handles shutdown signals
pub struct Orchestrator {
    extractor: Extractor,
    cleaner: Cleaner,
    loader: Loader,
    config: OrchestratorConfig,
    run_lock: Mutex<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given stages.
    pub fn new(extractor: Extractor, cleaner: Cleaner, loader: Loader) -> Self {
        Self::with_config(extractor, cleaner, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        extractor: Extractor,
        cleaner: Cleaner,
        loader: Loader,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            extractor,
            cleaner,
            loader,
            config,
            run_lock: Mutex::new(()),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute one run now, retrying the whole run on failure.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::RunInProgress`] if another run has not finished
    /// * [`PipelineError::Cancelled`] if shutdown was requested
    /// * [`PipelineError::StageFailed`] naming the stage of the last attempt's failure
    #[instrument(skip(self), fields(owner = %self.config.owner))]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| PipelineError::RunInProgress)?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let attempts = self.config.retries.saturating_add(1);
        let mut metadata = RunMetadata::new(self.config.owner.clone(), 1);

        loop {
            let attempt = metadata.attempt;
            let result = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => Err(PipelineError::Cancelled),
                result = self.execute(metadata.clone()) => result,
            };

            match result {
                Ok(report) => return Ok(report),
                Err(PipelineError::Cancelled) => {
                    warn!(attempt = attempt, "Run cancelled");
                    return Err(PipelineError::Cancelled);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        run_id = %metadata.run_id,
                        error = %e,
                        attempt = attempt,
                        retry_in_secs = self.config.retry_delay.as_secs(),
                        "Run failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown_requested(&mut shutdown_rx) => return Err(PipelineError::Cancelled),
                        _ = tokio::time::sleep(self.config.retry_delay) => {}
                    }
                    metadata = metadata.next_attempt();
                }
                Err(e) => {
                    error!(
                        run_id = %metadata.run_id,
                        error = %e,
                        stage = ?e.failed_stage(),
                        attempts = attempt,
                        "Run failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// One attempt: extract, clean, load.
    async fn execute(&self, metadata: RunMetadata) -> Result<RunReport, PipelineError> {
        info!(
            run_id = %metadata.run_id,
            attempt = metadata.attempt,
            retry = metadata.is_retry(),
            "Starting pipeline run"
        );

        let run_dir = RunDirectory::create(&self.config.files, &metadata.run_id, metadata.attempt)?;
        let mut stages = Vec::with_capacity(StageName::ORDER.len());

        let extracted = self
            .extractor
            .run(run_dir.raw_file())
            .await
            .map_err(|e| e.in_stage(StageName::Extract))?;
        stages.push(extracted);

        let cleaner = self.cleaner.clone();
        let (raw_file, clean_file) = (run_dir.raw_file().to_path_buf(), run_dir.clean_file().to_path_buf());
        let cleaned = tokio::task::spawn_blocking(move || cleaner.run(&raw_file, &clean_file))
            .await
            .map_err(PipelineError::from)
            .and_then(|result| result)
            .map_err(|e| e.in_stage(StageName::Clean))?;
        stages.push(cleaned);

        let loaded = self
            .loader
            .run(run_dir.clean_file())
            .await
            .map_err(|e| e.in_stage(StageName::Load))?;
        stages.push(loaded);

        let path = run_dir.path().to_path_buf();
        if self.config.files.retain_intermediate {
            info!(path = %path.display(), "Keeping intermediate files");
        } else if let Err(e) = run_dir.remove() {
            warn!(error = %e, path = %path.display(), "Failed to remove run directory");
        }

        let report = RunReport {
            metadata,
            stages,
            run_dir: path,
        };
        info!(
            run_id = %report.metadata.run_id,
            indexed = report.indexed(),
            "Pipeline run complete"
        );
        Ok(report)
    }

    /// Wait for scheduled triggers and run the pipeline at each one.
    ///
    /// Only triggers after the moment this is called fire; missed ones are
    /// not replayed. A failed run is logged and the loop keeps waiting for
    /// the next trigger. Returns when shutdown is requested or Ctrl-C is
    /// received.
    pub async fn serve(&self, schedule: &Schedule) -> Result<(), PipelineError> {
        info!("Starting sales indexer scheduler");
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            let now = Utc::now();
            let next = schedule
                .next_after(now)
                .ok_or_else(|| PipelineError::config("schedule has no upcoming trigger"))?;
            let wait = (next - now).to_std().unwrap_or_default();

            info!(
                next_run = %next.with_timezone(&schedule.timezone()),
                wait_secs = wait.as_secs(),
                "Waiting for next scheduled run"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    self.shutdown();
                    break;
                }
            }

            tokio::select! {
                result = self.run() => match result {
                    Ok(report) => info!(
                        run_id = %report.metadata.run_id,
                        indexed = report.indexed(),
                        "Scheduled run succeeded"
                    ),
                    Err(e) => error!(error = %e, "Scheduled run failed"),
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal during run");
                    self.shutdown();
                    break;
                }
            }
        }

        info!("Scheduler shutdown complete");
        Ok(())
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// Resolves once shutdown has been requested, including before the call.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    // A closed channel means the orchestrator is gone; treat it as shutdown.
    let _ = rx.wait_for(|stop| *stop).await;
}
