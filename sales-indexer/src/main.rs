use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use sales_indexer::logging::init_logging;
use sales_indexer::{Dependencies, IndexingError, PipelineConfig};
use sales_indexer_pipeline::Cleaner;

#[derive(Parser)]
#[command(name = "sales-indexer")]
#[command(about = "Moves bike sales from PostgreSQL into OpenSearch on a weekly schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once now (with retries) and exit
    Run,
    /// Run the pipeline at every scheduled trigger until Ctrl-C
    Serve,
    /// Clean a raw CSV file locally, without touching any external service
    Clean {
        /// Raw file as written by the extractor
        #[arg(long)]
        input: PathBuf,
        /// Where to write the clean file
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the next scheduled trigger times
    Next {
        /// Number of triggers to print
        #[arg(long, default_value = "5")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_once().await,
        Commands::Serve => serve().await,
        Commands::Clean { input, output } => clean(input, output).await,
        Commands::Next { count } => next(count),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Sales indexer failed");
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {}", err);
                source = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_once() -> Result<(), IndexingError> {
    let config = PipelineConfig::from_env()?;
    let deps = Dependencies::new(&config).await?;

    let report = deps.orchestrator.run().await?;
    for stage in &report.stages {
        info!(
            stage = %stage.stage,
            rows = stage.rows,
            elapsed_ms = stage.elapsed.as_millis() as u64,
            "Stage complete"
        );
    }
    println!(
        "Run {} indexed {} documents",
        report.metadata.run_id,
        report.indexed()
    );
    Ok(())
}

async fn serve() -> Result<(), IndexingError> {
    let config = PipelineConfig::from_env()?;
    let deps = Dependencies::new(&config).await?;

    deps.orchestrator.serve(&deps.schedule).await?;
    Ok(())
}

async fn clean(input: PathBuf, output: PathBuf) -> Result<(), IndexingError> {
    let report = tokio::task::spawn_blocking(move || Cleaner::new().run(&input, &output))
        .await
        .map_err(|e| IndexingError::PipelineError(e.into()))??;

    println!("Data cleaned and saved: {} rows", report.rows);
    Ok(())
}

fn next(count: usize) -> Result<(), IndexingError> {
    let config = PipelineConfig::from_env()?;
    let timezone = config.schedule.timezone();

    for trigger in config.schedule.upcoming(Utc::now(), count) {
        println!("{}", trigger.with_timezone(&timezone).to_rfc3339());
    }
    Ok(())
}
