//! Stage identity and completion reports.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The three stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    /// Pull the source table into the raw intermediate file.
    Extract,
    /// Normalize the raw file into the clean intermediate file.
    Clean,
    /// Submit the clean file to the search index.
    Load,
}

impl StageName {
    /// All stages in the order they run.
    pub const ORDER: [StageName; 3] = [StageName::Extract, StageName::Clean, StageName::Load];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Extract => "extract",
            StageName::Clean => "clean",
            StageName::Load => "load",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage produced when it completed.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: StageName,
    /// Rows written (extract, clean) or documents indexed (load).
    pub rows: usize,
    /// The intermediate file the stage wrote, if any.
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(stage: StageName, rows: usize, output: Option<PathBuf>, elapsed: Duration) -> Self {
        Self {
            stage,
            rows,
            output,
            elapsed,
        }
    }
}
