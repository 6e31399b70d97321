//! Identity and bookkeeping for a single pipeline run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of one pipeline run.
///
/// Also names the run's private directory, so two runs never share
/// intermediate files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata attached to one attempt of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The run this attempt belongs to.
    pub run_id: RunId,
    /// Owner label for the pipeline.
    pub owner: String,
    /// 1-based attempt number; greater than 1 when the run is a retry.
    pub attempt: u32,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
}

impl RunMetadata {
    /// Start a fresh attempt of a new run.
    pub fn new(owner: impl Into<String>, attempt: u32) -> Self {
        Self {
            run_id: RunId::new(),
            owner: owner.into(),
            attempt,
            started_at: Utc::now(),
        }
    }

    /// The following attempt of the same run.
    pub fn next_attempt(&self) -> Self {
        Self {
            run_id: self.run_id,
            owner: self.owner.clone(),
            attempt: self.attempt + 1,
            started_at: Utc::now(),
        }
    }

    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }
}
