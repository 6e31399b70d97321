//! Per-run directories for intermediate files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::PipelineError;
use sales_indexer_shared::RunId;

/// Where intermediate files go and what they are called.
#[derive(Debug, Clone)]
pub struct FileLayout {
    pub data_dir: PathBuf,
    pub raw_file_name: String,
    pub clean_file_name: String,
    /// Keep the run directory after a successful run.
    pub retain_intermediate: bool,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            raw_file_name: "data_raw.csv".to_string(),
            clean_file_name: "data_clean.csv".to_string(),
            retain_intermediate: false,
        }
    }
}

impl FileLayout {
    /// Check that the file names are plain, distinct names.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for name in [&self.raw_file_name, &self.clean_file_name] {
            let plain = !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains('/')
                && !name.contains('\\');
            if !plain {
                return Err(PipelineError::config(format!(
                    "intermediate file name must be a plain file name: {name:?}"
                )));
            }
        }
        if self.raw_file_name == self.clean_file_name {
            return Err(PipelineError::config(
                "raw and clean file names must differ",
            ));
        }
        Ok(())
    }
}

/// A directory private to one attempt of a run, holding its intermediate
/// files.
///
/// Concurrent or overlapping runs each get their own directory, so one run
/// can never read a file written by another. Retries of a run share the
/// run's directory but each attempt starts in a fresh subdirectory.
#[derive(Debug)]
pub struct RunDirectory {
    path: PathBuf,
    raw_file: PathBuf,
    clean_file: PathBuf,
}

impl RunDirectory {
    /// Create `<data_dir>/<run_id>/attempt-<n>/`.
    pub fn create(layout: &FileLayout, run_id: &RunId, attempt: u32) -> Result<Self, PipelineError> {
        layout.validate()?;

        let path = layout
            .data_dir
            .join(run_id.to_string())
            .join(format!("attempt-{attempt}"));
        std::fs::create_dir_all(&path)?;
        debug!(path = %path.display(), "Created run directory");

        Ok(Self {
            raw_file: path.join(&layout.raw_file_name),
            clean_file: path.join(&layout.clean_file_name),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The extractor's output and the cleaner's input.
    pub fn raw_file(&self) -> &Path {
        &self.raw_file
    }

    /// The cleaner's output and the loader's input.
    pub fn clean_file(&self) -> &Path {
        &self.clean_file
    }

    /// Delete the attempt directory and everything in it, then the run
    /// directory if no earlier attempt is left in it.
    pub fn remove(self) -> Result<(), PipelineError> {
        std::fs::remove_dir_all(&self.path)?;
        debug!(path = %self.path.display(), "Removed run directory");

        if let Some(run_root) = self.path.parent() {
            // Not empty while failed attempts are kept for inspection.
            if std::fs::remove_dir(run_root).is_ok() {
                debug!(path = %run_root.display(), "Removed empty run root");
            }
        }
        Ok(())
    }
}
