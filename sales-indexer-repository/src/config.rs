//! Configuration types for the SearchIndexClient.

/// Configuration for the SearchIndexClient.
///
/// The default places no limit on a bulk submission: a run sends every clean
/// row at once.
#[derive(Debug, Clone, Default)]
pub struct SearchIndexConfig {
    /// Maximum number of documents allowed in a single bulk submission.
    /// Set to None to disable the limit.
    pub max_batch_size: Option<usize>,
}

impl SearchIndexConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
