//! Result types for search index operations.

use crate::errors::SearchIndexError;

/// Result of a batch operation for a single document.
///
/// This struct represents the outcome of indexing one document within a bulk
/// request. It indicates whether the operation succeeded and includes error
/// details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// 0-based position of the document in the submitted batch.
    pub position: usize,
    /// Whether the operation succeeded.
    pub success: bool,
    /// HTTP status reported for this item, when the engine provides one.
    pub status: Option<u16>,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(position: usize, status: Option<u16>) -> Self {
        Self {
            position,
            success: true,
            status,
            error: None,
        }
    }

    pub fn failed(position: usize, status: Option<u16>, error: SearchIndexError) -> Self {
        Self {
            position,
            success: false,
            status,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This struct provides a complete overview of a bulk operation, including the total
/// number of items processed, how many succeeded and failed, and detailed results for
/// each individual item. This allows callers to detect partial failures.
#[derive(Debug, Clone)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of an empty batch.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: vec![],
        }
    }

    /// Build a summary from per-item results, counting successes and failures.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Results of the items the engine rejected.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_results_counts() {
        let summary = BatchOperationSummary::from_results(vec![
            BatchOperationResult::succeeded(0, Some(201)),
            BatchOperationResult::failed(1, Some(400), SearchIndexError::index("mapper_parsing_exception")),
            BatchOperationResult::succeeded(2, Some(201)),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.failures().map(|r| r.position).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchOperationSummary::empty();
        assert_eq!(summary.total, 0);
        assert!(!summary.has_failures());
    }
}
