//! Target index configuration.

use crate::errors::SearchIndexError;

/// The name of the sales index.
pub const DEFAULT_INDEX_NAME: &str = "bike_sales_data";

/// Which index the client writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Index name every document is submitted to.
    pub name: String,
}

impl IndexConfig {
    /// Create a config for `name`, rejecting names OpenSearch would refuse.
    ///
    /// Index names must be lowercase, non-empty, must not start with `-`, `_`
    /// or `+`, and must not contain spaces or any of `\ / * ? " < > | , # :`.
    pub fn new(name: impl Into<String>) -> Result<Self, SearchIndexError> {
        let name = name.into();

        if name.is_empty() || name == "." || name == ".." {
            return Err(SearchIndexError::validation("index name is empty"));
        }
        if name.starts_with(['-', '_', '+']) {
            return Err(SearchIndexError::validation(format!(
                "index name {} starts with an illegal character",
                name
            )));
        }
        if name.chars().any(|c| c.is_uppercase()) {
            return Err(SearchIndexError::validation(format!(
                "index name {} must be lowercase",
                name
            )));
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || "\\/*?\"<>|,#:".contains(c))
        {
            return Err(SearchIndexError::validation(format!(
                "index name {} contains an illegal character",
                name
            )));
        }

        Ok(Self { name })
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_name() {
        assert_eq!(IndexConfig::default().name, "bike_sales_data");
    }

    #[test]
    fn test_accepts_valid_names() {
        assert!(IndexConfig::new("bike_sales_data").is_ok());
        assert!(IndexConfig::new("sales-2024.v1").is_ok());
    }

    #[test]
    fn test_rejects_invalid_names() {
        for name in ["", "_sales", "-sales", "Sales", "bike sales", "a/b", "a,b"] {
            assert!(
                matches!(IndexConfig::new(name), Err(SearchIndexError::ValidationError(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
