//! Column-level normalization rules applied by the cleaner.

use crate::errors::PipelineError;
use sales_indexer_shared::Table;

use super::{INSURANCE_COLUMN, NONE_MARKER, NO_INSURANCE};

/// Lowercase every column name. Two names that differ only by case are
/// rejected rather than silently merged.
pub(crate) fn lowercase_columns(table: &mut Table) -> Result<(), PipelineError> {
    table
        .rename_columns(|name| name.to_lowercase())
        .map_err(|e| PipelineError::data_shape(format!("lowercasing column names: {e}")))
}

/// Fail unless every named column is present.
pub(crate) fn require_columns(table: &Table, columns: &[&str]) -> Result<(), PipelineError> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|name| table.column_index(name).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::data_shape(format!(
            "missing column(s): {}",
            missing.join(", ")
        )))
    }
}

/// Replace absent and `"None"` insurance values with the no-insurance marker.
pub(crate) fn fill_insurance(table: &mut Table) {
    table.map_column(INSURANCE_COLUMN, |value| {
        if matches!(value.as_deref(), None | Some(NONE_MARKER)) {
            Some(NO_INSURANCE.to_string())
        } else {
            value
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_insurance_only_touches_markers() {
        let mut table = Table::with_rows(
            vec!["insurance".to_string()],
            vec![
                vec![None],
                vec![Some("None".to_string())],
                vec![Some("none".to_string())],
                vec![Some("Full".to_string())],
            ],
        )
        .unwrap();

        fill_insurance(&mut table);

        let values: Vec<_> = table.column_values("insurance").unwrap().collect();
        assert_eq!(
            values,
            vec![
                Some("No Insurance"),
                Some("No Insurance"),
                Some("none"),
                Some("Full")
            ]
        );
    }

    #[test]
    fn test_require_columns_lists_all_missing() {
        let table = Table::new(vec!["date".to_string()]);
        let err = require_columns(&table, &["date", "day", "year"]).unwrap_err();
        assert_eq!(err.to_string(), "Data shape error: missing column(s): day, year");
    }

    #[test]
    fn test_lowercase_collision_is_data_shape_error() {
        let mut table = Table::new(vec!["Date".to_string(), "DATE".to_string()]);
        assert!(matches!(
            lowercase_columns(&mut table),
            Err(PipelineError::DataShapeError(_))
        ));
    }
}
