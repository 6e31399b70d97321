//! Cleaner stage.
//!
//! Turns the raw extract into the clean table the loader indexes. The rules
//! run in a fixed order, since later rules rely on earlier ones:
//!
//! 1. drop exact-duplicate rows (first occurrence wins)
//! 2. lowercase column names
//! 3. replace absent or `"None"` insurance with `"No Insurance"`
//! 4. drop `day`, `month` and `year`
//! 5. derive `id_transaction` from row position, date and shipping cost
//! 6. move `id_transaction` to the first column
//! 7. coerce `date` to a canonical date/time
//!
//! Every date is parsed before any identifier is derived, so a bad date
//! fails the stage without a half-built table ever existing.

mod dates;
mod identifier;
mod rules;

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::stage::{StageName, StageReport};
use crate::storage::{read_table, write_table};
use dates::ParsedDate;
use sales_indexer_shared::Table;

/// Name of the derived identifier column.
pub const ID_COLUMN: &str = "id_transaction";
/// Value written for sales without insurance.
pub const NO_INSURANCE: &str = "No Insurance";
/// Textual marker the source uses for "no insurance".
pub const NONE_MARKER: &str = "None";
/// Columns made redundant by `date`.
pub const REDUNDANT_COLUMNS: [&str; 3] = ["day", "month", "year"];

pub(crate) const DATE_COLUMN: &str = "date";
pub(crate) const COST_COLUMN: &str = "shipping_cost";
pub(crate) const INSURANCE_COLUMN: &str = "insurance";

const REQUIRED_COLUMNS: [&str; 6] = [
    DATE_COLUMN,
    COST_COLUMN,
    INSURANCE_COLUMN,
    "day",
    "month",
    "year",
];

/// Applies the cleaning rules to a raw sales table.
#[derive(Debug, Clone, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw table.
    ///
    /// Row positions in `id_transaction` are 1-based positions in `raw`;
    /// rows removed as duplicates leave their positions unused.
    ///
    /// # Errors
    ///
    /// [`PipelineError::DataShapeError`] when a required column is missing,
    /// two column names collide once lowercased, or a row has an absent or
    /// unparsable date or shipping cost.
    pub fn clean(&self, mut table: Table) -> Result<Table, PipelineError> {
        let raw_rows = table.len();

        let positions = table.dedup_rows();
        rules::lowercase_columns(&mut table)?;
        rules::require_columns(&table, &REQUIRED_COLUMNS)?;
        rules::fill_insurance(&mut table);
        for column in REDUNDANT_COLUMNS {
            table.drop_column(column);
        }

        let parsed_dates = parse_dates(&table, &positions)?;
        let ids = derive_ids(&table, &positions)?;

        // A stale identifier from an earlier clean is replaced, not kept.
        table.drop_column(ID_COLUMN);
        table.insert_column(0, ID_COLUMN, ids.into_iter().map(Some).collect())?;

        let mut canonical = dates::canonicalize(&parsed_dates).into_iter();
        table.map_column(DATE_COLUMN, |_| canonical.next());

        debug!(
            raw_rows = raw_rows,
            duplicates = raw_rows - table.len(),
            rows = table.len(),
            "Cleaned table"
        );
        Ok(table)
    }

    /// Clean the raw file at `input` into `output`.
    ///
    /// `output` is replaced atomically and only once the whole table has
    /// been cleaned.
    #[instrument(skip(self, input, output), fields(input = %input.display()))]
    pub fn run(&self, input: &Path, output: &Path) -> Result<StageReport, PipelineError> {
        let started = Instant::now();

        let raw = read_table(input)?;
        let clean = self.clean(raw)?;
        write_table(output, &clean)?;

        info!(
            rows = clean.len(),
            output = %output.display(),
            "Data cleaned and saved"
        );

        Ok(StageReport::new(
            StageName::Clean,
            clean.len(),
            Some(output.to_path_buf()),
            started.elapsed(),
        ))
    }
}

fn column<'a>(
    table: &'a Table,
    name: &str,
) -> Result<impl Iterator<Item = Option<&'a str>> + 'a, PipelineError> {
    table
        .column_values(name)
        .ok_or_else(|| PipelineError::data_shape(format!("missing column(s): {name}")))
}

fn parse_dates(table: &Table, positions: &[usize]) -> Result<Vec<ParsedDate>, PipelineError> {
    column(table, DATE_COLUMN)?
        .zip(positions)
        .map(|(value, position)| {
            let text = value.ok_or_else(|| {
                PipelineError::data_shape(format!("row {position}: date is absent"))
            })?;
            ParsedDate::parse(text).ok_or_else(|| {
                PipelineError::data_shape(format!("row {position}: unparsable date {text:?}"))
            })
        })
        .collect()
}

fn derive_ids(table: &Table, positions: &[usize]) -> Result<Vec<String>, PipelineError> {
    column(table, DATE_COLUMN)?
        .zip(column(table, COST_COLUMN)?)
        .zip(positions)
        .map(|((date, cost), position)| {
            let date = date.unwrap_or_default();
            let cost = cost.ok_or_else(|| {
                PipelineError::data_shape(format!("row {position}: shipping_cost is absent"))
            })?;
            if !identifier::is_decimal_text(cost) {
                return Err(PipelineError::data_shape(format!(
                    "row {position}: shipping_cost is not a decimal number: {cost:?}"
                )));
            }
            Ok(identifier::transaction_id(*position, date, cost))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn raw_columns() -> Vec<String> {
        ["Date", "Day", "Month", "Year", "Shipping_Cost", "Insurance", "Other"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn raw_row(date: &str, cost: &str, insurance: Option<&str>, other: &str) -> Vec<Option<String>> {
        let day = date.get(8..10).unwrap_or("1").trim_start_matches('0');
        vec![
            s(date),
            s(day),
            s("5"),
            s("2023"),
            s(cost),
            insurance.map(str::to_string),
            s(other),
        ]
    }

    fn raw_table(rows: Vec<Vec<Option<String>>>) -> Table {
        Table::with_rows(raw_columns(), rows).unwrap()
    }

    #[test]
    fn test_reference_row() {
        let raw = raw_table(vec![raw_row("2023-05-01", "12.50", None, "x")]);

        let clean = Cleaner::new().clean(raw).unwrap();

        assert_eq!(
            clean.columns(),
            &["id_transaction", "date", "shipping_cost", "insurance", "other"]
        );
        assert_eq!(
            clean.rows()[0],
            vec![
                s("ID1-20230501_1250"),
                s("2023-05-01"),
                s("12.50"),
                s("No Insurance"),
                s("x")
            ]
        );
    }

    #[test]
    fn test_duplicates_removed_and_positions_kept() {
        let raw = raw_table(vec![
            raw_row("2023-05-01", "12.50", Some("Full"), "a"),
            raw_row("2023-05-01", "12.50", Some("Full"), "a"),
            raw_row("2023-05-02", "3.00", Some("None"), "b"),
            raw_row("2023-05-01", "12.50", Some("Full"), "a"),
            raw_row("2023-05-03", "4", None, "c"),
        ]);

        let clean = Cleaner::new().clean(raw).unwrap();

        let ids: Vec<_> = clean.column_values(ID_COLUMN).unwrap().flatten().collect();
        assert_eq!(
            ids,
            vec!["ID1-20230501_1250", "ID3-20230502_300", "ID5-20230503_4"]
        );

        let unique: HashSet<_> = clean.rows().iter().collect();
        assert_eq!(unique.len(), clean.len());

        let insurance: Vec<_> = clean.column_values("insurance").unwrap().collect();
        assert_eq!(
            insurance,
            vec![Some("Full"), Some("No Insurance"), Some("No Insurance")]
        );
    }

    #[test]
    fn test_rows_differing_only_by_case_are_not_duplicates() {
        let raw = raw_table(vec![
            raw_row("2023-05-01", "1.00", Some("Full"), "x"),
            raw_row("2023-05-01", "1.00", Some("Full"), "X"),
        ]);
        assert_eq!(Cleaner::new().clean(raw).unwrap().len(), 2);
    }

    #[test]
    fn test_existing_identifier_column_is_replaced() {
        let mut columns = raw_columns();
        columns.push("ID_Transaction".to_string());
        let mut row = raw_row("2023-05-01", "12.50", Some("Full"), "x");
        row.push(s("stale"));
        let raw = Table::with_rows(columns, vec![row]).unwrap();

        let clean = Cleaner::new().clean(raw).unwrap();

        assert_eq!(clean.columns()[0], ID_COLUMN);
        assert_eq!(
            clean.columns().iter().filter(|c| *c == ID_COLUMN).count(),
            1
        );
        assert_eq!(clean.get(0, ID_COLUMN), Some("ID1-20230501_1250"));
    }

    #[test]
    fn test_timestamps_promote_date_column() {
        let raw = raw_table(vec![
            raw_row("2023-05-01", "1.00", None, "a"),
            raw_row("2023-05-02 09:10:00", "2.00", None, "b"),
        ]);

        let clean = Cleaner::new().clean(raw).unwrap();

        let dates: Vec<_> = clean.column_values("date").unwrap().flatten().collect();
        assert_eq!(dates, vec!["2023-05-01 00:00:00", "2023-05-02 09:10:00"]);
        assert_eq!(clean.get(1, ID_COLUMN), Some("ID2-20230502091000_200"));
    }

    #[test]
    fn test_missing_column_is_data_shape_error() {
        let raw = Table::with_rows(
            vec!["date".to_string(), "shipping_cost".to_string(), "insurance".to_string()],
            vec![vec![s("2023-05-01"), s("1.00"), None]],
        )
        .unwrap();

        let err = Cleaner::new().clean(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data shape error: missing column(s): day, month, year"
        );
    }

    #[test]
    fn test_bad_values_are_data_shape_errors() {
        let mut absent_cost = raw_row("2023-05-01", "1.00", None, "a");
        absent_cost[4] = None;
        let mut absent_date = raw_row("2023-05-01", "1.00", None, "a");
        absent_date[0] = None;

        let cases = vec![
            raw_row("01-05-2023x", "1.00", None, "a"),
            raw_row("2023-05-01", "12,50", None, "a"),
            absent_cost,
            absent_date,
        ];
        for row in cases {
            let err = Cleaner::new().clean(raw_table(vec![row])).unwrap_err();
            assert!(matches!(err, PipelineError::DataShapeError(_)), "{err}");
        }
    }

    #[test]
    fn test_bad_date_reports_raw_position() {
        let raw = raw_table(vec![
            raw_row("2023-05-01", "1.00", None, "a"),
            raw_row("2023-05-01", "1.00", None, "a"),
            raw_row("not a date", "1.00", None, "b"),
        ]);

        let err = Cleaner::new().clean(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data shape error: row 3: unparsable date \"not a date\""
        );
    }

    #[test]
    fn test_header_only_input() {
        let clean = Cleaner::new().clean(raw_table(Vec::new())).unwrap();
        assert!(clean.is_empty());
        assert_eq!(
            clean.columns(),
            &["id_transaction", "date", "shipping_cost", "insurance", "other"]
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data_raw.csv");
        let output = dir.path().join("data_clean.csv");

        let raw = raw_table(vec![
            raw_row("2023-05-01", "12.50", None, "Road, \"Pro\""),
            raw_row("2023-05-02", "3.10", Some("Full"), "Mountain"),
            raw_row("2023-05-01", "12.50", None, "Road, \"Pro\""),
        ]);
        write_table(&input, &raw).unwrap();

        let cleaner = Cleaner::new();
        let report = cleaner.run(&input, &output).unwrap();
        let first = std::fs::read(&output).unwrap();
        cleaner.run(&input, &output).unwrap();
        let second = std::fs::read(&output).unwrap();

        assert_eq!(report.stage, StageName::Clean);
        assert_eq!(report.rows, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data_raw.csv");
        let output = dir.path().join("data_clean.csv");
        write_table(&input, &raw_table(vec![raw_row("garbage", "1.00", None, "a")])).unwrap();

        assert!(Cleaner::new().run(&input, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_run_without_input_is_missing_input() {
        let dir = tempdir().unwrap();
        let err = Cleaner::new()
            .run(&dir.path().join("data_raw.csv"), &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
