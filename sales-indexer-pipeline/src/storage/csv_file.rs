//! CSV encoding of tables.
//!
//! RFC 4180 via the `csv` crate: comma delimiter, header row, fields with
//! commas, quotes or line breaks are quoted. An absent field is written as
//! an empty field, and an empty field reads back as absent.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::PipelineError;
use sales_indexer_shared::Table;

/// Write `table` to `path`, replacing any existing file atomically.
///
/// The data goes to a temporary file in the destination directory, is
/// synced, and is then renamed over `path`. If anything fails before the
/// rename, `path` is left untouched and the temporary file is removed.
pub fn write_table(path: &Path, table: &Table) -> Result<(), PipelineError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file_mut());
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|f| f.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
    }
    temp.as_file_mut().flush()?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| PipelineError::IoError(e.error))?;

    debug!(path = %path.display(), rows = table.len(), "Wrote intermediate file");
    Ok(())
}

/// Read a table written by [`write_table`].
///
/// A missing file is reported as [`PipelineError::MissingInput`]; a row with
/// the wrong number of fields is a data shape error.
pub fn read_table(path: &Path) -> Result<Table, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record.map_err(|e| match e.kind() {
            csv::ErrorKind::UnequalLengths { .. } => PipelineError::data_shape(e.to_string()),
            _ => PipelineError::CsvError(e),
        })?;
        table.push_row(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        )?;
    }

    debug!(path = %path.display(), rows = table.len(), "Read intermediate file");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_round_trip_preserves_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_raw.csv");

        let table = Table::with_rows(
            vec!["date".to_string(), "product".to_string(), "insurance".to_string()],
            vec![
                vec![s("2023-05-01"), s("Road Bike, \"Pro\" edition"), None],
                vec![s("2023-05-02"), s("line one\nline two"), s("Full")],
                vec![s("2023-05-03"), s("  padded  "), s("None")],
            ],
        )
        .unwrap();

        write_table(&path, &table).unwrap();
        let read = read_table(&path).unwrap();

        assert_eq!(read, table);
    }

    #[test]
    fn test_header_only_file_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let table = Table::new(vec!["a".to_string(), "b".to_string()]);

        write_table(&path, &table).unwrap();
        let read = read_table(&path).unwrap();

        assert_eq!(read.columns(), table.columns());
        assert!(read.is_empty());
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_clean.csv");

        let first = Table::with_rows(vec!["a".to_string()], vec![vec![s("1")], vec![s("2")]]).unwrap();
        let second = Table::with_rows(vec!["a".to_string()], vec![vec![s("3")]]).unwrap();

        write_table(&path, &first).unwrap();
        write_table(&path, &second).unwrap();

        assert_eq!(read_table(&path).unwrap(), second);
        // Only the target file remains; no stray temporary files.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run").join("data_raw.csv");
        write_table(&path, &Table::new(vec!["a".to_string()])).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(read_table(&path), Err(PipelineError::MissingInput(p)) if p == path));
    }

    #[test]
    fn test_ragged_row_is_data_shape_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        assert!(matches!(read_table(&path), Err(PipelineError::DataShapeError(_))));
    }
}
