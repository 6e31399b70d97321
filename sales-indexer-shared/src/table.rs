//! Column-ordered tabular data.
//!
//! A [`Table`] is what the extractor pulls from the source, what the cleaner
//! rewrites, and what the loader turns into documents. Values are kept as
//! text so nothing is lost between stages; `None` marks an absent value.

use std::collections::HashSet;

use thiserror::Error;

/// A single cell. `None` is an absent (SQL `NULL`, empty CSV) value.
pub type Field = Option<String>;

/// Errors raised when a table would become ragged or inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row does not have one field per column.
    #[error("row {row} has {found} fields, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A column with this name already exists.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column-wide insert did not provide one value per row.
    #[error("column {column} has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Ordered columns and ordered rows of text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and rows, checking every row's width.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Field>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row. The row must have exactly one field per column.
    pub fn push_row(&mut self, row: Vec<Field>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    /// Number of rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`, if both exist and the value is present.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Consume the table into its header and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Field>>) {
        (self.columns, self.rows)
    }

    /// Iterate rows as `(column, value)` pairs in column order.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, Option<&str>)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(|f| f.as_deref()))
                .collect()
        })
    }

    /// Values of one column in row order, or `None` if the column is missing.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = Option<&str>> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_deref()))
    }

    /// Replace every value of a column in row order. Returns `false` if the
    /// column does not exist.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(Field) -> Field,
    {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            let value = row[index].take();
            row[index] = f(value);
        }
        true
    }

    /// Rename every column. The new names must be unique and one per column.
    pub fn rename_columns<F>(&mut self, mut f: F) -> Result<(), TableError>
    where
        F: FnMut(&str) -> String,
    {
        let renamed: Vec<String> = self.columns.iter().map(|c| f(c.as_str())).collect();
        for (i, name) in renamed.iter().enumerate() {
            if renamed[..i].contains(name) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        self.columns = renamed;
        Ok(())
    }

    /// Remove rows equal to an earlier row, keeping first occurrences in order.
    ///
    /// Returns the 1-based positions, in the original table, of the rows kept.
    pub fn dedup_rows(&mut self) -> Vec<usize> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        let mut positions = Vec::with_capacity(self.rows.len());
        let mut kept = Vec::with_capacity(self.rows.len());

        for (index, row) in self.rows.drain(..).enumerate() {
            if seen.insert(row.clone()) {
                positions.push(index + 1);
                kept.push(row);
            }
        }

        self.rows = kept;
        positions
    }

    /// Remove a column and its values. Returns `false` if it did not exist.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Insert a column at `position` with one value per existing row.
    pub fn insert_column(
        &mut self,
        position: usize,
        name: impl Into<String>,
        values: Vec<Field>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.column_index(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name,
                expected: self.rows.len(),
                found: values.len(),
            });
        }

        let position = position.min(self.columns.len());
        self.columns.insert(position, name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(position, value);
        }
        Ok(())
    }
}
