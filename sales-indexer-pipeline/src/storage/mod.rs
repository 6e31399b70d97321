//! Intermediate file hand-off between stages.
//!
//! Stages never share memory: each one writes a CSV file that the next one
//! reads. Files live in a directory private to the run and are written
//! atomically, so a reader only ever sees a complete file or no file.

mod csv_file;
mod run_dir;

pub use csv_file::{read_table, write_table};
pub use run_dir::{FileLayout, RunDirectory};
