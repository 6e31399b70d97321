//! PostgreSQL implementation of the record source.

mod descriptor;
mod source;
mod value;

pub use descriptor::ConnectionDescriptor;
pub use source::PostgresSource;
