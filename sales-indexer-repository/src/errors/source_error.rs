//! Relational source error types.

use thiserror::Error;

/// Errors that can occur while reading from the relational source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached or refused the connection.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The query failed to prepare or execute.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A column uses a type the source cannot render as text.
    #[error("Unsupported type {type_name} in column {column}")]
    UnsupportedType { column: String, type_name: String },

    /// A value could not be decoded from the wire format.
    #[error("Decode error in column {column}: {message}")]
    DecodeError { column: String, message: String },
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a decode error for `column`.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            column: column.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for SourceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => Self::ConnectionError(err.to_string()),
            other => Self::QueryError(other.to_string()),
        }
    }
}
