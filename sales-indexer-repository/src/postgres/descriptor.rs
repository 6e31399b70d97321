//! Connection descriptor for the relational source.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

use crate::errors::SourceError;

/// Where and as whom to connect to the source database.
///
/// Either a full connection URL or the individual parts. Validity (host
/// reachable, credentials accepted) is only discovered when the extractor
/// runs.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    /// A `postgres://` connection URL.
    Url(String),
    /// Individual connection parts.
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl ConnectionDescriptor {
    /// Build the sqlx connect options for this descriptor.
    pub fn connect_options(&self) -> Result<PgConnectOptions, SourceError> {
        match self {
            Self::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|e| SourceError::connection(format!("Invalid database URL: {}", e))),
            Self::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

// Credentials never reach logs.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => f.debug_tuple("Url").field(&"<redacted>").finish(),
            Self::Parts {
                host,
                port,
                user,
                database,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"<redacted>")
                .field("database", database)
                .finish(),
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => write!(f, "<database url>"),
            Self::Parts {
                host,
                port,
                database,
                ..
            } => write!(f, "{}:{}/{}", host, port, database),
        }
    }
}
