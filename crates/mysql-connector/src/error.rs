//! Error types for mysql-connector
//!
//! Three kinds matter to callers:
//! - Validation: bad arguments, raised before any I/O
//! - Connection: the driver could not open, keep or close a connection
//! - Database: a statement was rejected by the server
//!
//! Driver errors are kept as the `source` of the wrapping error, so the full
//! cause chain stays available through [`std::error::Error::source`].

use std::fmt;
use thiserror::Error;

/// Result type for mysql-connector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid user, table, column or datatype arguments
    Validation,
    /// Connect, close or transport failure
    Connection,
    /// Statement execution failure
    Database,
    /// Configuration could not be read or parsed
    Configuration,
    /// Failure inside the connector itself
    Internal,
}

/// Main error type for mysql-connector
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Argument rejected before any I/O happened
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Connection could not be opened, used or closed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Statement execution failed
    #[error("database error: {message}")]
    Database {
        message: String,
        sql: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Internal error
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Database { .. } => ErrorCategory::Database,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// SQL text of the failed statement, when known
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Database { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error returned when an operation needs a live connection and there is none
    pub fn not_connected() -> Self {
        Self::connection("not connected")
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create a database error carrying the statement text
    pub fn database_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql: Some(sql.into()),
            source: None,
        }
    }

    /// Create a database error with statement text and source
    pub fn database_with_source(
        message: impl Into<String>,
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql: Some(sql.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with source
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Connection => write!(f, "connection"),
            Self::Database => write!(f, "database"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
