//! Error types with credential sanitization.
//!
//! Every URL that ends up inside an error message is passed through
//! [`mask_url_password`] first, so passwords embedded in a connection
//! string never reach standard error or the logs.
//!
//! [`mask_url_password`]: crate::security::mask_url_password

use std::time::Duration;
use thiserror::Error;

/// Boxed source error carried by the driver-facing variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for tablelist operations.
///
/// Each variant corresponds to one failed step of a run; none of them is
/// retried.
#[derive(Debug, Error)]
pub enum TableListError {
    /// A required environment variable is unset or empty
    #[error("Could not find a non-empty environment variable named: \"{name}\"")]
    MissingVariable {
        /// Name of the variable
        name: &'static str,
    },

    /// Invalid runtime configuration (CLI options, logging setup)
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },

    /// No registered connector claims the URL scheme
    #[error("Could not find any suitable driver using URL: \"{url}\"")]
    DriverResolution {
        /// URL with its password masked
        url: String,
    },

    /// The connector accepted the URL but the connection attempt failed
    #[error("Could not connect to the underlying database using URL: \"{url}\"")]
    Connection {
        /// URL with its password masked
        url: String,
        /// Driver error or [`TimedOut`]
        #[source]
        source: BoxError,
    },

    /// A statement could not be created on an open connection
    #[error("Failed to create statement")]
    Statement {
        /// Driver error
        #[source]
        source: BoxError,
    },

    /// The fixed query failed to execute or to iterate
    #[error("Failed to execute query: \"{query}\"")]
    QueryExecution {
        /// Text of the failed query
        query: &'static str,
        /// Driver error or [`TimedOut`]
        #[source]
        source: BoxError,
    },

    /// Writing the report failed
    #[error("Failed to write report output")]
    Output {
        /// Underlying write error
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with `TableListError`
pub type Result<T> = std::result::Result<T, TableListError>;

/// Raised when a bounded wait on the database elapses.
#[derive(Debug, Error)]
#[error("timed out after {0:?}")]
pub struct TimedOut(pub Duration);

impl TableListError {
    /// Creates a missing-variable error for `name`
    #[must_use]
    pub const fn missing_variable(name: &'static str) -> Self {
        Self::MissingVariable { name }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a driver resolution error with the URL password masked
    #[must_use]
    pub fn driver_not_found(url: &str) -> Self {
        Self::DriverResolution {
            url: crate::security::mask_url_password(url),
        }
    }

    /// Creates a connection error with the URL password masked
    pub fn connection_failed<E>(url: &str, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Connection {
            url: crate::security::mask_url_password(url),
            source: error.into(),
        }
    }

    /// Creates a statement creation error
    pub fn statement_failed<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Statement {
            source: error.into(),
        }
    }

    /// Creates a query execution error for `query`
    pub fn query_failed<E>(query: &'static str, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::QueryExecution {
            query,
            source: error.into(),
        }
    }

    /// Name of the run step this error belongs to, used in logs.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::MissingVariable { .. } | Self::Configuration { .. } => "configuration",
            Self::DriverResolution { .. } => "driver resolution",
            Self::Connection { .. } => "connection",
            Self::Statement { .. } => "statement",
            Self::QueryExecution { .. } => "query execution",
            Self::Output { .. } => "output",
        }
    }
}

impl From<std::io::Error> for TableListError {
    fn from(source: std::io::Error) -> Self {
        Self::Output { source }
    }
}
