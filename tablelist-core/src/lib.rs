//! Core library for tablelist.
//!
//! tablelist connects to a relational database, runs one fixed query
//! against `INFORMATION_SCHEMA.TABLES` and prints the result as a
//! fixed-width report. This crate holds everything except the command line.
//!
//! # Security Guarantees
//! - The only statement sent is a read-only SELECT on the information schema
//! - Credentials are zeroized on drop and never logged
//! - Passwords embedded in connection URLs are masked in logs and errors
//!
//! # Architecture
//! - Explicit [`ConnectorRegistry`] mapping URL schemes to connectors
//! - Borrow-scoped connection, statement and result-set handles
//! - A single error type naming the step that failed

pub mod config;
pub mod connector;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod runner;
pub mod security;

// Re-export commonly used types
pub use config::{DatabaseSettings, EchoPolicy, RunOptions};
pub use connector::{Connector, ConnectorRegistry, RowStream, Session, Statement};
pub use error::{Result, TableListError};
pub use logging::init_logging;
pub use models::{TABLES_QUERY, TableRow};
pub use report::TableReport;
pub use runner::{RunState, list_tables};
pub use security::Credentials;
