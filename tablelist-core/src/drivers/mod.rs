//! Connector implementations.
//!
//! # Module Structure
//! - `memory`: rows served from memory, with scripted failures (feature `memory`)
//! - `postgres`: PostgreSQL over `sqlx` (feature `postgresql`)
//! - `mysql`: MySQL and MariaDB over `sqlx` (feature `mysql`)

#[cfg(any(test, feature = "memory"))]
pub mod memory;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mysql")]
pub mod mysql;
