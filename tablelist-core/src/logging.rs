//! Logging setup for the tablelist binary.
//!
//! Logs go to standard error so standard output carries only the
//! configuration echo and the report.

use crate::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Maps the CLI verbosity flags to a maximum log level.
///
/// `quiet` wins over any `-v`. Without flags only warnings and errors are
/// shown.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// `RUST_LOG`, when set, takes precedence over the computed level.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
///
/// # Example
/// ```rust,no_run
/// use tablelist_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbose, quiet).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::TableListError::configuration(format!(
                "Failed to initialize logging: {e}"
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    // Logging can only be initialized once per test process, so only the
    // level mapping is exercised here.
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let test_cases = [
            ((true, 0), LevelFilter::ERROR),
            ((true, 5), LevelFilter::ERROR),
            ((false, 0), LevelFilter::WARN),
            ((false, 1), LevelFilter::INFO),
            ((false, 2), LevelFilter::DEBUG),
            ((false, 3), LevelFilter::TRACE),
            ((false, 10), LevelFilter::TRACE),
        ];

        for ((quiet, verbose), expected) in test_cases {
            assert_eq!(
                level_for(verbose, quiet),
                expected,
                "Failed for quiet={quiet}, verbose={verbose}"
            );
        }
    }
}
