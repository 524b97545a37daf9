//! One run: resolve, connect, query, print, release.
//!
//! ```text
//! ConfigLoaded → DriverResolved → Connected → StatementOpen → QueryExecuting
//!     → RowStreaming (per row) → Cleanup → Done
//! ```
//!
//! Any step may fail. Resources acquired up to that point are released in
//! reverse order before the error is returned. The header is only printed
//! once the query has produced its first result, so a query that fails to
//! execute leaves no partial report behind.

use crate::config::{DatabaseSettings, RunOptions};
use crate::connector::{ConnectorRegistry, RowStream, Session};
use crate::error::{Result, TableListError, TimedOut};
use crate::models::{TABLES_QUERY, TableRow};
use crate::report::TableReport;
use crate::security::mask_url_password;
use futures::TryStreamExt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Steps of a run, as reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Settings read from the environment
    ConfigLoaded,
    /// A connector claimed the URL
    DriverResolved,
    /// The connection is open
    Connected,
    /// The statement is open
    StatementOpen,
    /// The query was sent, waiting for its first result
    QueryExecuting,
    /// Rows are being printed
    RowStreaming,
    /// Resources are being released
    Cleanup,
    /// The report is complete
    Done,
    /// A step failed
    Failed,
}

fn enter(state: RunState) {
    debug!(?state, "run state");
}

/// Prints the table report for `settings` to `out`.
///
/// Returns the number of data rows printed.
///
/// # Errors
/// Returns the error of the first step that failed. Nothing is written to
/// `out` when the failure happens before the query yields its first result.
///
/// # Example
/// ```rust,no_run
/// use tablelist_core::config::{DatabaseSettings, RunOptions};
/// use tablelist_core::security::Credentials;
/// use tablelist_core::{ConnectorRegistry, list_tables};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tablelist_core::TableListError> {
/// let registry = ConnectorRegistry::with_default_drivers();
/// let settings = DatabaseSettings {
///     url: "postgres://localhost:5432/shop".to_string(),
///     credentials: Credentials::new("alice".to_string(), "secret".to_string()),
/// };
///
/// let rows = list_tables(&registry, &settings, &RunOptions::default(), std::io::stdout()).await?;
/// eprintln!("{rows} tables");
/// # Ok(())
/// # }
/// ```
pub async fn list_tables<W: Write>(
    registry: &ConnectorRegistry,
    settings: &DatabaseSettings,
    options: &RunOptions,
    out: W,
) -> Result<usize> {
    enter(RunState::ConfigLoaded);
    options.validate()?;

    let result = run(registry, settings, options, out).await;
    match &result {
        Ok(rows) => {
            enter(RunState::Done);
            info!(rows, "table report complete");
        }
        Err(error) => {
            enter(RunState::Failed);
            debug!(step = error.step(), %error, "run failed");
        }
    }
    result
}

async fn run<W: Write>(
    registry: &ConnectorRegistry,
    settings: &DatabaseSettings,
    options: &RunOptions,
    out: W,
) -> Result<usize> {
    let connector = registry.resolve(&settings.url)?;
    enter(RunState::DriverResolved);

    info!(
        driver = connector.name(),
        url = %mask_url_password(&settings.url),
        "connecting"
    );
    let mut session = bounded(
        options.connect_timeout,
        connector.connect(&settings.url, &settings.credentials),
    )
    .await
    .map_err(|elapsed| TableListError::connection_failed(&settings.url, elapsed))??;
    enter(RunState::Connected);

    let outcome = print_report(session.as_mut(), options, out).await;

    enter(RunState::Cleanup);
    let closed = session.close().await;
    debug!("connection released");

    match (outcome, closed) {
        (Ok(rows), Ok(())) => Ok(rows),
        (Ok(_), Err(error)) | (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            warn!(error = %close_error, "failed to close the connection after an earlier failure");
            Err(error)
        }
    }
}

/// Runs the statement and result-set part of a run on an open session.
async fn print_report<W: Write>(
    session: &mut dyn Session,
    options: &RunOptions,
    out: W,
) -> Result<usize> {
    let mut statement = session.create_statement().await?;
    enter(RunState::StatementOpen);

    let mut rows = statement.execute_query(TABLES_QUERY);
    enter(RunState::QueryExecuting);

    let mut next = next_row(&mut rows, options.query_timeout).await?;
    enter(RunState::RowStreaming);

    let mut report = TableReport::begin(out)?;
    while let Some(row) = next {
        report.write_row(&row)?;
        next = next_row(&mut rows, options.query_timeout).await?;
    }
    let count = report.finish()?;

    drop(rows);
    debug!("result set released");
    drop(statement);
    debug!("statement released");

    Ok(count)
}

async fn next_row(rows: &mut RowStream<'_>, limit: Option<Duration>) -> Result<Option<TableRow>> {
    bounded(limit, rows.try_next())
        .await
        .map_err(|elapsed| TableListError::query_failed(TABLES_QUERY, elapsed))?
}

/// Awaits `future`, giving up after `limit` when one is set.
async fn bounded<F: Future>(
    limit: Option<Duration>,
    future: F,
) -> std::result::Result<F::Output, TimedOut> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| TimedOut(limit)),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result = bounded(
            Some(Duration::from_secs(5)),
            tokio::time::sleep(Duration::from_secs(60)),
        )
        .await;

        let error = result.err().unwrap();
        assert_eq!(error.0, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_bounded_without_limit_waits() {
        let value = bounded(None, async { 42 }).await.unwrap();
        assert_eq!(value, 42);
    }
}
