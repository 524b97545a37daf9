//! In-memory connector for tests, compiled with the `memory` feature.
//!
//! Serves a fixed set of [`TableRow`]s sorted the way [`TABLES_QUERY`] sorts
//! them, can be told to fail or hang at any step of a run, and records every
//! acquire/release in an event log shared by all its clones.
//!
//! # Example
//! ```
//! use tablelist_core::drivers::memory::MemoryConnector;
//! use tablelist_core::models::TableRow;
//! use tablelist_core::ConnectorRegistry;
//!
//! let connector = MemoryConnector::new().with_row(TableRow::new("PUBLIC", "ACCOUNTS", "TABLE"));
//! let mut registry = ConnectorRegistry::new();
//! registry.register("memory", connector.clone());
//!
//! assert!(connector.events().is_empty());
//! ```
//!
//! [`TABLES_QUERY`]: crate::models::TABLES_QUERY

use crate::connector::{Connector, RowStream, Session, Statement};
use crate::error::{Result, TableListError};
use crate::models::TableRow;
use crate::security::{Credentials, mask_url_password};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex, PoisonError};

/// Step at which a [`MemoryConnector`] run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Opening the connection
    Connect,
    /// Creating the statement
    Statement,
    /// Executing the query, before any row
    Query,
    /// Fetching the row at this zero-based index
    Row(usize),
    /// Closing the connection
    Close,
    /// Opening the connection never completes
    StallConnect,
    /// The row at this zero-based index is never delivered
    StallRow(usize),
}

/// Acquire and release events, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A connection was opened for this user
    Connected {
        /// Account the connection was opened for
        username: String,
    },
    /// A statement was created
    StatementCreated,
    /// The query was sent
    QueryExecuted {
        /// Statement text
        sql: String,
    },
    /// The result set was released
    ResultSetReleased,
    /// The statement was released
    StatementReleased,
    /// The connection was closed
    ConnectionClosed,
}

type EventLog = Arc<Mutex<Vec<LifecycleEvent>>>;

fn record(events: &EventLog, event: LifecycleEvent) {
    events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(event);
}

/// Connector serving rows from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    rows: Vec<TableRow>,
    failure: Option<FailurePoint>,
    events: EventLog,
}

impl MemoryConnector {
    /// Creates a connector with no rows that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row to the result set.
    #[must_use]
    pub fn with_row(mut self, row: TableRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Adds several rows to the result set.
    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = TableRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Makes runs fail at `point`.
    #[must_use]
    pub const fn failing_at(mut self, point: FailurePoint) -> Self {
        self.failure = Some(point);
        self
    }

    /// Events recorded so far, shared by all clones of this connector.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.failure == Some(point)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn name(&self) -> &'static str {
        "Memory"
    }

    fn example_url(&self) -> &'static str {
        "memory://local/db"
    }

    async fn connect(&self, url: &str, credentials: &Credentials) -> Result<Box<dyn Session>> {
        if self.fails_at(FailurePoint::Connect) {
            return Err(TableListError::connection_failed(url, "connection refused"));
        }
        if self.fails_at(FailurePoint::StallConnect) {
            futures::future::pending::<()>().await;
        }

        record(
            &self.events,
            LifecycleEvent::Connected {
                username: credentials.username().to_string(),
            },
        );

        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        Ok(Box::new(MemorySession {
            connector: Self {
                rows,
                failure: self.failure,
                events: Arc::clone(&self.events),
            },
            url: mask_url_password(url),
        }))
    }
}

#[derive(Debug)]
struct MemorySession {
    connector: MemoryConnector,
    url: String,
}

#[async_trait]
impl Session for MemorySession {
    async fn create_statement<'s>(&'s mut self) -> Result<Box<dyn Statement + 's>> {
        if self.connector.fails_at(FailurePoint::Statement) {
            return Err(TableListError::statement_failed("connection is read-only"));
        }

        record(&self.connector.events, LifecycleEvent::StatementCreated);
        Ok(Box::new(MemoryStatement { session: &*self }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        record(&self.connector.events, LifecycleEvent::ConnectionClosed);

        if self.connector.fails_at(FailurePoint::Close) {
            return Err(TableListError::connection_failed(
                &self.url,
                "close handshake failed",
            ));
        }
        Ok(())
    }
}

struct MemoryStatement<'s> {
    session: &'s MemorySession,
}

impl Statement for MemoryStatement<'_> {
    fn execute_query(&mut self, sql: &'static str) -> RowStream<'_> {
        let connector = &self.session.connector;
        let cursor = Cursor {
            rows: connector.rows.clone().into_iter(),
            position: 0,
            failure: connector.failure,
            events: Arc::clone(&connector.events),
            sql,
            executed: false,
            exhausted: false,
        };

        futures::stream::unfold(cursor, |mut cursor| async move {
            if cursor.stalls() {
                futures::future::pending::<()>().await;
            }
            let item = cursor.advance()?;
            Some((item, cursor))
        })
        .boxed()
    }
}

impl Drop for MemoryStatement<'_> {
    fn drop(&mut self) {
        record(&self.session.connector.events, LifecycleEvent::StatementReleased);
    }
}

/// Forward-only position in the result set.
struct Cursor {
    rows: std::vec::IntoIter<TableRow>,
    position: usize,
    failure: Option<FailurePoint>,
    events: EventLog,
    sql: &'static str,
    executed: bool,
    exhausted: bool,
}

impl Cursor {
    /// Sends the query on first use.
    fn execute(&mut self) -> Result<()> {
        if self.executed {
            return Ok(());
        }

        self.executed = true;
        record(
            &self.events,
            LifecycleEvent::QueryExecuted {
                sql: self.sql.to_string(),
            },
        );
        if self.failure == Some(FailurePoint::Query) {
            return Err(TableListError::query_failed(
                self.sql,
                "relation \"information_schema.tables\" does not exist",
            ));
        }
        Ok(())
    }

    /// Whether the next fetch hangs. The query itself is sent first.
    fn stalls(&mut self) -> bool {
        !self.exhausted
            && self.failure == Some(FailurePoint::StallRow(self.position))
            && self.execute().is_ok()
    }

    fn advance(&mut self) -> Option<Result<TableRow>> {
        if self.exhausted {
            return None;
        }

        if let Err(error) = self.execute() {
            self.exhausted = true;
            return Some(Err(error));
        }

        let Some(row) = self.rows.next() else {
            self.exhausted = true;
            return None;
        };

        let index = self.position;
        self.position = self.position.saturating_add(1);
        if self.failure == Some(FailurePoint::Row(index)) {
            self.exhausted = true;
            return Some(Err(TableListError::query_failed(
                self.sql,
                format!("connection reset while reading row {index}"),
            )));
        }

        Some(Ok(row))
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        record(&self.events, LifecycleEvent::ResultSetReleased);
    }
}
