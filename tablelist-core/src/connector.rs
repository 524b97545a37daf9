//! Connector traits and the scheme registry used to resolve them.
//!
//! A run holds three resources, each borrowed from the previous one:
//!
//! ```text
//! Session (connection) ──&mut──▶ Statement ──&mut──▶ RowStream (result set)
//! ```
//!
//! The borrows make the release order a compile-time property: the row
//! stream is dropped before the statement, and the statement before the
//! session is closed. [`Session::close`] takes the session by value so it
//! runs at most once.
//!
//! Connectors are not registered globally. Callers build a
//! [`ConnectorRegistry`], usually with
//! [`ConnectorRegistry::with_default_drivers`], and pass it to the runner.

use crate::error::{Result, TableListError};
use crate::models::TableRow;
use crate::security::{Credentials, mask_url_password, strip_jdbc_prefix};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lazy, forward-only stream of result rows.
pub type RowStream<'a> = BoxStream<'a, Result<TableRow>>;

/// Factory for database sessions, one per supported engine.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human-readable engine name, e.g. `PostgreSQL`
    fn name(&self) -> &'static str;

    /// Example URL shown by the `drivers` command
    fn example_url(&self) -> &'static str;

    /// Opens one connection to `url`, authenticating with `credentials`.
    ///
    /// Credentials take precedence over any userinfo embedded in the URL.
    ///
    /// # Errors
    /// Returns [`TableListError::Connection`] if the URL is rejected by the
    /// driver or the connection attempt fails.
    async fn connect(&self, url: &str, credentials: &Credentials) -> Result<Box<dyn Session>>;
}

/// An open connection.
#[async_trait]
pub trait Session: Send {
    /// Creates a statement bound to this connection.
    ///
    /// # Errors
    /// Returns [`TableListError::Statement`] if the connection cannot serve
    /// a statement.
    async fn create_statement<'s>(&'s mut self) -> Result<Box<dyn Statement + 's>>;

    /// Closes the connection gracefully.
    ///
    /// # Errors
    /// Returns [`TableListError::Connection`] if the close handshake fails.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A statement handle able to run one query.
pub trait Statement: Send {
    /// Executes `sql` and returns its rows as a lazy stream.
    ///
    /// Nothing is sent to the server until the stream is first polled.
    /// Execution and decoding failures are yielded as
    /// [`TableListError::QueryExecution`] items.
    fn execute_query(&mut self, sql: &'static str) -> RowStream<'_>;
}

/// Extracts the lower-cased scheme of a connection URL.
///
/// A leading `jdbc:` is ignored, so `jdbc:mysql://host/db` resolves like
/// `mysql://host/db`. Returns `None` when there is no `:`-terminated scheme.
///
/// ```rust
/// use tablelist_core::connector::url_scheme;
///
/// assert_eq!(url_scheme("jdbc:PostgreSQL://db/shop").as_deref(), Some("postgresql"));
/// assert_eq!(url_scheme("localhost:5432"), Some("localhost".to_string()));
/// assert_eq!(url_scheme("no-scheme"), None);
/// ```
#[must_use]
pub fn url_scheme(url: &str) -> Option<String> {
    let bare = strip_jdbc_prefix(url.trim());
    let (scheme, _) = bare.split_once(':')?;

    let valid = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then(|| scheme.to_ascii_lowercase())
}

/// Explicit mapping from URL scheme to connector.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every driver compiled into this build.
    #[must_use]
    pub fn with_default_drivers() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "postgresql")]
        {
            let postgres: Arc<dyn Connector> =
                Arc::new(crate::drivers::postgres::PostgresConnector);
            registry.register_shared("postgres", Arc::clone(&postgres));
            registry.register_shared("postgresql", postgres);
        }

        #[cfg(feature = "mysql")]
        {
            let mysql: Arc<dyn Connector> = Arc::new(crate::drivers::mysql::MySqlConnector);
            registry.register_shared("mysql", Arc::clone(&mysql));
            registry.register_shared("mariadb", mysql);
        }

        registry
    }

    /// Registers `connector` for `scheme`, replacing any previous entry.
    pub fn register<C>(&mut self, scheme: &str, connector: C) -> &mut Self
    where
        C: Connector + 'static,
    {
        self.register_shared(scheme, Arc::new(connector))
    }

    /// Registers an already shared connector for `scheme`.
    pub fn register_shared(&mut self, scheme: &str, connector: Arc<dyn Connector>) -> &mut Self {
        self.connectors.insert(scheme.to_ascii_lowercase(), connector);
        self
    }

    /// Finds the connector claiming the scheme of `url`.
    ///
    /// # Errors
    /// Returns [`TableListError::DriverResolution`] naming the (masked) URL
    /// when no connector is registered for its scheme.
    pub fn resolve(&self, url: &str) -> Result<Arc<dyn Connector>> {
        let connector = url_scheme(url).and_then(|scheme| self.connectors.get(&scheme));

        match connector {
            Some(connector) => {
                tracing::debug!(
                    driver = connector.name(),
                    url = %mask_url_password(url),
                    "driver resolved"
                );
                Ok(Arc::clone(connector))
            }
            None => Err(TableListError::driver_not_found(url)),
        }
    }

    /// Registered schemes with the connector serving each, in scheme order.
    pub fn schemes(&self) -> impl Iterator<Item = (&str, &dyn Connector)> {
        self.connectors
            .iter()
            .map(|(scheme, connector)| (scheme.as_str(), connector.as_ref()))
    }

    /// Whether no connector is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.connectors.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}
