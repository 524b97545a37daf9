//! MySQL connector on a single `sqlx` connection.
//!
//! Also serves `mariadb://` URLs, which speak the same protocol.

use crate::connector::{Connector, RowStream, Session, Statement};
use crate::error::{Result, TableListError};
use crate::models::TableRow;
use crate::security::{Credentials, mask_url_password, strip_jdbc_prefix};
use async_trait::async_trait;
use futures::StreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row};
use std::str::FromStr;

/// Connector for `mysql://` and `mariadb://` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    /// Builds connect options from `url` with `credentials` applied.
    ///
    /// sqlx only understands the `mysql` scheme, so `mariadb://` is
    /// rewritten before parsing.
    ///
    /// # Errors
    /// Returns a connection error if the URL cannot be parsed.
    pub fn connect_options(url: &str, credentials: &Credentials) -> Result<MySqlConnectOptions> {
        let bare = strip_jdbc_prefix(url);
        let normalized = match (bare.get(..10), bare.get(10..)) {
            (Some(scheme), Some(rest)) if scheme.eq_ignore_ascii_case("mariadb://") => {
                format!("mysql://{rest}")
            }
            _ => bare.to_string(),
        };

        let options = MySqlConnectOptions::from_str(&normalized)
            .map_err(|e| TableListError::connection_failed(url, e))?;

        Ok(options
            .username(credentials.username())
            .password(credentials.password())
            .disable_statement_logging())
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn example_url(&self) -> &'static str {
        "mysql://localhost:3306/mysql"
    }

    async fn connect(&self, url: &str, credentials: &Credentials) -> Result<Box<dyn Session>> {
        let options = Self::connect_options(url, credentials)?;

        let connection = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| TableListError::connection_failed(url, e))?;

        Ok(Box::new(MySqlSession {
            connection,
            url: mask_url_password(url),
        }))
    }
}

struct MySqlSession {
    connection: MySqlConnection,
    url: String,
}

#[async_trait]
impl Session for MySqlSession {
    async fn create_statement<'s>(&'s mut self) -> Result<Box<dyn Statement + 's>> {
        self.connection
            .ping()
            .await
            .map_err(TableListError::statement_failed)?;

        Ok(Box::new(MySqlStatement {
            connection: &mut self.connection,
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let Self { connection, url } = *self;
        connection
            .close()
            .await
            .map_err(|e| TableListError::connection_failed(&url, e))
    }
}

struct MySqlStatement<'c> {
    connection: &'c mut MySqlConnection,
}

impl Statement for MySqlStatement<'_> {
    fn execute_query(&mut self, sql: &'static str) -> RowStream<'_> {
        sqlx::query(sql)
            .fetch(&mut *self.connection)
            .map(move |row| {
                row.and_then(|row| decode_row(&row))
                    .map_err(|e| TableListError::query_failed(sql, e))
            })
            .boxed()
    }
}

fn decode_row(row: &MySqlRow) -> std::result::Result<TableRow, sqlx::Error> {
    Ok(TableRow {
        schema: row.try_get(0)?,
        name: row.try_get(1)?,
        table_type: row.try_get(2)?,
    })
}
