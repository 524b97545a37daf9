//! Database settings loaded from the process environment.
//!
//! The three variables are read in a fixed order and each one is echoed as
//! `NAME="value"` followed by a blank line before it is checked, so an
//! operator can see exactly what the process received. A missing or empty
//! variable stops the run before any database work starts.
//!
//! Runtime options that are not part of the connection (timeouts, log
//! level) are parsed by the binary and handed over as [`RunOptions`].

use crate::error::{Result, TableListError};
use crate::security::{Credentials, MASK, mask_url_password};
use std::io::Write;
use std::time::Duration;

/// Variable holding the connection URL
pub const URL_VAR: &str = "JDBC_URL";
/// Variable holding the account name
pub const USER_VAR: &str = "JDBC_USER";
/// Variable holding the account secret
pub const PASSWORD_VAR: &str = "JDBC_PASSWORD";

/// Text echoed for a variable that is not set at all.
const UNSET: &str = "null";

/// How configuration values are echoed before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Secrets are masked: the password variable and any password inside the URL
    #[default]
    Redacted,
    /// Every value is printed verbatim, secrets included
    Plaintext,
}

/// Kind of value a variable holds, which decides how it is echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Url,
    Plain,
    Secret,
}

/// Connection settings for one run.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Connection URL, as given
    pub url: String,
    /// Account used to authenticate
    pub credentials: Credentials,
}

impl DatabaseSettings {
    /// Loads the settings from the process environment.
    ///
    /// # Errors
    /// Returns [`TableListError::MissingVariable`] for the first variable
    /// that is unset or empty, or an output error if echoing fails.
    pub fn from_env<W: Write>(echo: &mut W, policy: EchoPolicy) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), echo, policy)
    }

    /// Loads the settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    /// Same as [`DatabaseSettings::from_env`].
    ///
    /// # Example
    /// ```rust
    /// use tablelist_core::config::{DatabaseSettings, EchoPolicy};
    ///
    /// let mut echo = Vec::new();
    /// let settings = DatabaseSettings::from_lookup(
    ///     |name| match name {
    ///         "JDBC_URL" => Some("postgres://localhost/shop".to_string()),
    ///         "JDBC_USER" => Some("alice".to_string()),
    ///         "JDBC_PASSWORD" => Some("secret".to_string()),
    ///         _ => None,
    ///     },
    ///     &mut echo,
    ///     EchoPolicy::Redacted,
    /// )?;
    ///
    /// assert_eq!(settings.credentials.username(), "alice");
    /// assert!(!String::from_utf8_lossy(&echo).contains("secret"));
    /// # Ok::<(), tablelist_core::TableListError>(())
    /// ```
    pub fn from_lookup<F, W>(mut lookup: F, echo: &mut W, policy: EchoPolicy) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
        W: Write,
    {
        let url = required(&mut lookup, URL_VAR, ValueKind::Url, echo, policy)?;
        let username = required(&mut lookup, USER_VAR, ValueKind::Plain, echo, policy)?;
        let password = required(&mut lookup, PASSWORD_VAR, ValueKind::Secret, echo, policy)?;

        tracing::debug!(url = %mask_url_password(&url), "configuration loaded");

        Ok(Self {
            url,
            credentials: Credentials::new(username, password),
        })
    }
}

/// Fetches, echoes and checks one required variable.
fn required<F, W>(
    lookup: &mut F,
    name: &'static str,
    kind: ValueKind,
    echo: &mut W,
    policy: EchoPolicy,
) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
    W: Write,
{
    let value = lookup(name);
    write!(echo, "{name}=\"{}\"\n\n", echo_text(value.as_deref(), kind, policy))?;

    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            tracing::error!(variable = name, "required variable is missing or empty");
            Err(TableListError::missing_variable(name))
        }
    }
}

fn echo_text(value: Option<&str>, kind: ValueKind, policy: EchoPolicy) -> String {
    match (value, kind, policy) {
        (None, _, _) => UNSET.to_string(),
        (Some(value), _, EchoPolicy::Plaintext) => value.to_string(),
        (Some(""), _, EchoPolicy::Redacted) => String::new(),
        (Some(_), ValueKind::Secret, EchoPolicy::Redacted) => MASK.to_string(),
        (Some(value), ValueKind::Url, EchoPolicy::Redacted) => mask_url_password(value),
        (Some(value), ValueKind::Plain, EchoPolicy::Redacted) => value.to_string(),
    }
}

/// Options that shape a run but are not read from the database variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Upper bound on opening the connection; `None` waits indefinitely
    pub connect_timeout: Option<Duration>,
    /// Upper bound on query execution and on each row fetch; `None` waits indefinitely
    pub query_timeout: Option<Duration>,
}

impl RunOptions {
    /// Builder method to set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builder method to set the query timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Validates option values.
    ///
    /// # Errors
    /// Returns a configuration error for zero-length timeouts.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(TableListError::configuration(
                "connect timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_some_and(|t| t.is_zero()) {
            return Err(TableListError::configuration(
                "query timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
