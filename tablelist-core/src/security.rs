//! Credential protection.
//!
//! Usernames and passwords live in [`Credentials`], which zeroes its memory
//! on drop and never prints the password through `Debug`. URLs are masked
//! with [`mask_url_password`] before they are echoed, logged or placed in an
//! error message.

use zeroize::{Zeroize, Zeroizing};

/// Placeholder printed instead of a secret value.
pub const MASK: &str = "****";

/// Prefix accepted in front of connection URLs copied from JDBC setups.
pub const JDBC_PREFIX: &str = "jdbc:";

/// Secure credential container that automatically zeros memory on drop
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing
    #[must_use]
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password. Callers hand it straight to a driver.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks if a password is present without exposing it
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &if self.has_password() { MASK } else { "" })
            .finish()
    }
}

/// Strips an optional `jdbc:` prefix (case-insensitive) from a connection URL.
///
/// ```rust
/// use tablelist_core::security::strip_jdbc_prefix;
///
/// assert_eq!(strip_jdbc_prefix("jdbc:mysql://localhost/db"), "mysql://localhost/db");
/// assert_eq!(strip_jdbc_prefix("postgres://localhost/db"), "postgres://localhost/db");
/// ```
#[must_use]
pub fn strip_jdbc_prefix(url: &str) -> &str {
    match url.get(..JDBC_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(JDBC_PREFIX) => &url[JDBC_PREFIX.len()..],
        _ => url,
    }
}

/// Masks the password in a connection URL, keeping everything else.
///
/// Both the userinfo password and a `password` query parameter, as used by
/// JDBC-style URLs, are masked. Strings that do not parse as URLs keep
/// their text apart from the query parameter. A `jdbc:` prefix is
/// preserved.
///
/// ```rust
/// use tablelist_core::security::mask_url_password;
///
/// assert_eq!(
///     mask_url_password("jdbc:postgresql://app:hunter2@db:5432/shop"),
///     "jdbc:postgresql://app:****@db:5432/shop"
/// );
/// assert_eq!(
///     mask_url_password("jdbc:mysql://db/shop?user=app&password=hunter2"),
///     "jdbc:mysql://db/shop?user=app&password=****"
/// );
/// ```
#[must_use]
pub fn mask_url_password(url: &str) -> String {
    let bare = strip_jdbc_prefix(url);
    let prefix = &url[..url.len().saturating_sub(bare.len())];

    let masked = match url::Url::parse(bare) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(MASK)).is_err() {
                return "<redacted>".to_string();
            }
            format!("{prefix}{parsed}")
        }
        _ => url.to_string(),
    };
    mask_query_password(&masked)
}

/// Masks the value of every `password=` pair in the query string.
fn mask_query_password(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.eq_ignore_ascii_case("password") => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect();

    format!("{base}?{}", pairs.join("&"))
}
