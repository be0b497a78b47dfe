//! Connection traits and targets for mysql-connector
//!
//! Core abstractions between the blocking [`Connector`](crate::Connector) and a driver:
//! - ConnectTarget: URL prefix plus option suffix, as the caller configures it
//! - ConnectOptions: the parsed target for one connection attempt
//! - Credentials: user and password
//! - Connection / ConnectionFactory: the async driver seam

use async_trait::async_trait;
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{Row, Value};

/// Default URL prefix: loopback host, default MySQL port
pub const DEFAULT_URL_PREFIX: &str = "mysql://127.0.0.1:3306/";

/// Default option suffix: reconnect on, transport encryption off
pub const DEFAULT_OPTIONS: &str = "?autoReconnect=true&useSSL=false";

const DEFAULT_PORT: u16 = 3306;

/// A connection to a database
#[async_trait]
pub trait Connection: Send {
    /// Run a statement without parameters and return every row
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Run a statement with positional parameters, returns affected row count
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Database this connection was opened against, if any
    fn database(&self) -> Option<&str>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory for creating connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a new connection
    async fn connect(
        &self,
        options: &ConnectOptions,
        credentials: &Credentials,
    ) -> Result<Box<dyn Connection>>;
}

/// Where to connect: a URL prefix (`mysql://host:port/`) and an option suffix.
///
/// The full URL is `prefix + database + options`. Host-level statements use
/// the same URL without the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    /// Scheme, host and port, ending in `/`
    pub url_prefix: String,
    /// Query-string suffix, starting with `?` (may be empty)
    pub options: String,
}

impl Default for ConnectTarget {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            options: DEFAULT_OPTIONS.to_string(),
        }
    }
}

impl ConnectTarget {
    /// Create a target from a prefix and option suffix
    pub fn new(url_prefix: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            options: options.into(),
        }
    }

    /// Assemble the connection URL for a database (`None` for host level)
    pub fn url(&self, database: Option<&str>) -> String {
        format!(
            "{}{}{}",
            self.url_prefix,
            database.unwrap_or_default(),
            self.options
        )
    }

    /// Parse the URL for a database into connection options
    pub fn resolve(&self, database: Option<&str>) -> Result<ConnectOptions> {
        ConnectOptions::parse(&self.url(database))
    }
}

/// Parsed connection target for a single connect call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Database to select, `None` for a host-level connection
    pub database: Option<String>,
    /// Reopen the connection on the next operation after the transport drops
    pub auto_reconnect: bool,
    /// Request TLS from the server
    pub use_ssl: bool,
}

impl ConnectOptions {
    /// Parse a `mysql://host:port/database?autoReconnect=..&useSSL=..` URL.
    ///
    /// A leading `jdbc:` is accepted so existing connection strings keep working.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.strip_prefix("jdbc:").unwrap_or(raw);
        let url = url::Url::parse(trimmed)
            .map_err(|e| Error::validation(format!("invalid connection URL '{}': {}", raw, e)))?;

        if url.scheme() != "mysql" {
            return Err(Error::validation(format!(
                "unsupported URL scheme '{}': expected mysql",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::validation(format!("connection URL '{}' has no host", raw)))?
            .to_string();

        let database = Some(url.path().trim_matches('/'))
            .filter(|db| !db.is_empty())
            .map(str::to_string);

        let mut options = Self {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            database,
            auto_reconnect: false,
            use_ssl: false,
        };

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "autoReconnect" => options.auto_reconnect = parse_flag(&key, &value)?,
                "useSSL" => options.use_ssl = parse_flag(&key, &value)?,
                other => warn!(option = other, "ignoring unknown connection option"),
            }
        }

        Ok(options)
    }

    /// URL of this target without credentials
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}/{}",
            self.host,
            self.port,
            self.database.as_deref().unwrap_or_default()
        )
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(Error::validation(format!(
            "option '{}' expects a boolean, got '{}'",
            key, value
        ))),
    }
}

/// User name and password for a connection
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name
    pub user: String,
    /// Password, `None` to connect without one
    pub password: Option<String>,
}

impl Credentials {
    /// Create credentials
    pub fn new(user: impl Into<String>, password: Option<String>) -> Self {
        Self {
            user: user.into(),
            password,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the password.
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_url() {
        let target = ConnectTarget::default();
        assert_eq!(
            target.url(Some("database1_db")),
            "mysql://127.0.0.1:3306/database1_db?autoReconnect=true&useSSL=false"
        );
        assert_eq!(
            target.url(None),
            "mysql://127.0.0.1:3306/?autoReconnect=true&useSSL=false"
        );
    }

    #[test]
    fn test_resolve_default_target() {
        let options = ConnectTarget::default()
            .resolve(Some("database1_db"))
            .unwrap();

        assert_eq!(options.host, "127.0.0.1");
        assert_eq!(options.port, 3306);
        assert_eq!(options.database.as_deref(), Some("database1_db"));
        assert!(options.auto_reconnect);
        assert!(!options.use_ssl);
    }

    #[test]
    fn test_host_level_has_no_database() {
        let options = ConnectTarget::default().resolve(None).unwrap();
        assert_eq!(options.database, None);
        assert_eq!(options.url(), "mysql://127.0.0.1:3306/");
    }

    #[test]
    fn test_jdbc_prefix_accepted() {
        let options =
            ConnectOptions::parse("jdbc:mysql://db.internal:3307/shop?useSSL=true").unwrap();
        assert_eq!(options.host, "db.internal");
        assert_eq!(options.port, 3307);
        assert!(options.use_ssl);
        assert!(!options.auto_reconnect);
    }

    #[test]
    fn test_invalid_targets() {
        assert!(ConnectOptions::parse("postgres://localhost/db").is_err());
        assert!(ConnectOptions::parse("not a url").is_err());
        assert!(ConnectOptions::parse("mysql://localhost/db?useSSL=maybe").is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("app", Some("hunter2".into()));
        let debug = format!("{:?}", creds);
        assert!(debug.contains("app"));
        assert!(!debug.contains("hunter2"));
    }
}
