//! Connector configuration
//!
//! ```yaml
//! url_prefix: ${MYSQL_URL_PREFIX:-mysql://127.0.0.1:3306/}
//! options: "?autoReconnect=true&useSSL=false"
//! database: readings_db
//! table: readings
//! user: ${MYSQL_USER}
//! password: ${MYSQL_PASSWORD:-}
//! ```

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::{DEFAULT_OPTIONS, DEFAULT_URL_PREFIX};
use crate::error::{Error, Result};

/// Pattern: ${VAR} or ${VAR:-default}
static ENV_VAR_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("env var regex pattern is invalid - this is a bug")
});

/// Settings a [`Connector`](crate::Connector) can be built from
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    /// Scheme, host and port (`mysql://host:port/`)
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// Option suffix appended after the database name
    #[serde(default = "default_options")]
    pub options: String,

    /// Active database
    #[serde(default)]
    pub database: Option<String>,

    /// Active table
    #[serde(default)]
    pub table: Option<String>,

    /// Login user (required)
    #[serde(default)]
    pub user: String,

    /// Login password
    #[serde(default)]
    pub password: Option<String>,
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

fn default_options() -> String {
    DEFAULT_OPTIONS.to_string()
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            options: default_options(),
            database: None,
            table: None,
            user: String::new(),
            password: None,
        }
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("url_prefix", &self.url_prefix)
            .field("options", &self.options)
            .field("database", &self.database)
            .field("table", &self.table)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ConnectorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_with_source(
                format!("failed to read config file {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), "loaded connector config");
        Self::from_yaml(&content)
    }

    /// Parse YAML, expanding environment variables first
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Self = serde_yaml::from_str(&expanded)
            .map_err(|e| Error::config_with_source("failed to parse config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the connector would reject
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::validation("config: user must not be empty or blank"));
        }
        if self.url_prefix.trim().is_empty() {
            return Err(Error::config("config: url_prefix must not be empty"));
        }
        Ok(())
    }
}

/// Expand environment variables in the format ${VAR} or ${VAR:-default}.
/// Unset variables without a default expand to the empty string.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR_REGEX
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map(|m| m.as_str());

            std::env::var(var_name).unwrap_or_else(|_| default.unwrap_or("").to_string())
        })
        .to_string()
}
