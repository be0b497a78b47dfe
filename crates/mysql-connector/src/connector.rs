//! Blocking connector over a single driver connection.
//!
//! A [`Connector`] holds the connection target, credentials, the active
//! database and table names, at most one live connection and one reusable
//! [`PreparedStatement`]. Every method blocks the caller until the driver call
//! finishes; the driver futures run on a private current-thread runtime.
//!
//! A `Connector` must not be used from inside another tokio runtime: blocking
//! on a nested runtime panics. Give each logical session its own `Connector`
//! rather than sharing one across threads.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::config::ConnectorConfig;
use crate::connection::{ConnectOptions, ConnectTarget, Connection, ConnectionFactory, Credentials};
use crate::ddl;
use crate::error::{Error, ErrorCategory, Result};
use crate::mysql::MySqlConnectionFactory;
use crate::types::{Row, Value};

/// Suffix appended to a table name that collides with the database name
pub const TABLE_SUFFIX: &str = "_table";

/// The connector's reusable statement handle.
///
/// Parameters are bound by 1-based position. Executing the statement moves
/// the bindings out, so the handle never carries parameters from one
/// execution into the next.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    sql: String,
    params: Vec<Option<Value>>,
}

impl PreparedStatement {
    /// Create an unbound statement
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Statement text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind `value` to the placeholder at `index` (1-based)
    pub fn bind(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index == 0 {
            return Err(Error::validation("parameter indexes start at 1"));
        }
        if self.params.len() < index {
            self.params.resize(index, None);
        }
        self.params[index - 1] = Some(value.into());
        Ok(())
    }

    /// Number of parameter slots currently bound
    pub fn parameter_count(&self) -> usize {
        self.params.iter().filter(|p| p.is_some()).count()
    }

    /// Bound parameters in position order (`None` for an unbound slot)
    pub fn parameters(&self) -> &[Option<Value>] {
        &self.params
    }

    /// Drop every binding
    pub fn clear_parameters(&mut self) {
        self.params.clear();
    }

    /// Move the bindings out, leaving the statement cleared.
    ///
    /// Fails if a position below the highest bound one was never bound.
    fn take_parameters(&mut self) -> Result<Vec<Value>> {
        let params = std::mem::take(&mut self.params);
        params
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                p.ok_or_else(|| Error::validation(format!("no value bound for parameter {}", i + 1)))
            })
            .collect()
    }
}

/// Blocking wrapper around one MySQL connection
pub struct Connector {
    factory: Arc<dyn ConnectionFactory>,
    runtime: Option<Runtime>,
    connection: Option<Box<dyn Connection>>,
    /// Target of the live (or dropped, awaiting reconnect) connection
    session: Option<ConnectOptions>,
    statement: Option<PreparedStatement>,
    target: ConnectTarget,
    database: Option<String>,
    table: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector {
    /// Create a connector using the MySQL driver and the default target
    pub fn new() -> Self {
        Self::with_factory(MySqlConnectionFactory)
    }

    /// Create a connector on top of another connection factory
    pub fn with_factory(factory: impl ConnectionFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            runtime: None,
            connection: None,
            session: None,
            statement: None,
            target: ConnectTarget::default(),
            database: None,
            table: None,
            user: None,
            password: None,
        }
    }

    /// Create a connector with credentials set
    pub fn with_credentials<'a>(
        user: impl Into<Option<&'a str>>,
        password: impl Into<Option<&'a str>>,
    ) -> Result<Self> {
        let mut connector = Self::new();
        connector.set_user(user)?;
        connector.set_password(password);
        Ok(connector)
    }

    /// Create a connector with credentials, database and table set
    pub fn with_target<'a>(
        user: impl Into<Option<&'a str>>,
        password: impl Into<Option<&'a str>>,
        database: &str,
        table: &str,
    ) -> Result<Self> {
        let mut connector = Self::with_credentials(user, password)?;
        connector.set_database(database);
        connector.set_table(table);
        Ok(connector)
    }

    /// Create a connector from configuration
    pub fn from_config(config: &ConnectorConfig) -> Result<Self> {
        let mut connector = Self::new();
        connector.apply_config(config)?;
        Ok(connector)
    }

    /// Apply configuration through the regular mutators
    pub fn apply_config(&mut self, config: &ConnectorConfig) -> Result<()> {
        self.set_user(config.user.as_str())?;
        self.set_password(config.password.as_deref());
        self.set_url_prefix(config.url_prefix.clone());
        self.set_options(config.options.clone());
        if let Some(database) = &config.database {
            self.set_database(database.as_str());
        }
        if let Some(table) = &config.table {
            self.set_table(table.as_str());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The live connection, if any
    pub fn connection(&self) -> Option<&dyn Connection> {
        self.connection.as_deref()
    }

    /// The statement handle of the last data operation
    pub fn prepared_statement(&self) -> Option<&PreparedStatement> {
        self.statement.as_ref()
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// URL prefix (`mysql://host:port/`)
    pub fn url_prefix(&self) -> &str {
        &self.target.url_prefix
    }

    /// Option suffix (`?autoReconnect=true&useSSL=false`)
    pub fn options(&self) -> &str {
        &self.target.options
    }

    /// Active database name
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Active table name
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Configured user
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Set the URL prefix
    pub fn set_url_prefix(&mut self, url_prefix: impl Into<String>) {
        self.target.url_prefix = url_prefix.into();
    }

    /// Set the option suffix
    pub fn set_options(&mut self, options: impl Into<String>) {
        self.target.options = options.into();
    }

    /// Set the active database
    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = Some(database.into());
    }

    /// Set the active table.
    ///
    /// A table may not share its name with the database: a colliding name
    /// gets `_table` appended until the two differ.
    pub fn set_table(&mut self, table: impl Into<String>) {
        let mut table = table.into();
        while self.database.as_deref() == Some(table.as_str()) {
            table.push_str(TABLE_SUFFIX);
        }
        self.table = Some(table);
    }

    /// Set the user. `None`, empty and all-whitespace names are rejected
    /// and leave the current user unchanged.
    pub fn set_user<'a>(&mut self, user: impl Into<Option<&'a str>>) -> Result<()> {
        match user.into() {
            Some(user) if !user.trim().is_empty() => {
                self.user = Some(user.to_string());
                Ok(())
            }
            _ => Err(Error::validation("user must not be empty or blank")),
        }
    }

    /// Set the password
    pub fn set_password<'a>(&mut self, password: impl Into<Option<&'a str>>) {
        self.password = password.into().map(str::to_string);
    }

    // ------------------------------------------------------------------
    // Connection lifecycle
    // ------------------------------------------------------------------

    /// Open a connection to the active database, replacing any live one
    pub fn connect(&mut self) -> Result<()> {
        let options = self.target.resolve(self.database.as_deref())?;
        let connection = self.open(&options)?;
        self.install(connection, options);
        Ok(())
    }

    /// Connect; on a connection failure and with `repair` set, create the
    /// database and table from the given column definitions, then connect
    /// again. Other failures (e.g. a malformed URL prefix) are returned as is.
    pub fn connect_with_repair<C, D>(&mut self, columns: &[C], datatypes: &[D], repair: bool) -> Result<()>
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        match self.connect() {
            Ok(()) => Ok(()),
            Err(err) if repair && err.category() == ErrorCategory::Connection => {
                warn!(error = %err, "connect failed, creating database and table");
                self.repair(columns, datatypes)
            }
            Err(err) => Err(err),
        }
    }

    fn repair<C, D>(&mut self, columns: &[C], datatypes: &[D]) -> Result<()>
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        // Re-run the name mutators so the table/database rule holds
        if let Some(database) = self.database.clone() {
            self.set_database(database);
        }
        if let Some(table) = self.table.clone() {
            self.set_table(table);
        }

        // Validate the column list before touching the server
        ddl::create_table(self.require_table()?, columns, datatypes)?;

        self.create_database_if_missing()?;
        self.create_table_if_missing(columns, datatypes)?;
        self.connect()
    }

    /// Set credentials and connect
    pub fn log_in<'a>(
        &mut self,
        user: impl Into<Option<&'a str>>,
        password: impl Into<Option<&'a str>>,
    ) -> Result<()> {
        self.set_user(user)?;
        self.set_password(password);
        self.connect()
    }

    /// Set credentials and connect, repairing the schema on failure when `repair` is set
    pub fn log_in_with_repair<'a, C, D>(
        &mut self,
        user: impl Into<Option<&'a str>>,
        password: impl Into<Option<&'a str>>,
        columns: &[C],
        datatypes: &[D],
        repair: bool,
    ) -> Result<()>
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        self.set_user(user)?;
        self.set_password(password);
        self.connect_with_repair(columns, datatypes, repair)
    }

    /// Close the live connection.
    ///
    /// Ends the session even when the transport already dropped the handle,
    /// so nothing is reopened afterwards; that case reports not connected.
    pub fn disconnect(&mut self) -> Result<()> {
        self.session = None;
        self.statement = None;
        let connection = self.connection.take().ok_or_else(Error::not_connected)?;

        let result = runtime(&mut self.runtime)?.block_on(connection.close());
        debug!("disconnected");
        result
    }

    // ------------------------------------------------------------------
    // Schema operations
    // ------------------------------------------------------------------

    /// `CREATE DATABASE IF NOT EXISTS` over a short-lived host-level connection
    pub fn create_database_if_missing(&mut self) -> Result<()> {
        let sql = ddl::create_database(self.require_database()?)?;
        self.run_host_level(&sql)?;
        info!(database = ?self.database, "database ensured");
        Ok(())
    }

    /// `DROP DATABASE` over a short-lived host-level connection
    pub fn drop_database(&mut self) -> Result<()> {
        let sql = ddl::drop_database(self.require_database()?)?;
        self.run_host_level(&sql)?;
        info!(database = ?self.database, "database dropped");
        Ok(())
    }

    /// `CREATE TABLE IF NOT EXISTS` with one column per `columns[i] datatypes[i]` pair.
    ///
    /// Runs on a fresh connection to the active database, which stays open as
    /// the connector's live connection.
    pub fn create_table_if_missing<C, D>(&mut self, columns: &[C], datatypes: &[D]) -> Result<()>
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        let sql = ddl::create_table(self.require_table()?, columns, datatypes)?;
        self.reconnect_to_database()?;
        self.execute(&sql)?;
        info!(database = ?self.database, table = ?self.table, "table ensured");
        Ok(())
    }

    /// `DROP TABLE` on a fresh connection to the active database
    pub fn drop_table(&mut self) -> Result<()> {
        let sql = ddl::drop_table(self.require_table()?)?;
        self.reconnect_to_database()?;
        self.execute(&sql)?;
        info!(database = ?self.database, table = ?self.table, "table dropped");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Data operations
    // ------------------------------------------------------------------

    /// Run a query and buffer every row as text, row-major.
    ///
    /// Columns follow the result metadata order; each value is read by its
    /// column name. SQL NULL is `None`.
    pub fn query(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        self.query_to_collection(sql)
    }

    /// Same as [`query`](Self::query), collected into a caller-chosen container
    pub fn query_to_collection<C>(&mut self, sql: &str) -> Result<C>
    where
        C: FromIterator<Vec<Option<String>>>,
    {
        let rows = self.query_rows(sql)?;
        Ok(rows.iter().map(Row::to_text_by_name).collect())
    }

    /// Run a query and return the typed rows
    pub fn query_rows(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.statement = Some(PreparedStatement::new(sql));
        self.ensure_connected()?;
        debug!(sql, "running query");

        let rt = runtime(&mut self.runtime)?;
        let connection = self.connection.as_deref_mut().ok_or_else(Error::not_connected)?;
        let result = rt.block_on(connection.query(sql));
        self.observe(result)
    }

    /// Run a statement without parameters, returns affected row count
    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        self.run_statement(PreparedStatement::new(sql))
    }

    /// Run a statement binding `params[i]` to placeholder `i + 1`
    pub fn execute_with_params(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.execute_with_iter(sql, params.iter().cloned())
    }

    /// Run a statement binding an ordered sequence of parameters
    pub fn execute_with_iter<I, V>(&mut self, sql: &str, params: I) -> Result<u64>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut statement = PreparedStatement::new(sql);
        for (i, value) in params.into_iter().enumerate() {
            statement.bind(i + 1, value)?;
        }
        self.run_statement(statement)
    }

    /// Execute a statement handle with whatever it has bound
    pub fn execute_prepared(&mut self, statement: PreparedStatement) -> Result<u64> {
        self.run_statement(statement)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run_statement(&mut self, mut statement: PreparedStatement) -> Result<u64> {
        let params = statement.take_parameters();
        let sql = statement.sql().to_string();
        self.statement = Some(statement);
        let params = params?;

        self.ensure_connected()?;
        debug!(sql = %sql, params = params.len(), "executing statement");

        let rt = runtime(&mut self.runtime)?;
        let connection = self.connection.as_deref_mut().ok_or_else(Error::not_connected)?;
        let result = rt.block_on(connection.execute(&sql, &params));
        self.observe(result)
    }

    /// Open, run one statement, close; the live connection is untouched
    fn run_host_level(&mut self, sql: &str) -> Result<()> {
        let options = self.target.resolve(None)?;
        let mut connection = self.open(&options)?;
        debug!(sql, "executing host-level statement");

        let rt = runtime(&mut self.runtime)?;
        let result = rt.block_on(connection.execute(sql, &[]));
        match result {
            Ok(_) => rt.block_on(connection.close()),
            Err(err) => {
                if let Err(close_err) = rt.block_on(connection.close()) {
                    warn!(error = %close_err, "failed to close host-level connection");
                }
                Err(err)
            }
        }
    }

    fn reconnect_to_database(&mut self) -> Result<()> {
        let options = self.target.resolve(self.database.as_deref())?;
        let connection = self.open(&options)?;
        self.install(connection, options);
        Ok(())
    }

    fn open(&mut self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        let credentials = self.credentials()?;
        let factory = Arc::clone(&self.factory);
        debug!(url = %options.url(), user = %credentials.user, "opening connection");
        runtime(&mut self.runtime)?.block_on(factory.connect(options, &credentials))
    }

    /// Make `connection` the live one; the previous connection is closed
    fn install(&mut self, connection: Box<dyn Connection>, options: ConnectOptions) {
        if let Some(previous) = self.connection.replace(connection) {
            if let Some(rt) = self.runtime.as_ref() {
                if let Err(err) = rt.block_on(previous.close()) {
                    warn!(error = %err, "failed to close replaced connection");
                }
            }
        }
        self.session = Some(options);
        self.statement = None;
    }

    /// Reopen a connection dropped by the transport when auto-reconnect is on
    fn ensure_connected(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        match self.session.clone() {
            Some(options) if options.auto_reconnect => {
                debug!(url = %options.url(), "reopening dropped connection");
                let connection = self.open(&options)?;
                self.connection = Some(connection);
                Ok(())
            }
            _ => Err(Error::not_connected()),
        }
    }

    /// Drop the live connection after a transport failure when it may be reopened
    fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            let reopenable = self.session.as_ref().is_some_and(|s| s.auto_reconnect);
            if err.category() == ErrorCategory::Connection && reopenable {
                warn!(error = %err, "connection lost, will reopen on next operation");
                let broken = self.connection.take();
                // Driver cleanup on drop may spawn onto the ambient runtime
                let _guard = self.runtime.as_ref().map(Runtime::enter);
                drop(broken);
            }
        }
        result
    }

    fn credentials(&self) -> Result<Credentials> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| Error::validation("user is not set"))?;
        Ok(Credentials::new(user, self.password.clone()))
    }

    fn require_database(&self) -> Result<&str> {
        self.database
            .as_deref()
            .ok_or_else(|| Error::validation("database is not set"))
    }

    fn require_table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| Error::validation("table is not set"))
    }
}

/// The driver runtime, started on first use
fn runtime(slot: &mut Option<Runtime>) -> Result<&Runtime> {
    if slot.is_none() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::internal_with_source("failed to start driver runtime", e))?;
        *slot = Some(rt);
    }
    slot.as_ref()
        .ok_or_else(|| Error::internal("driver runtime unavailable"))
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("target", &self.target)
            .field("database", &self.database)
            .field("table", &self.table)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connected", &self.connection.is_some())
            .field("statement", &self.statement)
            .finish()
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let (Some(connection), Some(rt)) = (self.connection.take(), self.runtime.as_ref()) {
            if let Err(err) = rt.block_on(connection.close()) {
                debug!(error = %err, "close on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_table_avoids_database_name() {
        let mut connector = Connector::new();
        connector.set_database("database1_db");

        connector.set_table("table2_t");
        assert_eq!(connector.table(), Some("table2_t"));

        connector.set_table("database1_db");
        assert_eq!(connector.table(), Some("database1_db_table"));
    }

    #[test]
    fn test_set_table_rechecks_suffixed_name() {
        let mut connector = Connector::new();
        connector.set_database("db_table");
        connector.set_table("db_table");
        assert_eq!(connector.table(), Some("db_table_table"));
    }

    #[test]
    fn test_set_user_rejects_blank() {
        let mut connector = Connector::new();
        assert!(connector.set_user(None::<&str>).is_err());
        assert!(connector.set_user("").is_err());
        assert!(connector.set_user(" ").is_err());
        assert_eq!(connector.user(), None);

        connector.set_user("username").unwrap();
        assert_eq!(connector.user(), Some("username"));

        assert!(connector.set_user("\t").is_err());
        assert_eq!(connector.user(), Some("username"));
    }

    #[test]
    fn test_prepared_statement_binding() {
        let mut statement = PreparedStatement::new("INSERT INTO t VALUE (?, ?)");
        statement.bind(2, 99).unwrap();
        statement.bind(1, "aaa").unwrap();
        assert_eq!(statement.parameter_count(), 2);
        assert!(statement.bind(0, 1).is_err());

        let params = statement.take_parameters().unwrap();
        assert_eq!(params, vec![Value::from("aaa"), Value::Int32(99)]);
        assert_eq!(statement.parameter_count(), 0);
    }

    #[test]
    fn test_prepared_statement_gap_is_rejected() {
        let mut statement = PreparedStatement::new("SELECT ?, ?");
        statement.bind(2, 1).unwrap();
        assert!(statement.take_parameters().is_err());
        assert_eq!(statement.parameter_count(), 0);
    }

    #[test]
    fn test_prepared_statement_clear_parameters() {
        let mut statement = PreparedStatement::new("SELECT ?, ?");
        statement.bind(1, "aaa").unwrap();
        statement.bind(2, 99).unwrap();

        statement.clear_parameters();
        assert_eq!(statement.parameter_count(), 0);
        assert_eq!(statement.sql(), "SELECT ?, ?");

        // Rebinding after a clear starts from an empty list
        statement.bind(1, "bbb").unwrap();
        assert_eq!(statement.take_parameters().unwrap(), vec![Value::from("bbb")]);
    }

    #[test]
    fn test_with_target() {
        let connector =
            Connector::with_target("username", "password", "database1_db", "table1_t").unwrap();
        assert_eq!(connector.user(), Some("username"));
        assert_eq!(connector.database(), Some("database1_db"));
        assert_eq!(connector.table(), Some("table1_t"));
        assert!(!connector.is_connected());

        let connector =
            Connector::with_target("username", None::<&str>, "inventory", "inventory").unwrap();
        assert_eq!(connector.table(), Some("inventory_table"));

        assert!(Connector::with_target(" ", "password", "database1_db", "table1_t").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let connector = Connector::with_credentials("app", "hunter2").unwrap();
        let debug = format!("{:?}", connector);
        assert!(debug.contains("app"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_operations_need_connection() {
        let mut connector = Connector::with_credentials("app", None::<&str>).unwrap();
        let err = connector.execute("SELECT 1").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Connection);
        assert!(connector.disconnect().is_err());
    }
}
