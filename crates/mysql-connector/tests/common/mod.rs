//! In-memory MySQL stand-in for connector tests
//!
//! `MockServer` understands just enough statement text to model the
//! connector's behaviour: databases, tables with a column list, `INSERT`
//! with `?` placeholders, `DELETE FROM`, `SELECT * FROM`. Every connect,
//! statement and close is recorded as an [`Event`].

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mysql_connector::connection::{ConnectOptions, Connection, ConnectionFactory, Credentials};
use mysql_connector::{Connector, Error, Result, Row, Value};

/// A recorded interaction with the server
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect {
        database: Option<String>,
        user: String,
    },
    Query {
        database: Option<String>,
        sql: String,
    },
    Execute {
        database: Option<String>,
        sql: String,
        params: Vec<Value>,
    },
    Close {
        database: Option<String>,
    },
}

#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, Option<String>>,
    databases: BTreeMap<String, BTreeMap<String, Table>>,
    events: Vec<Event>,
    open_connections: usize,
    connect_attempts: usize,
    drop_next_statement: bool,
}

/// Shared handle to the in-memory server
#[derive(Debug, Clone, Default)]
pub struct MockServer {
    state: Arc<Mutex<State>>,
}

impl MockServer {
    /// Server with one account
    pub fn with_user(user: &str, password: Option<&str>) -> Self {
        let server = Self::default();
        server
            .lock()
            .users
            .insert(user.to_string(), password.map(str::to_string));
        server
    }

    /// Connector wired to this server, with the account's credentials set
    pub fn connector(&self, user: &str, password: Option<&str>) -> Connector {
        let mut connector = Connector::with_factory(self.clone());
        connector.set_user(user).unwrap();
        connector.set_password(password);
        connector
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn create_database(&self, database: &str) {
        self.lock()
            .databases
            .entry(database.to_string())
            .or_default();
    }

    pub fn create_table(&self, database: &str, table: &str, columns: &[&str]) {
        let mut state = self.lock();
        let tables = state.databases.entry(database.to_string()).or_default();
        tables.insert(
            table.to_string(),
            Table {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: Vec::new(),
            },
        );
    }

    pub fn has_database(&self, database: &str) -> bool {
        self.lock().databases.contains_key(database)
    }

    pub fn has_table(&self, database: &str, table: &str) -> bool {
        self.lock()
            .databases
            .get(database)
            .is_some_and(|tables| tables.contains_key(table))
    }

    pub fn table_columns(&self, database: &str, table: &str) -> Vec<String> {
        self.lock()
            .databases
            .get(database)
            .and_then(|tables| tables.get(table))
            .map(|t| t.columns.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self, database: &str, table: &str) -> Vec<Vec<Value>> {
        self.lock()
            .databases
            .get(database)
            .and_then(|tables| tables.get(table))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn databases(&self) -> BTreeSet<String> {
        self.lock().databases.keys().cloned().collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Statement text and parameters of every `execute`, in order
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Execute { sql, params, .. } => Some((sql.clone(), params.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn open_connections(&self) -> usize {
        self.lock().open_connections
    }

    pub fn connect_attempts(&self) -> usize {
        self.lock().connect_attempts
    }

    /// Fail the next statement with a transport error
    pub fn drop_next_statement(&self) {
        self.lock().drop_next_statement = true;
    }

    fn take_transport_failure(&self) -> Result<()> {
        let mut state = self.lock();
        if std::mem::take(&mut state.drop_next_statement) {
            return Err(Error::connection("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionFactory for MockServer {
    async fn connect(
        &self,
        options: &ConnectOptions,
        credentials: &Credentials,
    ) -> Result<Box<dyn Connection>> {
        let mut state = self.lock();
        state.connect_attempts += 1;

        match state.users.get(&credentials.user) {
            Some(password) if *password == credentials.password => {}
            _ => {
                return Err(Error::connection(format!(
                    "Access denied for user '{}'",
                    credentials.user
                )))
            }
        }

        if let Some(database) = &options.database {
            if !state.databases.contains_key(database) {
                return Err(Error::connection(format!(
                    "Unknown database '{}'",
                    database
                )));
            }
        }

        state.open_connections += 1;
        state.events.push(Event::Connect {
            database: options.database.clone(),
            user: credentials.user.clone(),
        });

        Ok(Box::new(MockConnection {
            server: self.clone(),
            database: options.database.clone(),
        }))
    }
}

/// Connection handed out by [`MockServer`]
#[derive(Debug)]
pub struct MockConnection {
    server: MockServer,
    database: Option<String>,
}

impl MockConnection {
    fn require_database(&self, sql: &str) -> Result<String> {
        self.database
            .clone()
            .ok_or_else(|| Error::database_with_sql("No database selected", sql))
    }

    fn run(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let words: Vec<&str> = sql.split_whitespace().collect();
        let upper: Vec<String> = words.iter().map(|w| w.to_ascii_uppercase()).collect();
        let upper: Vec<&str> = upper.iter().map(String::as_str).collect();
        let mut state = self.server.lock();

        match upper.as_slice() {
            ["CREATE", "DATABASE", "IF", "NOT", "EXISTS", _] => {
                state.databases.entry(words[5].to_string()).or_default();
                Ok(1)
            }
            ["DROP", "DATABASE", _] => state
                .databases
                .remove(words[2])
                .map(|_| 0)
                .ok_or_else(|| {
                    Error::database_with_sql(
                        format!("Can't drop database '{}'; database doesn't exist", words[2]),
                        sql,
                    )
                }),
            ["CREATE", "TABLE", "IF", "NOT", "EXISTS", ..] => {
                let database = self.require_database(sql)?;
                let table = words[5].to_string();
                let open = sql.find('(');
                let close = sql.rfind(')');
                let (Some(open), Some(close)) = (open, close) else {
                    return Err(Error::database_with_sql("You have an error in your SQL syntax", sql));
                };
                let columns: Vec<String> = sql[open + 1..close]
                    .split(", ")
                    .filter_map(|def| def.split_whitespace().next())
                    .map(str::to_string)
                    .collect();
                let tables = state.databases.entry(database).or_default();
                tables
                    .entry(table)
                    .or_insert_with(|| Table { columns, rows: Vec::new() });
                Ok(0)
            }
            ["DROP", "TABLE", _] => {
                let database = self.require_database(sql)?;
                state
                    .databases
                    .get_mut(&database)
                    .and_then(|tables| tables.remove(words[2]))
                    .map(|_| 0)
                    .ok_or_else(|| {
                        Error::database_with_sql(format!("Unknown table '{}'", words[2]), sql)
                    })
            }
            ["INSERT", "INTO", _, ..] => {
                let database = self.require_database(sql)?;
                let placeholders = sql.matches('?').count();
                if placeholders != params.len() {
                    return Err(Error::database_with_sql(
                        format!(
                            "statement has {} placeholders but {} parameters were bound",
                            placeholders,
                            params.len()
                        ),
                        sql,
                    ));
                }
                let table = state
                    .databases
                    .get_mut(&database)
                    .and_then(|tables| tables.get_mut(words[2]))
                    .ok_or_else(|| {
                        Error::database_with_sql(
                            format!("Table '{}.{}' doesn't exist", database, words[2]),
                            sql,
                        )
                    })?;
                table.rows.push(params.to_vec());
                Ok(1)
            }
            ["DELETE", "FROM", _] => {
                let database = self.require_database(sql)?;
                let table = state
                    .databases
                    .get_mut(&database)
                    .and_then(|tables| tables.get_mut(words[2]))
                    .ok_or_else(|| Error::database_with_sql("Table doesn't exist", sql))?;
                let removed = table.rows.len() as u64;
                table.rows.clear();
                Ok(removed)
            }
            _ => Err(Error::database_with_sql(
                "You have an error in your SQL syntax",
                sql,
            )),
        }
    }

    fn select(&self, sql: &str) -> Result<Vec<Row>> {
        let words: Vec<&str> = sql.split_whitespace().collect();
        let database = self.require_database(sql)?;
        let state = self.server.lock();

        match words.as_slice() {
            [select, "*", from, table] if select.eq_ignore_ascii_case("SELECT") && from.eq_ignore_ascii_case("FROM") => {
                let table = state
                    .databases
                    .get(&database)
                    .and_then(|tables| tables.get(*table))
                    .ok_or_else(|| {
                        Error::database_with_sql(format!("Table '{}' doesn't exist", table), sql)
                    })?;
                Ok(table
                    .rows
                    .iter()
                    .map(|values| Row::new(table.columns.clone(), values.clone()))
                    .collect())
            }
            _ => Err(Error::database_with_sql(
                "You have an error in your SQL syntax",
                sql,
            )),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.server.lock().events.push(Event::Query {
            database: self.database.clone(),
            sql: sql.to_string(),
        });
        self.server.take_transport_failure()?;
        self.select(sql)
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.server.lock().events.push(Event::Execute {
            database: self.database.clone(),
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.server.take_transport_failure()?;
        self.run(sql, params)
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut state = self.server.lock();
        state.open_connections -= 1;
        state.events.push(Event::Close {
            database: self.database.clone(),
        });
        Ok(())
    }
}
