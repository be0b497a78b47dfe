//! MySQL backend for mysql-connector
//!
//! Implements the connection seam on top of `mysql_async`:
//! - value conversion in both directions
//! - MySqlConnection: query / execute / close on a single `Conn`
//! - MySqlConnectionFactory: builds driver options from [`ConnectOptions`]

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder, SslOpts};
use tracing::debug;

use crate::connection::{ConnectOptions, Connection, ConnectionFactory, Credentials};
use crate::error::{Error, Result};
use crate::types::{Row, Value};

/// Convert a connector Value to a MySQL parameter
fn value_to_sql(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(b) => mysql_async::Value::from(*b),
        Value::Int8(n) => mysql_async::Value::from(*n),
        Value::Int16(n) => mysql_async::Value::from(*n),
        Value::Int32(n) => mysql_async::Value::from(*n),
        Value::Int64(n) => mysql_async::Value::from(*n),
        Value::UInt64(n) => mysql_async::Value::from(*n),
        Value::Float32(n) => mysql_async::Value::from(*n),
        Value::Float64(n) => mysql_async::Value::from(*n),
        // DECIMAL travels as text
        Value::Decimal(d) => mysql_async::Value::from(d.to_string()),
        Value::String(s) => mysql_async::Value::from(s.clone()),
        Value::Bytes(b) => mysql_async::Value::from(b.clone()),
        Value::Date(d) => {
            mysql_async::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1000,
        ),
        Value::DateTime(dt) => {
            let date = dt.date();
            let time = dt.time();
            mysql_async::Value::Date(
                date.year() as u16,
                date.month() as u8,
                date.day() as u8,
                time.hour() as u8,
                time.minute() as u8,
                time.second() as u8,
                time.nanosecond() / 1000,
            )
        }
        Value::Json(j) => mysql_async::Value::from(j.to_string()),
    }
}

/// Convert a MySQL value to a connector Value
fn mysql_value_to_value(val: mysql_async::Value) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        // The text protocol delivers every column as bytes; keep them as text when possible
        mysql_async::Value::Bytes(b) => match String::from_utf8(b) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(n) => Value::Int64(n),
        mysql_async::Value::UInt(n) => Value::UInt64(n),
        mysql_async::Value::Float(f) => Value::Float32(f),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let Some(date) = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            else {
                return Value::Null;
            };
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                Value::Date(date)
            } else {
                chrono::NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                    .map(|time| Value::DateTime(chrono::NaiveDateTime::new(date, time)))
                    .unwrap_or(Value::Null)
            }
        }
        mysql_async::Value::Time(neg, days, hour, min, sec, micro) => {
            if neg || days > 0 {
                // Outside a wall-clock day: keep MySQL's textual form
                let hours = days * 24 + hour as u32;
                let sign = if neg { "-" } else { "" };
                Value::String(format!("{}{:02}:{:02}:{:02}", sign, hours, min, sec))
            } else {
                chrono::NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                    .map(Value::Time)
                    .unwrap_or(Value::Null)
            }
        }
    }
}

/// Classify a statement failure: a dropped transport is a connection error,
/// anything the server rejected is a database error.
fn statement_error(sql: &str, err: mysql_async::Error) -> Error {
    let message = format!("failed to execute statement: {}", err);
    match err {
        mysql_async::Error::Io(_) => Error::connection_with_source(message, err),
        other => Error::database_with_source(message, sql, other),
    }
}

/// MySQL connection implementation
pub struct MySqlConnection {
    conn: Conn,
    database: Option<String>,
}

impl MySqlConnection {
    /// Wrap an established driver connection
    pub fn new(conn: Conn, database: Option<String>) -> Self {
        Self { conn, database }
    }

    /// Open a connection for the given target and credentials
    pub async fn connect(options: &ConnectOptions, credentials: &Credentials) -> Result<Self> {
        let mut opts = OptsBuilder::default()
            .ip_or_hostname(options.host.clone())
            .tcp_port(options.port)
            .db_name(options.database.clone())
            .user(Some(credentials.user.clone()))
            .pass(credentials.password.clone());

        if options.use_ssl {
            opts = opts.ssl_opts(SslOpts::default());
        }

        let conn = Conn::new(opts).await.map_err(|e| {
            Error::connection_with_source(
                format!("failed to connect to {}: {}", options.url(), e),
                e,
            )
        })?;

        debug!(url = %options.url(), user = %credentials.user, "connected");
        Ok(Self::new(conn, options.database.clone()))
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let result: Vec<mysql_async::Row> = self
            .conn
            .query(sql)
            .await
            .map_err(|e| statement_error(sql, e))?;

        let rows = result
            .into_iter()
            .map(|row| {
                let columns: Vec<String> = row
                    .columns_ref()
                    .iter()
                    .map(|c| c.name_str().to_string())
                    .collect();

                let values: Vec<Value> = (0..row.len())
                    .map(|i| {
                        let val: mysql_async::Value =
                            row.get(i).unwrap_or(mysql_async::Value::NULL);
                        mysql_value_to_value(val)
                    })
                    .collect();

                Row::new(columns, values)
            })
            .collect();

        Ok(rows)
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        if params.is_empty() {
            // Text protocol: DDL is not always preparable
            self.conn
                .query_drop(sql)
                .await
                .map_err(|e| statement_error(sql, e))?;
        } else {
            let mysql_params: Vec<mysql_async::Value> = params.iter().map(value_to_sql).collect();
            self.conn
                .exec_drop(sql, mysql_params)
                .await
                .map_err(|e| statement_error(sql, e))?;
        }

        Ok(self.conn.affected_rows())
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.conn.disconnect().await.map_err(|e| {
            Error::connection_with_source(format!("failed to close connection: {}", e), e)
        })
    }
}

/// Factory producing [`MySqlConnection`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnectionFactory;

#[async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    async fn connect(
        &self,
        options: &ConnectOptions,
        credentials: &Credentials,
    ) -> Result<Box<dyn Connection>> {
        let conn = MySqlConnection::connect(options, credentials).await?;
        Ok(Box::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_text_protocol_bytes_become_strings() {
        let v = mysql_value_to_value(mysql_async::Value::Bytes(b"aaa".to_vec()));
        assert_eq!(v, Value::String("aaa".into()));

        let v = mysql_value_to_value(mysql_async::Value::Bytes(vec![0xff, 0xfe]));
        assert_eq!(v, Value::Bytes(vec![0xff, 0xfe]));
    }

    #[test]
    fn test_date_values() {
        let v = mysql_value_to_value(mysql_async::Value::Date(2022, 7, 6, 0, 0, 0, 0));
        assert_eq!(v, Value::Date(NaiveDate::from_ymd_opt(2022, 7, 6).unwrap()));

        let v = mysql_value_to_value(mysql_async::Value::Date(2022, 7, 6, 12, 0, 1, 0));
        assert_eq!(v.to_text().as_deref(), Some("2022-07-06 12:00:01"));
    }

    #[test]
    fn test_long_time_kept_as_text() {
        let v = mysql_value_to_value(mysql_async::Value::Time(true, 1, 2, 3, 4, 0));
        assert_eq!(v, Value::String("-26:03:04".into()));
    }

    #[test]
    fn test_params_conversion() {
        let dt = NaiveDate::from_ymd_opt(2022, 6, 6)
            .unwrap()
            .and_hms_opt(14, 1, 0)
            .unwrap();
        assert_eq!(
            value_to_sql(&Value::DateTime(dt)),
            mysql_async::Value::Date(2022, 6, 6, 14, 1, 0, 0)
        );
        assert_eq!(value_to_sql(&Value::Null), mysql_async::Value::NULL);
        assert_eq!(
            value_to_sql(&Value::String("fff".into())),
            mysql_async::Value::Bytes(b"fff".to_vec())
        );
    }
}
