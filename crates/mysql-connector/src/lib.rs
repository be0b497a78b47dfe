//! # mysql-connector
//!
//! A small blocking wrapper around one MySQL connection.
//!
//! [`Connector`] keeps the connection target, credentials, the active
//! database and table, one live connection and one reusable statement handle.
//! On top of that it offers:
//!
//! - **Login with repair**: if connecting fails, optionally create the
//!   database and table from caller-supplied column definitions and retry
//! - **Schema statements**: create or drop the active database and table
//! - **Queries**: every row buffered as text, or as typed [`Row`]s
//! - **Statements**: positional parameters bound from slices, iterators or
//!   the [`sql_params!`] macro, with the affected row count returned
//! - **Generic rows**: [`MySqlOperation<T>`](operation::MySqlOperation) maps
//!   rows to and from a caller type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mysql_connector::prelude::*;
//!
//! # fn main() -> mysql_connector::Result<()> {
//! let mut connector = Connector::new();
//! connector.set_database("database1_db");
//! connector.set_table("table1_t");
//! connector.log_in_with_repair(
//!     "username",
//!     "password",
//!     &["String_t", "Integer_t"],
//!     &["VARCHAR(256)", "INT"],
//!     true,
//! )?;
//!
//! connector.execute_with_params(
//!     "INSERT INTO table1_t VALUE (?, ?)",
//!     &sql_params!["aaa", 99],
//! )?;
//!
//! for row in connector.query("SELECT * FROM table1_t")? {
//!     println!("{:?}", row);
//! }
//! connector.disconnect()?;
//! # Ok(())
//! # }
//! ```
//!
//! Every call blocks. The driver runs on a private current-thread tokio
//! runtime, so a `Connector` must not be driven from inside another runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod connector;
pub mod ddl;
pub mod error;
pub mod functions;
pub mod mysql;
pub mod operation;
pub mod security;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and type system
    pub use crate::types::{Row, Value};

    // Connector and configuration
    pub use crate::config::ConnectorConfig;
    pub use crate::connection::{ConnectOptions, ConnectTarget, Connection, ConnectionFactory, Credentials};
    pub use crate::connector::{Connector, PreparedStatement};

    // Generic rows and helpers
    pub use crate::functions::{FunctionCategory, SqlFunction};
    pub use crate::operation::{FromRow, MySqlOperation, ToParams};
    pub use crate::sql_params;
}

// Re-export commonly used items at crate root
pub use connector::{Connector, PreparedStatement};
pub use error::{Error, Result};
pub use types::{Row, Value};

/// Build a positional parameter list, converting each argument into a [`Value`].
///
/// ```
/// use mysql_connector::{sql_params, Value};
///
/// let params = sql_params!["eee", 11, None::<i32>];
/// assert_eq!(params, vec![Value::from("eee"), Value::Int32(11), Value::Null]);
/// ```
#[macro_export]
macro_rules! sql_params {
    () => {
        ::std::vec::Vec::<$crate::types::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::types::Value::from($value)),+]
    };
}
