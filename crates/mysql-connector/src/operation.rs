//! Generic-row operations.
//!
//! [`MySqlOperation<T>`] exposes the connector's plain-text forms plus
//! forms that read rows into, and bind parameters from, a caller-defined
//! type `T`. The connector does not guess how `T` maps to a row: the mapping
//! is whatever `T`'s [`FromRow`] and [`ToParams`] implementations say.
//!
//! ```rust,ignore
//! struct Reading { sensor: String, value: i64 }
//!
//! impl FromRow for Reading {
//!     fn from_row(row: &Row) -> Result<Self> { /* ... */ }
//! }
//!
//! impl ToParams for Reading {
//!     fn to_params(&self) -> Vec<Value> {
//!         vec![self.sensor.as_str().into(), self.value.into()]
//!     }
//! }
//!
//! let readings: Vec<Reading> =
//!     MySqlOperation::<Reading>::query_to_generic_collection(&mut connector, "SELECT * FROM readings")?;
//! ```

use std::borrow::Borrow;

use crate::connector::Connector;
use crate::error::Result;
use crate::types::{Row, Value};

/// Build a value from one result row
pub trait FromRow: Sized {
    /// Map the row, failing if a column is missing or has the wrong shape
    fn from_row(row: &Row) -> Result<Self>;
}

/// Produce the positional parameters for one statement execution
pub trait ToParams {
    /// Parameters in placeholder order
    fn to_params(&self) -> Vec<Value>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

impl FromRow for Vec<Value> {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.values().to_vec())
    }
}

impl FromRow for Vec<Option<String>> {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.to_text_by_name())
    }
}

impl ToParams for Value {
    fn to_params(&self) -> Vec<Value> {
        vec![self.clone()]
    }
}

impl ToParams for [Value] {
    fn to_params(&self) -> Vec<Value> {
        self.to_vec()
    }
}

impl ToParams for Vec<Value> {
    fn to_params(&self) -> Vec<Value> {
        self.clone()
    }
}

impl<T: ToParams + ?Sized> ToParams for &T {
    fn to_params(&self) -> Vec<Value> {
        (**self).to_params()
    }
}

/// Connector operations, with generic forms over a row type `T`
pub trait MySqlOperation<T> {
    /// The connector the operations run on
    fn connector(&mut self) -> &mut Connector;

    /// See [`Connector::query`]
    fn query(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        self.connector().query(sql)
    }

    /// See [`Connector::query_to_collection`]
    fn query_to_collection<C>(&mut self, sql: &str) -> Result<C>
    where
        C: FromIterator<Vec<Option<String>>>,
    {
        self.connector().query_to_collection(sql)
    }

    /// See [`Connector::execute`]
    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.connector().execute(sql)
    }

    /// See [`Connector::execute_with_params`]
    fn execute_with_params(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.connector().execute_with_params(sql, params)
    }

    /// Run a query and map every row to `T`
    fn query_to_generic_collection<C>(&mut self, sql: &str) -> Result<C>
    where
        T: FromRow,
        C: FromIterator<T>,
    {
        let rows = self.connector().query_rows(sql)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute `sql` once with `item`'s parameters
    fn set_to_generic(&mut self, sql: &str, item: &T) -> Result<u64>
    where
        T: ToParams,
    {
        let params = item.to_params();
        self.connector().execute_with_params(sql, &params)
    }

    /// Execute `sql` once per item; returns the summed affected row count
    fn set_to_generic_slice(&mut self, sql: &str, items: &[T]) -> Result<u64>
    where
        T: ToParams,
    {
        self.set_to_generic_iter(sql, items)
    }

    /// Execute `sql` once per item of an ordered collection.
    ///
    /// Stops at the first failure; earlier executions stay applied.
    fn set_to_generic_iter<I>(&mut self, sql: &str, items: I) -> Result<u64>
    where
        T: ToParams,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut affected = 0;
        for item in items {
            affected += self.set_to_generic(sql, item.borrow())?;
        }
        Ok(affected)
    }
}

impl<T> MySqlOperation<T> for Connector {
    fn connector(&mut self) -> &mut Connector {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mappings() {
        let row = Row::new(
            vec!["String_t".into(), "Integer_t".into()],
            vec![Value::from("ddd"), Value::Null],
        );

        let text = Vec::<Option<String>>::from_row(&row).unwrap();
        assert_eq!(text, vec![Some("ddd".to_string()), None]);

        let values = Vec::<Value>::from_row(&row).unwrap();
        assert_eq!(values, vec![Value::from("ddd"), Value::Null]);
    }

    #[test]
    fn test_to_params() {
        let params = vec![Value::from("eee"), Value::from(11)];
        assert_eq!(params.to_params(), params);
        assert_eq!(params[..].to_params(), params);
        assert_eq!(Value::from(true).to_params(), vec![Value::Bool(true)]);
    }
}
