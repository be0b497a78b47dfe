//! DDL statement builders
//!
//! Only the four statements the connector issues on its own behalf are
//! generated here. Names are validated, never quoted, so the text matches what
//! a caller would have typed.

use crate::error::{Error, Result};
use crate::security::{validate_sql_identifier, validate_sql_type_name};

/// `CREATE DATABASE IF NOT EXISTS <name>`
pub fn create_database(database: &str) -> Result<String> {
    validate_sql_identifier(database)?;
    Ok(format!("CREATE DATABASE IF NOT EXISTS {}", database))
}

/// `DROP DATABASE <name>`
pub fn drop_database(database: &str) -> Result<String> {
    validate_sql_identifier(database)?;
    Ok(format!("DROP DATABASE {}", database))
}

/// `DROP TABLE <name>`
pub fn drop_table(table: &str) -> Result<String> {
    validate_sql_identifier(table)?;
    Ok(format!("DROP TABLE {}", table))
}

/// `CREATE TABLE IF NOT EXISTS <table> (col1 TYPE1, col2 TYPE2, ...)`
///
/// `columns[i]` is paired with `datatypes[i]`; datatypes are upper-cased.
/// Both lists must have the same, non-zero length.
pub fn create_table<C, D>(table: &str, columns: &[C], datatypes: &[D]) -> Result<String>
where
    C: AsRef<str>,
    D: AsRef<str>,
{
    check_column_counts(columns.len(), datatypes.len())?;
    validate_sql_identifier(table)?;

    let mut definitions = Vec::with_capacity(columns.len());
    for (column, datatype) in columns.iter().zip(datatypes) {
        let (column, datatype) = (column.as_ref(), datatype.as_ref());
        validate_sql_identifier(column)?;
        validate_sql_type_name(datatype)?;
        definitions.push(format!("{} {}", column, datatype.trim().to_uppercase()));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table,
        definitions.join(", ")
    ))
}

fn check_column_counts(columns: usize, datatypes: usize) -> Result<()> {
    if columns != datatypes {
        let (shorter, relation) = if columns < datatypes {
            ("column", "<")
        } else {
            ("datatype", ">")
        };
        return Err(Error::validation(format!(
            "column count {} {} datatype count {}: {} list is shorter",
            columns, relation, datatypes, shorter
        )));
    }
    if columns == 0 {
        return Err(Error::validation(
            "argument array sizes do not match: at least one column and datatype is required",
        ));
    }
    Ok(())
}
