//! Argument checks run before DDL text is assembled.
//!
//! Database, table and column names are spliced into statements verbatim, so
//! they are held to MySQL's unquoted identifier alphabet. Datatype strings
//! are column definitions (`VARCHAR(256) NOT NULL DEFAULT 'x'`): anything
//! goes inside a quoted literal, and outside one nothing that could end the
//! statement or open a comment is accepted.

use crate::error::Error;

/// Longest identifier MySQL accepts for databases, tables and columns
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Longest column definition accepted
pub const MAX_TYPE_NAME_LEN: usize = 255;

/// Validate a database, table or column name.
///
/// - Must not be empty
/// - At most 64 characters
/// - May only contain ASCII alphanumerics, underscores and `$`
/// - May start with a digit, but must not consist of digits only
///
/// # Examples
///
/// ```
/// use mysql_connector::security::validate_sql_identifier;
///
/// assert!(validate_sql_identifier("database1_db").is_ok());
/// assert!(validate_sql_identifier("2024_sales").is_ok());
/// assert!(validate_sql_identifier("2024").is_err());
/// assert!(validate_sql_identifier("x; DROP TABLE users--").is_err());
/// assert!(validate_sql_identifier("").is_err());
/// ```
pub fn validate_sql_identifier(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(Error::validation("SQL identifier cannot be empty"));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::validation(format!(
            "SQL identifier too long: {} chars (max {})",
            name.len(),
            MAX_IDENTIFIER_LEN
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '$')
    {
        return Err(Error::validation(format!(
            "invalid SQL identifier '{}': contains invalid character '{}'",
            name, c
        )));
    }

    // An all-digit name would be read as a number
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "invalid SQL identifier '{}': must not consist of digits only",
            name
        )));
    }

    Ok(())
}

/// Validate a column definition for a `CREATE TABLE` column list.
///
/// Quoted literals (`'...'` or `"..."`, with `''` and backslash escapes)
/// may contain anything except a line break. Outside them, `;`, `#`, `--`,
/// `/*`, backticks and line breaks are rejected, and every quote must be
/// closed.
///
/// # Examples
///
/// ```
/// use mysql_connector::security::validate_sql_type_name;
///
/// assert!(validate_sql_type_name("VARCHAR(256)").is_ok());
/// assert!(validate_sql_type_name("DATETIME DEFAULT '2020-01-01 00:00:00'").is_ok());
/// assert!(validate_sql_type_name("INT COMMENT \"a; b\"").is_ok());
/// assert!(validate_sql_type_name("INT; DROP TABLE users").is_err());
/// ```
pub fn validate_sql_type_name(type_name: &str) -> crate::Result<()> {
    if type_name.trim().is_empty() {
        return Err(Error::validation("SQL datatype cannot be empty"));
    }

    if type_name.len() > MAX_TYPE_NAME_LEN {
        return Err(Error::validation(format!(
            "SQL datatype too long: {} chars (max {})",
            type_name.len(),
            MAX_TYPE_NAME_LEN
        )));
    }

    let invalid = |what: &str| {
        Error::validation(format!("invalid SQL datatype '{}': {}", type_name, what))
    };

    let mut chars = type_name.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if matches!(c, '\n' | '\r') {
            return Err(invalid("contains a line break"));
        }

        match quote {
            Some(q) => {
                if c == '\\' {
                    if matches!(chars.next(), Some('\n' | '\r')) {
                        return Err(invalid("contains a line break"));
                    }
                } else if c == q {
                    // A doubled quote is an escaped quote, the literal goes on
                    if chars.peek() == Some(&q) {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                ';' | '#' | '`' => {
                    return Err(invalid(&format!("contains invalid character '{}'", c)))
                }
                '-' if chars.peek() == Some(&'-') => {
                    return Err(invalid("contains a comment marker"))
                }
                '/' if chars.peek() == Some(&'*') => {
                    return Err(invalid("contains a comment marker"))
                }
                _ => {}
            },
        }
    }

    if quote.is_some() {
        return Err(invalid("unterminated quoted literal"));
    }

    Ok(())
}
