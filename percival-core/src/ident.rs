//! Identifier validation and quoting
//!
//! Identifiers cannot travel as bound parameters, so every table or column
//! name is checked against `^[A-Za-z0-9_]+$` before it is interpolated into
//! statement text. This check is the injection defense for the identifier
//! position; values never pass through here.

use crate::{Error, Result};

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Validate a table name
pub fn table_name(name: &str) -> Result<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(Error::invalid_table(name))
    }
}

/// Validate a column name
pub fn column_name(name: &str) -> Result<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(Error::invalid_column(name))
    }
}

/// Render a validated identifier as a quoted identifier
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}
