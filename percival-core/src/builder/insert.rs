//! INSERT statement builder

use super::{QueryBuilder, Statement};
use crate::params::Parameters;
use crate::{ident, Error, Result, Value};

/// INSERT statement builder.
///
/// Columns and values are parallel ordered sequences; the count-parity
/// invariant is checked before any SQL is assembled.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Set the column list
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Set the value list, positionally matching the column list
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// Append a single column/value pair
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value.into());
        self
    }
}

impl QueryBuilder for InsertBuilder {
    fn build(&self) -> Result<Statement> {
        let table = ident::table_name(&self.table)?;
        if self.columns.is_empty() {
            return Err(Error::invalid_statement(
                "INSERT requires at least one column",
            ));
        }
        for column in &self.columns {
            ident::column_name(column)?;
        }
        // zip enforces count parity and duplicate rejection
        let params = Parameters::zip(&self.columns, &self.values)?;

        let quoted: Vec<String> = self.columns.iter().map(|c| ident::quote(c)).collect();
        let placeholders: Vec<String> = self
            .columns
            .iter()
            .map(|c| Parameters::placeholder(c))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            ident::quote(table),
            quoted.join(", "),
            placeholders.join(", ")
        );

        Ok(Statement { sql, params })
    }
}
