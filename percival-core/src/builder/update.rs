//! UPDATE statement builder

use super::{render_where, Cond, Connective, QueryBuilder, Statement};
use crate::params::Parameters;
use crate::{ident, Error, Result, Value};

/// UPDATE statement builder with a single SET assignment
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    target: Option<(String, Value)>,
    conditions: Vec<Cond>,
    connective: Connective,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            target: None,
            conditions: Vec::new(),
            connective: Connective::And,
        }
    }

    /// Set the target column and its new value
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.target = Some((column.to_string(), value.into()));
        self
    }

    /// Add a WHERE condition
    pub fn where_(mut self, cond: impl Into<Cond>) -> Self {
        self.conditions.push(cond.into());
        self
    }

    /// Replace the condition list wholesale
    pub fn conditions(mut self, conds: Vec<Cond>) -> Self {
        self.conditions = conds;
        self
    }

    /// Set the connective joining the conditions
    pub fn connective(mut self, connective: Connective) -> Self {
        self.connective = connective;
        self
    }
}

impl QueryBuilder for UpdateBuilder {
    fn build(&self) -> Result<Statement> {
        let table = ident::table_name(&self.table)?;
        let (target_column, target_value) = self
            .target
            .as_ref()
            .ok_or_else(|| Error::invalid_statement("UPDATE requires a SET assignment"))?;
        let target_column = ident::column_name(target_column)?;

        let mut sql = format!(
            "UPDATE {} SET {} = {}",
            ident::quote(table),
            ident::quote(target_column),
            Parameters::placeholder(target_column)
        );
        let mut params = Parameters::new();
        params.push(target_column, target_value.clone())?;

        render_where(&self.conditions, self.connective, &mut sql, &mut params)?;

        Ok(Statement { sql, params })
    }
}
