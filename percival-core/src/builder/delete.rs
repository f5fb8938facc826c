//! DELETE statement builder

use super::{render_where, Cond, Connective, QueryBuilder, Statement};
use crate::params::Parameters;
use crate::{ident, Result};

/// DELETE statement builder
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    conditions: Vec<Cond>,
    connective: Connective,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            connective: Connective::And,
        }
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

impl QueryBuilder for DeleteBuilder {
    fn build(&self) -> Result<Statement> {
        let table = ident::table_name(&self.table)?;

        let mut sql = format!("DELETE FROM {}", ident::quote(table));
        let mut params = Parameters::new();
        render_where(&self.conditions, self.connective, &mut sql, &mut params)?;

        Ok(Statement { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Operator, Value};

    #[test]
    fn test_delete_builder() {
        let statement = DeleteBuilder::new("users")
            .where_(("age", Operator::Lt, 13))
            .where_(("status", "inactive"))
            .connective(Connective::Or)
            .build()
            .unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM \"users\" WHERE \"age\" < :age OR \"status\" = :status"
        );
        assert_eq!(statement.params.get("age"), Some(&Value::I32(13)));
    }

    #[test]
    fn test_delete_without_where() {
        let statement = DeleteBuilder::new("users").build().unwrap();
        assert_eq!(statement.sql, "DELETE FROM \"users\"");
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_invalid_column_rejected() {
        let err = DeleteBuilder::new("users")
            .where_(("id OR 1=1", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));
    }
}
