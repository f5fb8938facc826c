//! SELECT statement builder: select-one/many, count and aggregate shapes

use super::{
    render_where, AggregateFunction, Cond, Connective, OrderBy, Page, QueryBuilder, Statement,
};
use crate::params::Parameters;
use crate::{ident, Result};

/// What the SELECT projects
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `SELECT *`
    All,
    /// `SELECT COUNT(*) AS count`
    CountAll,
    /// `SELECT FN("col") AS aggregate`
    Aggregate {
        function: AggregateFunction,
        column: String,
    },
}

/// SELECT statement builder
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    projection: Projection,
    conditions: Vec<Cond>,
    connective: Connective,
    order: Option<OrderBy>,
    page: Option<Page>,
}

impl SelectBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            projection: Projection::All,
            conditions: Vec::new(),
            connective: Connective::And,
            order: None,
            page: None,
        }
    }

    /// Project `COUNT(*) AS count` instead of rows
    pub fn count(mut self) -> Self {
        self.projection = Projection::CountAll;
        self
    }

    /// Project a single aggregate, aliased `aggregate`
    pub fn aggregate(mut self, function: AggregateFunction, column: &str) -> Self {
        self.projection = Projection::Aggregate {
            function,
            column: column.to_string(),
        };
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

    /// Set the ORDER BY clause
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the LIMIT/OFFSET clause
    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }
}

impl QueryBuilder for SelectBuilder {
    fn build(&self) -> Result<Statement> {
        let table = ident::table_name(&self.table)?;

        let mut sql = String::from("SELECT ");
        match &self.projection {
            Projection::All => sql.push('*'),
            Projection::CountAll => sql.push_str("COUNT(*) AS count"),
            Projection::Aggregate { function, column } => {
                let column = ident::column_name(column)?;
                sql.push_str(&format!(
                    "{}({}) AS aggregate",
                    function,
                    ident::quote(column)
                ));
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(&ident::quote(table));

        let mut params = Parameters::new();
        render_where(&self.conditions, self.connective, &mut sql, &mut params)?;

        if let Some(order) = &self.order {
            let column = ident::column_name(&order.column)?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&ident::quote(column));
            sql.push(' ');
            sql.push_str(order.direction.as_str());
        }

        if let Some(page) = &self.page {
            sql.push_str(&format!(" LIMIT {}", page.limit));
            if let Some(offset) = page.offset {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        Ok(Statement { sql, params })
    }
}
