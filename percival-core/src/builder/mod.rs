//! Statement builders for the supported statement shapes

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::{Projection, SelectBuilder};
pub use update::UpdateBuilder;

use crate::params::Parameters;
use crate::{ident, Operator, Result, Value};

/// A single WHERE-clause condition
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Cond {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand equality condition
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }
}

// Shorthand equality: ("age", 18)
impl<T> From<(&str, T)> for Cond
where
    T: Into<Value>,
{
    fn from(pair: (&str, T)) -> Self {
        Cond::eq(pair.0, pair.1)
    }
}

// Explicit operator: ("age", Operator::Gt, 18)
impl<T> From<(&str, Operator, T)> for Cond
where
    T: Into<Value>,
{
    fn from(triple: (&str, Operator, T)) -> Self {
        Cond::new(triple.0, triple.1, triple.2)
    }
}

/// Logical connective joining conditions in a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl std::fmt::Display for Connective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// LIMIT/OFFSET pair. An offset only exists alongside a limit, so
/// OFFSET-without-LIMIT cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: Option<u64>,
}

impl Page {
    pub fn limit(limit: u64) -> Self {
        Self {
            limit,
            offset: None,
        }
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Aggregation function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "COUNT"),
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Avg => write!(f, "AVG"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Max => write!(f, "MAX"),
        }
    }
}

/// A ready-to-bind statement: SQL text plus its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Parameters,
}

/// Core trait for all statement builders
pub trait QueryBuilder {
    /// Assemble the statement text and its bound-parameter set
    fn build(&self) -> Result<Statement>;
}

/// Render the WHERE clause for `conds` into `sql`, appending bindings to
/// `params` in condition order. Empty condition list emits nothing.
pub(crate) fn render_where(
    conds: &[Cond],
    connective: Connective,
    sql: &mut String,
    params: &mut Parameters,
) -> Result<()> {
    if conds.is_empty() {
        return Ok(());
    }
    sql.push_str(" WHERE ");

    for (i, cond) in conds.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(connective.as_str());
            sql.push(' ');
        }

        let column = ident::column_name(&cond.column)?;
        sql.push_str(&ident::quote(column));
        sql.push(' ');
        sql.push_str(cond.operator.as_str());

        match (&cond.operator, &cond.value) {
            // IN over an array expands to one placeholder per element
            (Operator::In, Value::Array(items)) => {
                sql.push_str(" (");
                for (j, item) in items.iter().enumerate() {
                    if j > 0 {
                        sql.push_str(", ");
                    }
                    let name = format!("{}_{}", column, j);
                    sql.push_str(&Parameters::placeholder(&name));
                    params.push(&name, item.clone())?;
                }
                sql.push(')');
            }
            (Operator::In, _) => {
                sql.push_str(" (");
                sql.push_str(&Parameters::placeholder(column));
                sql.push(')');
                params.push(column, cond.value.clone())?;
            }
            _ => {
                sql.push(' ');
                sql.push_str(&Parameters::placeholder(column));
                params.push(column, cond.value.clone())?;
            }
        }
    }

    Ok(())
}
