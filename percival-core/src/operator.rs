//! Comparison operators permitted in condition clauses

use crate::{Error, Result};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Closed set of comparison operators.
///
/// Operator text reaches the statement through this enum only, so arbitrary
/// caller strings can never be interpolated into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::Like,
        Operator::In,
    ];

    /// Get the SQL text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
        }
    }

    /// Parse an operator string, rejecting anything outside the set
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "LIKE" | "like" => Ok(Operator::Like),
            "IN" | "in" => Ok(Operator::In),
            other => Err(Error::InvalidOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operator::parse(s)
    }
}
