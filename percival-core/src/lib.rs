//! Percival Core - parameterized SQL statement assembly and transactional
//! execution over a single database connection
//!
//! This crate turns structural query descriptions (table, conditions,
//! ordering, pagination, aggregate) into injection-safe parameterized SQL
//! plus an ordered bound-parameter set, executes mutations inside a
//! begin/commit/rollback envelope, and reports failures as structured
//! errors instead of raising faults.

pub mod builder;
pub mod engine;
pub mod error;
pub mod executor;
pub mod ident;
pub mod logging;
pub mod operator;
pub mod params;
pub mod value;

// Re-export main types
pub use builder::{
    AggregateFunction, Cond, Connective, DeleteBuilder, InsertBuilder, OrderBy, Page,
    Projection, QueryBuilder, SelectBuilder, SortDirection, Statement, UpdateBuilder,
};
pub use engine::{ConnectOptions, Engine};
pub use error::{Error, Result};
pub use executor::{Connection, Row};
pub use operator::Operator;
pub use params::Parameters;
pub use value::Value;

#[cfg(feature = "sqlite")]
pub use executor::sqlite::{connect, SqliteGateway};

/// Create a new SELECT statement builder for the given table
pub fn select(table: &str) -> SelectBuilder {
    SelectBuilder::new(table)
}

/// Create a new INSERT statement builder for the given table
pub fn insert(table: &str) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create a new UPDATE statement builder for the given table
pub fn update(table: &str) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a new DELETE statement builder for the given table
pub fn delete(table: &str) -> DeleteBuilder {
    DeleteBuilder::new(table)
}
