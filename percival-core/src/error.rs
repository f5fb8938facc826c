//! Error types for Percival

use thiserror::Error;

/// The main error type for Percival operations
#[derive(Error, Debug)]
pub enum Error {
    /// Operation attempted on an engine without a live connection
    #[error("not connected to a database")]
    NotConnected,

    /// Connection could not be established at construction time
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Table name is empty or contains characters outside [A-Za-z0-9_]
    #[error("invalid table name '{table}'")]
    InvalidTableName { table: String },

    /// Column name is empty or contains characters outside [A-Za-z0-9_]
    #[error("invalid column name '{column}'")]
    InvalidColumnName { column: String },

    /// Operator string outside the supported set
    #[error("invalid operator '{operator}'")]
    InvalidOperator { operator: String },

    /// Same column bound twice within one statement
    #[error("duplicate column '{column}' in statement")]
    DuplicateColumn { column: String },

    /// Column and value counts differ
    #[error("count mismatch: {columns} columns against {values} values")]
    CountMismatch { columns: usize, values: usize },

    /// Statement shape misuse, e.g. INSERT with no columns
    #[error("invalid statement: {message}")]
    InvalidStatement { message: String },

    /// begin issued while a transaction is already open
    #[error("a transaction is already in progress")]
    TransactionAlreadyActive,

    /// commit/rollback issued with no open transaction
    #[error("no transaction is in progress")]
    NoActiveTransaction,

    /// Driver-level failure while executing a statement
    #[error("execution failed: {message}")]
    Execution {
        code: Option<String>,
        message: String,
        statement: Option<String>,
    },

    /// Row or value serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Percival operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a construction-time connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an invalid table name error
    pub fn invalid_table(table: impl Into<String>) -> Self {
        Self::InvalidTableName {
            table: table.into(),
        }
    }

    /// Create an invalid column name error
    pub fn invalid_column(column: impl Into<String>) -> Self {
        Self::InvalidColumnName {
            column: column.into(),
        }
    }

    /// Create a duplicate column error
    pub fn duplicate_column(column: impl Into<String>) -> Self {
        Self::DuplicateColumn {
            column: column.into(),
        }
    }

    /// Create a statement shape error
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement {
            message: message.into(),
        }
    }

    /// Create an execution error with no driver code
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            code: None,
            message: message.into(),
            statement: None,
        }
    }

    /// The SQL error code reported by the driver, if any
    pub fn sql_code(&self) -> Option<&str> {
        match self {
            Self::Execution { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => Self::Execution {
                code: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
                statement: None,
            },
            _ => Self::Execution {
                code: None,
                message: err.to_string(),
                statement: None,
            },
        }
    }
}
