//! Statement execution against a live database connection

use crate::params::Parameters;
use crate::{Result, Value};
use std::collections::HashMap;
use std::future::Future;

/// A fetched row: column name to cell value
pub type Row = HashMap<String, Value>;

/// Low-level gateway between the engine and a concrete driver.
///
/// Implementations prepare the statement, bind the parameters in entry
/// order (placeholder first-appearance order equals entry order by
/// construction) and translate driver faults into `Error::Execution`.
pub trait Connection: Send {
    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE,
    /// transaction control)
    fn execute(
        &mut self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a statement and fetch at most one row
    fn fetch_optional(
        &mut self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<Option<Row>>> + Send;

    /// Execute a statement and fetch all rows
    fn fetch_all(
        &mut self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Tear down the underlying connection
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// SQLite gateway over a single `sqlx` connection
#[cfg(feature = "sqlite")]
pub mod sqlite {
    use super::*;
    use crate::engine::{ConnectOptions, Engine};
    use crate::Error;
    use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
    use sqlx::{Column as _, ConnectOptions as _, Connection as _, Row as _, TypeInfo as _, ValueRef as _};
    use std::str::FromStr;

    /// Single SQLite connection gateway
    pub struct SqliteGateway {
        conn: SqliteConnection,
    }

    impl SqliteGateway {
        /// Open a connection per `options`. Only the `database` field is
        /// meaningful for SQLite: a file path, or `:memory:`.
        pub async fn open(options: &ConnectOptions) -> Result<Self> {
            let url = database_url(options);
            let conn_options = SqliteConnectOptions::from_str(&url)
                .map_err(|err| Error::connection(err.to_string()))?
                .create_if_missing(true);
            let conn = conn_options
                .connect()
                .await
                .map_err(|err| Error::connection(err.to_string()))?;
            Ok(Self { conn })
        }
    }

    /// Connect and wrap in an engine; a failed attempt yields a
    /// disconnected engine rather than an error.
    pub async fn connect(options: &ConnectOptions) -> Engine<SqliteGateway> {
        match SqliteGateway::open(options).await {
            Ok(gateway) => Engine::with_connection(gateway),
            Err(err) => {
                tracing::error!(database = %options.database, error = %err, "connection failed");
                Engine::disconnected()
            }
        }
    }

    fn database_url(options: &ConnectOptions) -> String {
        if options.database == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}", options.database)
        }
    }

    impl Connection for SqliteGateway {
        async fn execute(&mut self, sql: &str, params: &Parameters) -> Result<u64> {
            let query = bind_parameters(sqlx::query(sql), params);
            let done = query.execute(&mut self.conn).await?;
            Ok(done.rows_affected())
        }

        async fn fetch_optional(&mut self, sql: &str, params: &Parameters) -> Result<Option<Row>> {
            let query = bind_parameters(sqlx::query(sql), params);
            match query.fetch_optional(&mut self.conn).await? {
                Some(row) => Ok(Some(decode_row(&row)?)),
                None => Ok(None),
            }
        }

        async fn fetch_all(&mut self, sql: &str, params: &Parameters) -> Result<Vec<Row>> {
            let query = bind_parameters(sqlx::query(sql), params);
            let rows = query.fetch_all(&mut self.conn).await?;
            let mut out = Vec::with_capacity(rows.len());
            for row in &rows {
                out.push(decode_row(row)?);
            }
            Ok(out)
        }

        async fn close(self) -> Result<()> {
            self.conn.close().await?;
            Ok(())
        }
    }

    type SqliteQuery<'q> =
        sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

    /// Bind values in entry order. SQLite assigns named placeholders
    /// indices by first appearance, which matches entry order.
    fn bind_parameters<'q>(mut query: SqliteQuery<'q>, params: &'q Parameters) -> SqliteQuery<'q> {
        for (_, value) in params.iter() {
            query = match value {
                Value::Null => query.bind(None::<i64>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(f64::from(*f)),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                Value::Json(j) => query.bind(j.to_string()),
                Value::Array(_) => query.bind(value.to_json().to_string()),
            };
        }
        query
    }

    fn decode_row(row: &SqliteRow) -> Result<Row> {
        let mut out = Row::new();
        for column in row.columns() {
            let index = column.ordinal();
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                Value::Null
            } else {
                match raw.type_info().name() {
                    "INTEGER" => Value::I64(row.try_get::<i64, _>(index)?),
                    "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(index)?),
                    "REAL" => Value::F64(row.try_get::<f64, _>(index)?),
                    "BLOB" => Value::Bytes(row.try_get::<Vec<u8>, _>(index)?),
                    _ => Value::String(row.try_get::<String, _>(index)?),
                }
            };
            out.insert(column.name().to_string(), value);
        }
        Ok(out)
    }

}
