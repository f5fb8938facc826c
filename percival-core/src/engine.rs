//! Engine: validated statement construction, transaction lifecycle and
//! execution over a single exclusively-owned connection

use crate::builder::{
    AggregateFunction, Cond, Connective, DeleteBuilder, InsertBuilder, OrderBy, Page,
    QueryBuilder, SelectBuilder, Statement, UpdateBuilder,
};
use crate::executor::{Connection, Row};
use crate::params::Parameters;
use crate::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Connection parameters for constructing an engine.
///
/// Drivers consume the fields they understand; SQLite only reads
/// `database`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Driver-specific key/value options
    pub options: Vec<(String, String)>,
}

impl ConnectOptions {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.push((key.to_string(), value.to_string()));
        self
    }
}

/// Append a structured failure record before the error surfaces to the
/// caller. Validation failures carry no statement; execution failures carry
/// the statement text and its bound parameters.
fn report_failure(err: &Error, table: Option<&str>, statement: Option<&Statement>) {
    match statement {
        Some(st) => error!(
            table,
            sql = %st.sql,
            params = ?st.params,
            code = err.sql_code(),
            error = %err,
            "database operation failed"
        ),
        None => error!(
            table,
            code = err.sql_code(),
            error = %err,
            "database operation failed"
        ),
    }
}

/// Query and transaction engine over a single database connection.
///
/// The connection handle and the transaction flag are exclusively owned by
/// one engine instance; `&mut self` receivers serialize callers statically.
pub struct Engine<C> {
    conn: Option<C>,
    in_transaction: bool,
}

impl<C: Connection> Engine<C> {
    /// Engine over an established connection
    pub fn with_connection(conn: C) -> Self {
        Self {
            conn: Some(conn),
            in_transaction: false,
        }
    }

    /// Engine in the disconnected state; every operation fails fast with
    /// `NotConnected` instead of attempting I/O.
    pub fn disconnected() -> Self {
        Self {
            conn: None,
            in_transaction: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Raw escape hatch: the live connection, for statement shapes outside
    /// the canned operations. `None` when disconnected.
    pub fn connection(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    /// Close the connection. Any open transaction is abandoned; the driver
    /// is responsible for actual cleanup on teardown.
    pub async fn disconnect(&mut self) {
        self.in_transaction = false;
        if let Some(conn) = self.conn.take() {
            if let Err(err) = conn.close().await {
                warn!(error = %err, "error while closing connection");
            }
        }
    }

    // --- read operations ---

    /// Fetch the first row matching `conditions`, or `None`
    pub async fn get_row(
        &mut self,
        table: &str,
        conditions: Vec<Cond>,
        connective: Connective,
    ) -> Result<Option<Row>> {
        let statement = self.prepare(
            table,
            SelectBuilder::new(table)
                .conditions(conditions)
                .connective(connective)
                .page(Page::limit(1)),
        )?;
        self.fetch_optional(table, &statement).await
    }

    /// Fetch all rows matching `conditions`, optionally ordered and paged
    pub async fn get_rows(
        &mut self,
        table: &str,
        conditions: Vec<Cond>,
        connective: Connective,
        order: Option<OrderBy>,
        page: Option<Page>,
    ) -> Result<Vec<Row>> {
        let mut builder = SelectBuilder::new(table)
            .conditions(conditions)
            .connective(connective);
        if let Some(order) = order {
            builder = builder.order_by(order);
        }
        if let Some(page) = page {
            builder = builder.page(page);
        }
        let statement = self.prepare(table, builder)?;
        self.fetch_all(table, &statement).await
    }

    /// Count rows matching `conditions`
    pub async fn count_rows(
        &mut self,
        table: &str,
        conditions: Vec<Cond>,
        connective: Connective,
    ) -> Result<i64> {
        let statement = self.prepare(
            table,
            SelectBuilder::new(table)
                .count()
                .conditions(conditions)
                .connective(connective),
        )?;
        let row = self.fetch_optional(table, &statement).await?;
        Ok(row
            .as_ref()
            .and_then(|r| r.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Compute a single aggregate over `column`; `Null` when the table has
    /// no matching rows
    pub async fn get_aggregate(
        &mut self,
        table: &str,
        function: AggregateFunction,
        column: &str,
        conditions: Vec<Cond>,
        connective: Connective,
    ) -> Result<Value> {
        let statement = self.prepare(
            table,
            SelectBuilder::new(table)
                .aggregate(function, column)
                .conditions(conditions)
                .connective(connective),
        )?;
        let row = self.fetch_optional(table, &statement).await?;
        Ok(row
            .and_then(|mut r| r.remove("aggregate"))
            .unwrap_or(Value::Null))
    }

    // --- mutating operations, each wrapped begin/execute/commit ---

    /// Insert one row; columns and values are positional pairs
    pub async fn insert_row(
        &mut self,
        table: &str,
        columns: &[&str],
        values: Vec<Value>,
    ) -> Result<u64> {
        let statement = self.prepare(
            table,
            InsertBuilder::new(table).columns(columns).values(values),
        )?;
        self.execute_mutation(table, &statement).await
    }

    /// Set `target_column` to `target_value` on all rows matching
    /// `conditions`
    pub async fn update_row(
        &mut self,
        table: &str,
        target_column: &str,
        target_value: impl Into<Value>,
        conditions: Vec<Cond>,
        connective: Connective,
    ) -> Result<u64> {
        let statement = self.prepare(
            table,
            UpdateBuilder::new(table)
                .set(target_column, target_value)
                .conditions(conditions)
                .connective(connective),
        )?;
        self.execute_mutation(table, &statement).await
    }

    /// Delete all rows matching `conditions`
    pub async fn delete_row(
        &mut self,
        table: &str,
        conditions: Vec<Cond>,
        connective: Connective,
    ) -> Result<u64> {
        let statement = self.prepare(
            table,
            DeleteBuilder::new(table)
                .conditions(conditions)
                .connective(connective),
        )?;
        self.execute_mutation(table, &statement).await
    }

    // --- transaction lifecycle ---

    /// Open a transaction. Fails with `TransactionAlreadyActive` when one is
    /// in progress; the guard check never touches the connection.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(self.state_error(Error::TransactionAlreadyActive));
        }
        let conn = self.live_connection(None)?;
        conn.execute("BEGIN", &Parameters::new())
            .await
            .map_err(|err| {
                report_failure(&err, None, None);
                err
            })?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commit the open transaction
    pub async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(self.state_error(Error::NoActiveTransaction));
        }
        let conn = self.live_connection(None)?;
        conn.execute("COMMIT", &Parameters::new())
            .await
            .map_err(|err| {
                report_failure(&err, None, None);
                err
            })?;
        self.in_transaction = false;
        Ok(())
    }

    /// Roll back the open transaction. The transaction is considered
    /// abandoned even when the ROLLBACK statement itself fails.
    pub async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(self.state_error(Error::NoActiveTransaction));
        }
        self.in_transaction = false;
        let conn = self.live_connection(None)?;
        conn.execute("ROLLBACK", &Parameters::new())
            .await
            .map_err(|err| {
                report_failure(&err, None, None);
                err
            })?;
        Ok(())
    }

    // --- internals ---

    fn prepare<B: QueryBuilder>(&self, table: &str, builder: B) -> Result<Statement> {
        builder.build().map_err(|err| {
            report_failure(&err, Some(table), None);
            err
        })
    }

    fn state_error(&self, err: Error) -> Error {
        report_failure(&err, None, None);
        err
    }

    fn live_connection(&mut self, table: Option<&str>) -> Result<&mut C> {
        match self.conn.as_mut() {
            Some(conn) => Ok(conn),
            None => {
                let err = Error::NotConnected;
                report_failure(&err, table, None);
                Err(err)
            }
        }
    }

    async fn fetch_optional(&mut self, table: &str, statement: &Statement) -> Result<Option<Row>> {
        let conn = self.live_connection(Some(table))?;
        conn.fetch_optional(&statement.sql, &statement.params)
            .await
            .map_err(|err| {
                report_failure(&err, Some(table), Some(statement));
                err
            })
    }

    async fn fetch_all(&mut self, table: &str, statement: &Statement) -> Result<Vec<Row>> {
        let conn = self.live_connection(Some(table))?;
        conn.fetch_all(&statement.sql, &statement.params)
            .await
            .map_err(|err| {
                report_failure(&err, Some(table), Some(statement));
                err
            })
    }

    async fn execute(&mut self, table: &str, statement: &Statement) -> Result<u64> {
        let conn = self.live_connection(Some(table))?;
        conn.execute(&statement.sql, &statement.params)
            .await
            .map_err(|err| {
                report_failure(&err, Some(table), Some(statement));
                err
            })
    }

    /// begin → execute → commit; on execution failure roll back before
    /// returning the original error. A rollback failure is logged and does
    /// not mask the execution error.
    async fn execute_mutation(&mut self, table: &str, statement: &Statement) -> Result<u64> {
        self.begin_transaction().await?;
        match self.execute(table, statement).await {
            Ok(affected) => {
                self.commit().await?;
                Ok(affected)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(table, error = %rollback_err, "rollback failed after statement error");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operator;

    #[derive(Default)]
    struct MockConnection {
        fail_statements: bool,
        fail_rollback: bool,
        rows: Vec<Row>,
        statements: Vec<(String, Parameters)>,
    }

    impl MockConnection {
        fn new() -> Self {
            Self::default()
        }

        fn with_rows(rows: Vec<Row>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        fn with_failure() -> Self {
            Self {
                fail_statements: true,
                ..Self::default()
            }
        }

        fn is_tx_control(sql: &str) -> bool {
            matches!(sql, "BEGIN" | "COMMIT" | "ROLLBACK")
        }
    }

    impl Connection for MockConnection {
        async fn execute(&mut self, sql: &str, params: &Parameters) -> Result<u64> {
            self.statements.push((sql.to_string(), params.clone()));
            if sql == "ROLLBACK" && self.fail_rollback {
                return Err(Error::execution("rollback refused"));
            }
            if self.fail_statements && !Self::is_tx_control(sql) {
                return Err(Error::execution("forced failure"));
            }
            Ok(1)
        }

        async fn fetch_optional(&mut self, sql: &str, params: &Parameters) -> Result<Option<Row>> {
            self.statements.push((sql.to_string(), params.clone()));
            if self.fail_statements {
                return Err(Error::execution("forced failure"));
            }
            Ok(self.rows.first().cloned())
        }

        async fn fetch_all(&mut self, sql: &str, params: &Parameters) -> Result<Vec<Row>> {
            self.statements.push((sql.to_string(), params.clone()));
            if self.fail_statements {
                return Err(Error::execution("forced failure"));
            }
            Ok(self.rows.clone())
        }

        async fn close(self) -> Result<()> {
            Ok(())
        }
    }

    fn user_row(username: &str, age: i64) -> Row {
        let mut row = Row::new();
        row.insert("username".to_string(), Value::String(username.to_string()));
        row.insert("age".to_string(), Value::I64(age));
        row
    }

    fn sent(engine: &mut Engine<MockConnection>) -> Vec<(String, Parameters)> {
        engine.connection().unwrap().statements.clone()
    }

    #[tokio::test]
    async fn test_invalid_column_never_reaches_gateway() {
        let mut engine = Engine::with_connection(MockConnection::new());
        let bad = "username; DROP TABLE users";

        let err = engine
            .get_row("users", vec![Cond::eq(bad, "x")], Connective::And)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));

        let err = engine
            .get_rows("users", vec![Cond::eq(bad, "x")], Connective::And, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));

        let err = engine
            .insert_row("users", &[bad], vec!["x".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));

        let err = engine
            .update_row("users", bad, "x", vec![], Connective::And)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));

        let err = engine
            .delete_row("users", vec![Cond::eq(bad, "x")], Connective::And)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));

        assert!(sent(&mut engine).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_table_rejected() {
        let mut engine = Engine::with_connection(MockConnection::new());
        let err = engine
            .get_row("users u", vec![], Connective::And)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTableName { .. }));
        assert!(sent(&mut engine).is_empty());
    }

    #[tokio::test]
    async fn test_count_mismatch_before_sql() {
        let mut engine = Engine::with_connection(MockConnection::new());
        let err = engine
            .insert_row("users", &["a", "b"], vec!["only".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CountMismatch { .. }));
        assert!(sent(&mut engine).is_empty());
    }

    #[tokio::test]
    async fn test_parameter_ordering_matches_condition_order() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine
            .get_row(
                "users",
                vec![
                    ("a", Operator::Gt, 1).into(),
                    ("b", Operator::Lt, 2).into(),
                    ("c", 3).into(),
                ],
                Connective::And,
            )
            .await
            .unwrap();

        let statements = sent(&mut engine);
        assert_eq!(statements.len(), 1);
        let (sql, params) = &statements[0];
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" WHERE \"a\" > :a AND \"b\" < :b AND \"c\" = :c LIMIT 1"
        );
        let captured: Vec<(&str, &Value)> = params.iter().collect();
        assert_eq!(
            captured,
            vec![
                (":a", &Value::I32(1)),
                (":b", &Value::I32(2)),
                (":c", &Value::I32(3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_pagination_clause_text() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine
            .get_rows(
                "users",
                vec![],
                Connective::And,
                Some(OrderBy::asc("id")),
                Some(Page::limit(10).offset(0)),
            )
            .await
            .unwrap();
        let statements = sent(&mut engine);
        assert_eq!(
            statements[0].0,
            "SELECT * FROM \"users\" ORDER BY \"id\" ASC LIMIT 10 OFFSET 0"
        );
    }

    #[tokio::test]
    async fn test_get_row_hit_and_miss() {
        let mut engine =
            Engine::with_connection(MockConnection::with_rows(vec![user_row("john_doe", 30)]));
        let row = engine
            .get_row("users", vec![Cond::eq("username", "john_doe")], Connective::And)
            .await
            .unwrap()
            .expect("row should be returned");
        assert_eq!(row.get("age"), Some(&Value::I64(30)));

        let mut engine = Engine::with_connection(MockConnection::new());
        let row = engine
            .get_row("users", vec![Cond::eq("username", "nobody")], Connective::And)
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_count_rows_reads_count_column() {
        let mut row = Row::new();
        row.insert("count".to_string(), Value::I64(7));
        let mut engine = Engine::with_connection(MockConnection::with_rows(vec![row]));
        let count = engine
            .count_rows("users", vec![], Connective::And)
            .await
            .unwrap();
        assert_eq!(count, 7);

        let mut engine = Engine::with_connection(MockConnection::new());
        let count = engine
            .count_rows("users", vec![], Connective::And)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_aggregate_reads_alias() {
        let mut row = Row::new();
        row.insert("aggregate".to_string(), Value::F64(12.5));
        let mut engine = Engine::with_connection(MockConnection::with_rows(vec![row]));
        let value = engine
            .get_aggregate(
                "orders",
                AggregateFunction::Avg,
                "total",
                vec![],
                Connective::And,
            )
            .await
            .unwrap();
        assert_eq!(value, Value::F64(12.5));

        let mut engine = Engine::with_connection(MockConnection::new());
        let value = engine
            .get_aggregate(
                "orders",
                AggregateFunction::Max,
                "total",
                vec![],
                Connective::And,
            )
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_mutation_wrapped_in_transaction() {
        let mut engine = Engine::with_connection(MockConnection::new());
        let affected = engine
            .insert_row("users", &["username"], vec!["john_doe".into()])
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let statements = sent(&mut engine);
        let sqls: Vec<&str> = statements.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(
            sqls,
            vec![
                "BEGIN",
                "INSERT INTO \"users\" (\"username\") VALUES (:username)",
                "COMMIT",
            ]
        );
        assert!(!engine.in_transaction());
    }

    #[tokio::test]
    async fn test_mutation_failure_rolls_back() {
        let mut engine = Engine::with_connection(MockConnection::with_failure());
        let err = engine
            .insert_row("users", &["username"], vec!["john_doe".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Execution { .. }));
        assert!(!engine.in_transaction());

        let statements = sent(&mut engine);
        let sqls: Vec<&str> = statements.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(
            sqls,
            vec![
                "BEGIN",
                "INSERT INTO \"users\" (\"username\") VALUES (:username)",
                "ROLLBACK",
            ]
        );
    }

    #[tokio::test]
    async fn test_rollback_failure_does_not_mask_original_error() {
        let mut engine = Engine::with_connection(MockConnection {
            fail_statements: true,
            fail_rollback: true,
            ..MockConnection::default()
        });
        let err = engine
            .update_row("users", "age", 31, vec![], Connective::And)
            .await
            .unwrap_err();
        match err {
            Error::Execution { message, .. } => assert_eq!(message, "forced failure"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!engine.in_transaction());
    }

    #[tokio::test]
    async fn test_commit_and_rollback_require_open_transaction() {
        let mut engine = Engine::with_connection(MockConnection::new());

        let err = engine.commit().await.unwrap_err();
        assert!(matches!(err, Error::NoActiveTransaction));
        let err = engine.rollback().await.unwrap_err();
        assert!(matches!(err, Error::NoActiveTransaction));
        assert!(!engine.in_transaction());
        assert!(sent(&mut engine).is_empty());
    }

    #[tokio::test]
    async fn test_begin_rejects_nested_transaction() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine.begin_transaction().await.unwrap();
        let err = engine.begin_transaction().await.unwrap_err();
        assert!(matches!(err, Error::TransactionAlreadyActive));
        assert!(engine.in_transaction());
    }

    #[tokio::test]
    async fn test_mutation_rejected_inside_caller_transaction() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine.begin_transaction().await.unwrap();
        let err = engine
            .insert_row("users", &["username"], vec!["x".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransactionAlreadyActive));
        // only the caller's BEGIN reached the connection
        assert_eq!(sent(&mut engine).len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_transaction_flow() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine.begin_transaction().await.unwrap();
        assert!(engine.in_transaction());
        engine.commit().await.unwrap();
        assert!(!engine.in_transaction());

        engine.begin_transaction().await.unwrap();
        engine.rollback().await.unwrap();
        assert!(!engine.in_transaction());
    }

    #[tokio::test]
    async fn test_disconnected_engine_fails_fast() {
        let mut engine = Engine::<MockConnection>::disconnected();
        assert!(!engine.is_connected());
        assert!(engine.connection().is_none());

        let err = engine
            .get_row("users", vec![], Connective::And)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));

        let err = engine
            .insert_row("users", &["a"], vec![1.into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_disconnect_abandons_transaction() {
        let mut engine = Engine::with_connection(MockConnection::new());
        engine.begin_transaction().await.unwrap();
        engine.disconnect().await;
        assert!(!engine.is_connected());
        assert!(!engine.in_transaction());

        let err = engine.commit().await.unwrap_err();
        assert!(matches!(err, Error::NoActiveTransaction));
    }

    #[tokio::test]
    async fn test_connect_options_builder() {
        let options = ConnectOptions::new("app")
            .host("localhost")
            .port(5432)
            .username("svc")
            .password("secret")
            .option("sslmode", "disable");
        assert_eq!(options.database, "app");
        assert_eq!(options.host, "localhost");
        assert_eq!(options.port, Some(5432));
        assert_eq!(options.options.len(), 1);
    }
}
