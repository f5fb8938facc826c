use percival_core::{
    connect, AggregateFunction, Cond, ConnectOptions, Connective, Operator, OrderBy, Page,
    Parameters,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Failures are also appended to percival.log once the sink is installed
    let _ = percival_core::logging::init();

    let mut engine = connect(&ConnectOptions::new(":memory:")).await;
    assert!(engine.is_connected());

    // Raw escape hatch for statement shapes outside the canned operations
    engine
        .connection()
        .unwrap()
        .execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, username TEXT, email TEXT, age INTEGER)",
            &Parameters::new(),
        )
        .await
        .unwrap();

    engine
        .insert_row(
            "users",
            &["username", "email", "age"],
            vec!["john_doe".into(), "john@example.com".into(), 30.into()],
        )
        .await
        .unwrap();
    engine
        .insert_row(
            "users",
            &["username", "email", "age"],
            vec!["jane_doe".into(), "jane@example.com".into(), 27.into()],
        )
        .await
        .unwrap();

    let row = engine
        .get_row(
            "users",
            vec![Cond::eq("username", "john_doe")],
            Connective::And,
        )
        .await
        .unwrap()
        .expect("john_doe should exist");
    println!("john_doe: {:?}", row);

    let adults = engine
        .get_rows(
            "users",
            vec![Cond::new("age", Operator::Ge, 18)],
            Connective::And,
            Some(OrderBy::asc("username")),
            Some(Page::limit(10)),
        )
        .await
        .unwrap();
    println!("{} adult users", adults.len());

    let count = engine.count_rows("users", vec![], Connective::And).await.unwrap();
    println!("total rows: {}", count);

    let max_age = engine
        .get_aggregate("users", AggregateFunction::Max, "age", vec![], Connective::And)
        .await
        .unwrap();
    println!("max age: {:?}", max_age);

    engine
        .update_row(
            "users",
            "email",
            "john@new.example.com",
            vec![Cond::eq("username", "john_doe")],
            Connective::And,
        )
        .await
        .unwrap();

    // Caller-managed transaction spanning two raw statements
    engine.begin_transaction().await.unwrap();
    engine
        .connection()
        .unwrap()
        .execute(
            "DELETE FROM users WHERE username = :username",
            &Parameters::zip(&["username"], &["jane_doe".into()]).unwrap(),
        )
        .await
        .unwrap();
    engine.rollback().await.unwrap();

    let count = engine.count_rows("users", vec![], Connective::And).await.unwrap();
    println!("rows after rollback: {}", count);

    engine.disconnect().await;
    println!("disconnected: {}", !engine.is_connected());
}
