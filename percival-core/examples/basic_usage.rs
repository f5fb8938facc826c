use percival_core::{
    delete, insert, select, update, AggregateFunction, Connective, Operator, OrderBy, Page,
    QueryBuilder,
};

fn main() {
    // SELECT with conditions, ordering and pagination
    let query = select("users")
        .where_(("age", Operator::Gt, 18))
        .where_(("status", "active")) // defaults to =
        .order_by(OrderBy::desc("created_at"))
        .page(Page::limit(10).offset(20));

    let statement = query.build().unwrap();
    println!("SELECT SQL: {}", statement.sql);
    for (name, value) in statement.params.iter() {
        println!("  {} = {:?}", name, value);
    }

    // select-one shape: LIMIT 1
    let one = select("users")
        .where_(("username", "john_doe"))
        .page(Page::limit(1))
        .build()
        .unwrap();
    println!("SELECT-ONE SQL: {}", one.sql);

    // INSERT
    let statement = insert("users")
        .set("username", "john_doe")
        .set("email", "john@example.com")
        .set("age", 30)
        .build()
        .unwrap();
    println!("INSERT SQL: {}", statement.sql);

    // UPDATE with an OR-joined condition list
    let statement = update("users")
        .set("email", "newemail@example.com")
        .where_(("id", 123))
        .where_(("username", "john_doe"))
        .connective(Connective::Or)
        .build()
        .unwrap();
    println!("UPDATE SQL: {}", statement.sql);

    // DELETE
    let statement = delete("users")
        .where_(("age", Operator::Lt, 13))
        .build()
        .unwrap();
    println!("DELETE SQL: {}", statement.sql);

    // count and aggregate shapes
    let statement = select("users").count().build().unwrap();
    println!("COUNT SQL: {}", statement.sql);

    let statement = select("orders")
        .aggregate(AggregateFunction::Sum, "total")
        .where_(("status", "paid"))
        .build()
        .unwrap();
    println!("AGGREGATE SQL: {}", statement.sql);

    // IN over an array expands one placeholder per element
    let statement = select("users")
        .where_(("id", Operator::In, vec![1, 2, 3]))
        .build()
        .unwrap();
    println!("IN SQL: {}", statement.sql);

    // Identifier validation rejects injection attempts before any SQL exists
    let err = select("users")
        .where_(("name; DROP TABLE users", "x"))
        .build()
        .unwrap_err();
    println!("rejected: {}", err);
}
