//! Tests for joins across tables and derived tables

mod common;

use common::{setup_test, setup_with_tables, TableBuilder};
use shadow_sql::Value;

#[test]
fn test_inner_join() {
    let mut ctx = setup_with_tables();

    assert_rows!(ctx, "SELECT * FROM users u JOIN orders o ON u.id = o.user_id", 3);
    assert_rows!(ctx, "SELECT * FROM users u INNER JOIN orders o ON u.id = o.user_id WHERE o.amount > 120", 2);

    let result = ctx.query_result(
        "SELECT u.name, o.amount FROM users u JOIN orders o ON u.id = o.user_id ORDER BY o.amount",
    );
    assert_eq!(result.column_names(), vec!["name", "amount"]);
    assert_eq!(
        result.values("name"),
        vec![Value::from("Alice"), Value::from("Bob"), Value::from("Alice")]
    );
}

#[test]
fn test_left_join_keeps_unmatched_rows() {
    let mut ctx = setup_with_tables();

    // Two orders for Alice, one for Bob, none for Charlie
    assert_rows!(ctx, "SELECT * FROM users u LEFT JOIN orders o ON u.id = o.user_id", 4);

    let amounts = ctx.query_column(
        "SELECT o.amount FROM users u LEFT JOIN orders o ON u.id = o.user_id WHERE u.name = 'Charlie'",
        "amount",
    );
    assert_eq!(amounts, vec![Value::Null]);

    assert_rows!(
        ctx,
        "SELECT * FROM users u LEFT JOIN orders o ON u.id = o.user_id WHERE o.id IS NULL",
        1
    );
}

#[test]
fn test_right_join() {
    let mut ctx = setup_with_tables();

    ctx.exec("INSERT INTO orders VALUES (4, 9, 50)");
    assert_rows!(ctx, "SELECT * FROM users u RIGHT JOIN orders o ON u.id = o.user_id", 4);
    let names = ctx.query_column(
        "SELECT u.name FROM users u RIGHT JOIN orders o ON u.id = o.user_id WHERE o.id = 4",
        "name",
    );
    assert_eq!(names, vec![Value::Null]);
}

#[test]
fn test_cross_join() {
    let mut ctx = setup_with_tables();

    assert_rows!(ctx, "SELECT * FROM users, orders", 9);
    assert_rows!(ctx, "SELECT * FROM users CROSS JOIN orders", 9);
    assert_rows!(ctx, "SELECT * FROM users u, orders o WHERE u.id = o.user_id", 3);
}

#[test]
fn test_star_with_qualifier() {
    let mut ctx = setup_with_tables();

    let result = ctx.query_result("SELECT o.* FROM users u JOIN orders o ON u.id = o.user_id");
    assert_eq!(result.column_names(), vec!["id", "user_id", "amount"]);
}

#[test]
fn test_natural_join() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "a")
        .create_simple("k INT, x INT")
        .insert_values("(1, 10), (2, 20)");
    TableBuilder::new(&mut ctx, "b")
        .create_simple("k INT, y INT")
        .insert_values("(2, 200), (3, 300)");

    let ys = ctx.query_column("SELECT y FROM a NATURAL JOIN b", "y");
    assert_eq!(ys, vec![Value::Int(200)]);
}

#[test]
fn test_join_derived_table() {
    let mut ctx = setup_with_tables();

    let totals = ctx.query_column(
        "SELECT u.name, t.total FROM users u \
         JOIN (SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id) t \
         ON t.user_id = u.id ORDER BY t.total DESC",
        "total",
    );
    assert_eq!(totals, vec![Value::Int(300), Value::Int(150)]);
}

#[test]
fn test_join_unknown_column_in_condition() {
    let mut ctx = setup_with_tables();

    assert_error!(
        ctx,
        "SELECT * FROM users u JOIN orders o ON u.id = o.missing",
        "Column not found"
    );
}

#[test]
fn test_join_using() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "a")
        .create_simple("k INT, x INT")
        .insert_values("(1, 10), (2, 20)");
    TableBuilder::new(&mut ctx, "b")
        .create_simple("k INT, y INT")
        .insert_values("(1, 100), (1, 101), (3, 300)");

    assert_rows!(ctx, "SELECT * FROM a JOIN b USING (k)", 2);
    assert_rows!(ctx, "SELECT * FROM a LEFT JOIN b USING (k)", 3);
}
