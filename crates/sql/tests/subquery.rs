//! Tests for scalar, IN, EXISTS and correlated subqueries

mod common;

use common::setup_with_tables;
use shadow_sql::Value;

#[test]
fn test_scalar_subquery() {
    let mut ctx = setup_with_tables();

    assert_eq!(
        ctx.query_scalar("SELECT (SELECT MAX(amount) FROM orders) AS top"),
        Value::Int(200)
    );
    assert_eq!(
        ctx.query_scalar("SELECT (SELECT amount FROM orders WHERE id = 99) AS missing"),
        Value::Null
    );
    assert_error!(ctx, "SELECT (SELECT amount FROM orders) AS many", "more than 1 row");
    assert_error!(
        ctx,
        "SELECT (SELECT id, amount FROM orders WHERE id = 1) AS wide",
        "Operand should contain 1 column"
    );
}

#[test]
fn test_in_subquery() {
    let mut ctx = setup_with_tables();

    assert_rows!(ctx, "SELECT * FROM users WHERE id IN (SELECT user_id FROM orders)", 2);
    assert_rows!(ctx, "SELECT * FROM users WHERE id NOT IN (SELECT user_id FROM orders)", 1);
}

#[test]
fn test_exists_correlated() {
    let mut ctx = setup_with_tables();

    let names = ctx.query_column(
        "SELECT name FROM users u WHERE EXISTS \
         (SELECT 1 FROM orders o WHERE o.user_id = u.id AND o.amount > 150)",
        "name",
    );
    assert_eq!(names, vec![Value::from("Alice")]);

    assert_rows!(
        ctx,
        "SELECT * FROM users u WHERE NOT EXISTS (SELECT 1 FROM orders o WHERE o.user_id = u.id)",
        1
    );
}

#[test]
fn test_correlated_scalar_in_projection() {
    let mut ctx = setup_with_tables();

    let counts = ctx.query_column(
        "SELECT name, (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) AS n \
         FROM users u ORDER BY id",
        "n",
    );
    assert_eq!(counts, vec![Value::Int(2), Value::Int(1), Value::Int(0)]);
}

#[test]
fn test_subquery_in_from() {
    let mut ctx = setup_with_tables();

    assert_eq!(
        ctx.query_scalar("SELECT COUNT(*) FROM (SELECT user_id FROM orders GROUP BY user_id) t"),
        Value::Int(2)
    );
}

#[test]
fn test_row_comparison() {
    let mut ctx = setup_with_tables();

    assert_eq!(ctx.query_scalar("SELECT (1, 2) = (1, 2) AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT (1, 2) < (1, 3) AS v"), Value::Int(1));
    assert_rows!(ctx, "SELECT * FROM orders WHERE (user_id, amount) IN ((1, 200), (2, 150))", 2);
    assert_error!(ctx, "SELECT (1, 2) = (1, 2, 3)", "Operand should contain 2 column");
}
