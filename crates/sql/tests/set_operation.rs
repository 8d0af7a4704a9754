//! Tests for UNION, INTERSECT and EXCEPT

mod common;

use common::{setup_test, setup_with_tables};
use shadow_sql::Value;

#[test]
fn test_union_deduplicates() {
    let mut ctx = setup_test();

    assert_rows!(ctx, "SELECT 1 AS a UNION SELECT 1", 1);
    assert_rows!(ctx, "SELECT 1 AS a UNION ALL SELECT 1", 2);
    assert_rows!(ctx, "SELECT 1 AS a UNION DISTINCT SELECT 1 UNION ALL SELECT 1", 2);
}

#[test]
fn test_union_takes_first_column_names() {
    let mut ctx = setup_with_tables();

    let result = ctx.query_result(
        "SELECT name AS who FROM users WHERE id = 1 UNION ALL SELECT amount FROM orders WHERE id = 1",
    );
    assert_eq!(result.column_names(), vec!["who"]);
    assert_eq!(result.values("who"), vec![Value::from("Alice"), Value::Int(100)]);
}

#[test]
fn test_union_order_by_limit() {
    let mut ctx = setup_with_tables();

    let values = ctx.query_column(
        "SELECT age AS v FROM users UNION SELECT amount FROM orders ORDER BY v DESC LIMIT 3",
        "v",
    );
    assert_eq!(values, vec![Value::Int(200), Value::Int(150), Value::Int(100)]);
}

#[test]
fn test_intersect_and_except() {
    let mut ctx = setup_with_tables();

    let both = ctx.query_column(
        "SELECT id FROM users INTERSECT SELECT user_id FROM orders",
        "id",
    );
    assert_eq!(both, vec![Value::Int(1), Value::Int(2)]);

    let only_users = ctx.query_column(
        "SELECT id FROM users EXCEPT SELECT user_id FROM orders",
        "id",
    );
    assert_eq!(only_users, vec![Value::Int(3)]);
}

#[test]
fn test_column_count_mismatch() {
    let mut ctx = setup_test();

    assert_error!(
        ctx,
        "SELECT 1, 2 UNION SELECT 1",
        "different number of columns"
    );
}
