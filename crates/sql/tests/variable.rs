//! Tests for session variables, parameters and date functions

mod common;

use common::{setup_test, setup_with_tables};
use shadow_sql::{Params, Value};

#[test]
fn test_set_and_read_variables() {
    let mut ctx = setup_test();

    ctx.exec("SET @a = 1, @b = 'x'");
    assert_eq!(ctx.query_scalar("SELECT @a + 1 AS v"), Value::Int(2));
    assert_eq!(ctx.query_scalar("SELECT @B AS v"), Value::from("x"));
    assert_eq!(ctx.query_scalar("SELECT @unset AS v"), Value::Null);

    // Server settings are accepted and ignored
    ctx.exec("SET NAMES utf8mb4");
    ctx.exec("SET @@session.sql_mode = 'STRICT', @c = 3");
    assert_eq!(ctx.query_scalar("SELECT @c AS v"), Value::Int(3));
}

#[test]
fn test_assignment_in_select() {
    let mut ctx = setup_with_tables();

    ctx.exec("SET @total = 0");
    ctx.query_result("SELECT @total := @total + age FROM users ORDER BY id");
    assert_eq!(ctx.query_scalar("SELECT @total AS v"), Value::Int(90));

    // Running counter over ordered rows
    ctx.exec("SET @n = 0");
    let ranks = ctx.query_column(
        "SELECT name, @n := @n + 1 AS rank_no FROM users ORDER BY age DESC",
        "rank_no",
    );
    assert_eq!(ranks, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_positional_and_named_parameters() {
    let mut ctx = setup_with_tables();

    let result = ctx.query_with(
        "SELECT name FROM users WHERE age > ? AND id <> :skip ORDER BY id",
        &Params::new().push(20).with("skip", 2),
    );
    assert_eq!(
        result.values("name"),
        vec![Value::from("Alice"), Value::from("Charlie")]
    );

    let result = ctx.query_with(
        "SELECT ? + ? AS v",
        &Params::positional([Value::Int(2), Value::Int(3)]),
    );
    assert_eq!(result.scalar(), Some(&Value::Int(5)));
}

#[test]
fn test_date_functions() {
    let mut ctx = setup_test();

    assert_eq!(
        ctx.query_scalar("SELECT DATE_ADD('2024-01-31', INTERVAL 1 DAY) AS v"),
        Value::from("2024-02-01")
    );
    assert_eq!(
        ctx.query_scalar("SELECT '2024-01-01 10:00:00' - INTERVAL 2 HOUR AS v"),
        Value::from("2024-01-01 08:00:00")
    );
    assert_eq!(
        ctx.query_scalar("SELECT DATEDIFF('2024-03-01', '2024-02-01') AS v"),
        Value::Int(29)
    );
    assert_eq!(ctx.query_scalar("SELECT YEAR('2024-05-06') AS v"), Value::Int(2024));
    assert_eq!(
        ctx.query_scalar("SELECT DATE_FORMAT('2024-05-06 07:08:09', '%Y/%m/%d') AS v"),
        Value::from("2024/05/06")
    );
}

#[test]
fn test_now_is_stable_within_statement() {
    let mut ctx = setup_test();

    assert_eq!(ctx.query_scalar("SELECT NOW() = NOW() AS v"), Value::Int(1));
}
