//! Tests for aggregate functions, GROUP BY and HAVING

mod common;

use common::{setup_test, setup_with_tables, TableBuilder};
use shadow_sql::Value;

fn setup_items() -> common::TestContext {
    let mut ctx = setup_test();
    TableBuilder::new(&mut ctx, "Item")
        .create_simple("id INT, quantity INT, age INT, category VARCHAR(10)")
        .insert_values(
            "(1, NULL, 11, 'a'), \
             (2, 0, 90, 'b'), \
             (3, 9, NULL, 'a'), \
             (4, 3, 3, 'c'), \
             (5, 25, NULL, 'b'), \
             (6, 15, 11, 'a')",
        );
    ctx
}

#[test]
fn test_count() {
    let mut ctx = setup_items();

    ctx.assert_query_value("SELECT COUNT(*) FROM Item", "COUNT(*)", Value::Int(6));
    ctx.assert_query_value("SELECT COUNT(age) AS n FROM Item", "n", Value::Int(4));
    ctx.assert_query_value("SELECT COUNT(DISTINCT age) AS n FROM Item", "n", Value::Int(3));
    ctx.assert_query_value("SELECT COUNT(*) AS n FROM Item WHERE id > 100", "n", Value::Int(0));
}

#[test]
fn test_sum_avg_min_max() {
    let mut ctx = setup_items();

    assert_eq!(ctx.query_scalar("SELECT SUM(quantity) FROM Item"), Value::Int(52));
    assert_eq!(ctx.query_scalar("SELECT AVG(age) FROM Item"), Value::Float(28.75));
    assert_eq!(ctx.query_scalar("SELECT MIN(quantity) FROM Item"), Value::Int(0));
    assert_eq!(ctx.query_scalar("SELECT MAX(category) FROM Item"), Value::from("c"));
    assert_eq!(ctx.query_scalar("SELECT SUM(quantity) FROM Item WHERE id > 100"), Value::Null);
}

#[test]
fn test_aggregate_expressions() {
    let mut ctx = setup_items();

    assert_eq!(
        ctx.query_scalar("SELECT SUM(quantity) + COUNT(*) AS v FROM Item"),
        Value::Int(58)
    );
    assert_eq!(
        ctx.query_scalar("SELECT SUM(quantity * 2) AS v FROM Item"),
        Value::Int(104)
    );
}

#[test]
fn test_group_by() {
    let mut ctx = setup_items();

    let result = ctx.query_result(
        "SELECT category, COUNT(*) AS n FROM Item GROUP BY category ORDER BY category",
    );
    assert_eq!(
        result.values("category"),
        vec![Value::from("a"), Value::from("b"), Value::from("c")]
    );
    assert_eq!(result.values("n"), vec![Value::Int(3), Value::Int(2), Value::Int(1)]);

    // Groups come out in order of first appearance
    let categories = ctx.query_column("SELECT category FROM Item GROUP BY category", "category");
    assert_eq!(
        categories,
        vec![Value::from("a"), Value::from("b"), Value::from("c")]
    );

    // By position
    assert_rows!(ctx, "SELECT category, COUNT(*) FROM Item GROUP BY 1", 3);
}

#[test]
fn test_group_by_alias_and_expression() {
    let mut ctx = setup_items();

    assert_rows!(
        ctx,
        "SELECT UPPER(category) AS c, SUM(quantity) FROM Item GROUP BY c",
        3
    );
    assert_rows!(ctx, "SELECT id % 2 AS parity, COUNT(*) FROM Item GROUP BY id % 2", 2);
}

#[test]
fn test_having() {
    let mut ctx = setup_with_tables();

    let users = ctx.query_column(
        "SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id HAVING total > 150",
        "user_id",
    );
    assert_eq!(users, vec![Value::Int(1)]);

    let users = ctx.query_column(
        "SELECT user_id FROM orders GROUP BY user_id HAVING COUNT(*) = 1",
        "user_id",
    );
    assert_eq!(users, vec![Value::Int(2)]);
}

#[test]
fn test_group_concat() {
    let mut ctx = setup_items();

    assert_eq!(
        ctx.query_scalar("SELECT GROUP_CONCAT(id) FROM Item WHERE category = 'a'"),
        Value::from("1,3,6")
    );
}

#[test]
fn test_group_by_position_out_of_range() {
    let mut ctx = setup_items();

    assert_error!(ctx, "SELECT category FROM Item GROUP BY 5", "group statement");
}

#[test]
fn test_implicit_aggregate_over_empty_table() {
    let mut ctx = setup_test();
    TableBuilder::new(&mut ctx, "e").create_simple("id INT, x INT");

    let result = ctx.query_result("SELECT id, COUNT(*) AS c FROM e");
    assert_eq!(result.len(), 1);
    assert_eq!(result.values("id"), vec![Value::Null]);
    assert_eq!(result.values("c"), vec![Value::Int(0)]);

    assert_eq!(ctx.query_scalar("SELECT MAX(x) + id AS v FROM e"), Value::Null);
    assert_error!(ctx, "SELECT missing, COUNT(*) FROM e", "Column not found");
}

#[test]
fn test_having_filters_groups_before_select_list() {
    let mut ctx = setup_test();
    TableBuilder::new(&mut ctx, "g")
        .create_simple("grp VARCHAR(5)")
        .insert_values("('x'), ('y'), ('y'), ('z'), ('z')");

    ctx.exec("SET @n = 0");
    let result = ctx.query_result(
        "SELECT grp, @n := @n + 1 AS rn FROM g GROUP BY grp HAVING COUNT(*) > 1",
    );
    assert_eq!(result.values("grp"), vec![Value::from("y"), Value::from("z")]);
    assert_eq!(result.values("rn"), vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(ctx.query_scalar("SELECT @n AS v"), Value::Int(2));

    // Select aliases without side effects stay visible to HAVING
    let groups = ctx.query_column(
        "SELECT grp, COUNT(*) AS n FROM g GROUP BY grp HAVING n = 1",
        "grp",
    );
    assert_eq!(groups, vec![Value::from("x")]);
}
