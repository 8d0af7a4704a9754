//! Tests for SELECT: projection, filtering, ordering, limits and expressions

mod common;

use common::{setup_test, setup_with_tables, TableBuilder};
use shadow_sql::Value;

#[test]
fn test_select_star_and_filter() {
    let mut ctx = setup_with_tables();

    assert_rows!(ctx, "SELECT * FROM users", 3);
    assert_rows!(ctx, "SELECT * FROM users WHERE age > 26", 2);
    assert_rows!(ctx, "SELECT * FROM users WHERE age > 26 AND name LIKE 'c%'", 1);
    assert_rows!(ctx, "SELECT * FROM users WHERE age BETWEEN 25 AND 30", 2);
    assert_rows!(ctx, "SELECT * FROM users WHERE id IN (1, 3)", 2);
    assert_rows!(ctx, "SELECT * FROM users WHERE id NOT IN (1, 3)", 1);

    let result = ctx.query_result("SELECT * FROM users WHERE id = 2");
    assert_eq!(result.column_names(), vec!["id", "name", "age"]);
}

#[test]
fn test_order_by_and_limit() {
    let mut ctx = setup_with_tables();

    let names = ctx.query_column("SELECT name FROM users ORDER BY age DESC LIMIT 2", "name");
    assert_eq!(names, vec![Value::from("Charlie"), Value::from("Bob")]);

    let names = ctx.query_column("SELECT name FROM users ORDER BY age LIMIT 1, 2", "name");
    assert_eq!(names, vec![Value::from("Bob"), Value::from("Charlie")]);

    let names = ctx.query_column("SELECT name FROM users ORDER BY age LIMIT 1 OFFSET 2", "name");
    assert_eq!(names, vec![Value::from("Charlie")]);

    // Ordinal position in the select list
    let ages = ctx.query_column("SELECT age, name FROM users ORDER BY 1 DESC", "age");
    assert_eq!(ages, vec![Value::Int(35), Value::Int(30), Value::Int(25)]);
}

#[test]
fn test_order_by_alias() {
    let mut ctx = setup_with_tables();

    let doubled = ctx.query_column("SELECT age * 2 AS twice FROM users ORDER BY twice DESC", "twice");
    assert_eq!(doubled, vec![Value::Int(70), Value::Int(60), Value::Int(50)]);
}

#[test]
fn test_distinct() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "tags")
        .create_simple("id INT PRIMARY KEY, tag VARCHAR(10)")
        .insert_values("(1, 'a'), (2, 'b'), (3, 'a'), (4, NULL), (5, NULL)");

    assert_rows!(ctx, "SELECT DISTINCT tag FROM tags", 3);

    // LIMIT cuts the ordered rows before duplicates collapse
    let tags = ctx.query_column("SELECT DISTINCT tag FROM tags ORDER BY id LIMIT 3", "tag");
    assert_eq!(tags, vec![Value::from("a"), Value::from("b")]);
}

#[test]
fn test_distinct_after_limit() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "t")
        .create_simple("id INT PRIMARY KEY, x INT")
        .insert_values("(1, 1), (2, 1), (3, 2)");

    let xs = ctx.query_column("SELECT DISTINCT x FROM t ORDER BY id LIMIT 2", "x");
    assert_eq!(xs, vec![Value::Int(1)]);

    let xs = ctx.query_column("SELECT DISTINCT x FROM t ORDER BY id LIMIT 1, 2", "x");
    assert_eq!(xs, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_operator_precedence() {
    let mut ctx = setup_test();

    assert_eq!(ctx.query_scalar("SELECT 2 + 3 * 4 - 1 AS v"), Value::Int(13));
    assert_eq!(ctx.query_scalar("SELECT (2 + 4) * 3 AS v"), Value::Int(18));
    assert_eq!(ctx.query_scalar("SELECT 10 / 4 AS v"), Value::Float(2.5));
    assert_eq!(ctx.query_scalar("SELECT 7 % 3 AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT -2 * 3 AS v"), Value::Int(-6));
    assert_eq!(ctx.query_scalar("SELECT 1 + 2 = 3 AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT 1 OR 0 AND 0 AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT NOT 1 = 2 AS v"), Value::Int(1));
}

#[test]
fn test_null_semantics() {
    let mut ctx = setup_test();

    assert_eq!(ctx.query_scalar("SELECT NULL + 1 AS v"), Value::Null);
    assert_eq!(ctx.query_scalar("SELECT 1 / 0 AS v"), Value::Null);
    assert_eq!(ctx.query_scalar("SELECT NULL = NULL AS v"), Value::Null);
    assert_eq!(ctx.query_scalar("SELECT NULL IS NULL AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT 1 IN (2, NULL) AS v"), Value::Null);
    assert_eq!(ctx.query_scalar("SELECT 1 IN (1, NULL) AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT NULL OR 1 AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT NULL AND 0 AS v"), Value::Int(0));
}

#[test]
fn test_case_and_functions() {
    let mut ctx = setup_with_tables();

    let labels = ctx.query_column(
        "SELECT CASE WHEN age < 30 THEN 'young' ELSE 'old' END AS label FROM users ORDER BY id",
        "label",
    );
    assert_eq!(
        labels,
        vec![Value::from("young"), Value::from("old"), Value::from("old")]
    );

    assert_eq!(
        ctx.query_scalar("SELECT CONCAT(UPPER('ab'), LOWER('CD'), 1) AS s"),
        Value::from("ABcd1")
    );
    assert_eq!(ctx.query_scalar("SELECT COALESCE(NULL, NULL, 3) AS v"), Value::Int(3));
    assert_eq!(ctx.query_scalar("SELECT IFNULL(NULL, 'x') AS v"), Value::from("x"));
    assert_eq!(ctx.query_scalar("SELECT IF(1 > 2, 'a', 'b') AS v"), Value::from("b"));
}

#[test]
fn test_column_without_table_is_rejected() {
    let mut ctx = setup_with_tables();

    assert_error!(ctx, "SELECT missing FROM users", "Column not found");
    assert_error!(ctx, "SELECT * FROM nowhere", "Table not found");
    assert_error!(ctx, "SELECT *", "No tables used");
}

#[test]
fn test_parse_errors() {
    let mut ctx = setup_test();

    assert_error!(ctx, "SELEC 1", "parse error");
    assert_error!(ctx, "SELECT 1 +", "parse error");
}

#[test]
fn test_extended_operators() {
    let mut ctx = setup_test();

    assert_eq!(ctx.query_scalar("SELECT NULL <=> NULL AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT 1 <=> NULL AS v"), Value::Int(0));
    assert_eq!(ctx.query_scalar("SELECT 1 XOR 1 AS v"), Value::Int(0));
    assert_eq!(ctx.query_scalar("SELECT 6 & 3 AS v"), Value::Int(2));
    assert_eq!(ctx.query_scalar("SELECT 6 | 3 AS v"), Value::Int(7));
    assert_eq!(ctx.query_scalar("SELECT 1 << 4 AS v"), Value::Int(16));
    assert_eq!(ctx.query_scalar("SELECT 7 DIV 2 AS v"), Value::Int(3));
    assert_eq!(ctx.query_scalar("SELECT 'ABC' LIKE 'a_c' AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT '50%' LIKE '50\\%' AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT '500' LIKE '50\\%' AS v"), Value::Int(0));
    assert_eq!(ctx.query_scalar("SELECT 'abc123' REGEXP '^[a-z]+[0-9]+$' AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT 0 IS FALSE AS v"), Value::Int(1));
    assert_eq!(ctx.query_scalar("SELECT NULL IS NOT TRUE AS v"), Value::Int(1));
}

#[test]
fn test_cast() {
    let mut ctx = setup_test();

    assert_eq!(ctx.query_scalar("SELECT CAST('42abc' AS SIGNED) AS v"), Value::Int(42));
    assert_eq!(ctx.query_scalar("SELECT CAST(3.14159 AS DECIMAL(5,2)) AS v"), Value::from("3.14"));
    assert_eq!(ctx.query_scalar("SELECT CAST(12 AS CHAR) AS v"), Value::from("12"));
    assert_eq!(
        ctx.query_scalar("SELECT CAST('2024-05-06 07:08:09' AS DATE) AS v"),
        Value::from("2024-05-06")
    );
    assert_eq!(ctx.query_scalar("SELECT CAST(NULL AS SIGNED) AS v"), Value::Null);
}
