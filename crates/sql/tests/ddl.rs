//! Tests for CREATE, DROP, TRUNCATE, ALTER and SHOW

mod common;

use common::{setup_test, setup_with_tables, TableBuilder};
use shadow_sql::Value;

#[test]
fn test_create_table_twice() {
    let mut ctx = setup_test();

    ctx.exec("CREATE TABLE t (id INT)");
    assert_error!(ctx, "CREATE TABLE t (id INT)", "Table already exists");
    ctx.exec("CREATE TABLE IF NOT EXISTS t (id INT, other INT)");

    // The original definition is kept
    assert_error!(ctx, "SELECT other FROM t", "Column not found");
}

#[test]
fn test_create_with_options_and_keys() {
    let mut ctx = setup_test();

    ctx.exec(
        "CREATE TABLE `users` (\
           `id` int(11) unsigned NOT NULL AUTO_INCREMENT,\
           `email` varchar(255) COLLATE utf8mb4_unicode_ci DEFAULT NULL,\
           `created` datetime NOT NULL DEFAULT CURRENT_TIMESTAMP,\
           PRIMARY KEY (`id`),\
           UNIQUE KEY `email_idx` (`email`),\
           KEY `created_idx` (`created`)\
         ) ENGINE=InnoDB AUTO_INCREMENT=10 DEFAULT CHARSET=utf8mb4",
    );
    ctx.exec("INSERT INTO users (email) VALUES ('a@x')");
    assert_eq!(ctx.session.last_insert_id(), Some(10));

    let created = ctx.query_scalar("SELECT created FROM users");
    assert!(matches!(created, Value::Str(ref s) if s.len() == 19));
}

#[test]
fn test_invalid_definitions() {
    let mut ctx = setup_test();

    assert_error!(ctx, "CREATE TABLE t (id INT, id INT)");
    assert_error!(ctx, "CREATE TABLE t (id INT, PRIMARY KEY (missing))");
}

#[test]
fn test_drop_table() {
    let mut ctx = setup_with_tables();

    ctx.exec("DROP TABLE orders");
    assert_error!(ctx, "SELECT * FROM orders", "Table not found");
    assert_error!(ctx, "DROP TABLE orders", "Table not found");
    ctx.exec("DROP TABLE IF EXISTS orders");

    // Nothing is dropped when one name is missing
    assert_error!(ctx, "DROP TABLE users, orders");
    assert_rows!(ctx, "SELECT * FROM users", 3);
}

#[test]
fn test_truncate_resets_auto_increment() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "seq").create_simple("id INT PRIMARY KEY AUTO_INCREMENT, v INT");
    ctx.exec("INSERT INTO seq (v) VALUES (1), (2), (3)");
    ctx.exec("TRUNCATE TABLE seq");
    assert_rows!(ctx, "SELECT * FROM seq", 0);

    ctx.exec("INSERT INTO seq (v) VALUES (4)");
    assert_eq!(ctx.session.last_insert_id(), Some(1));
    assert_error!(ctx, "TRUNCATE nowhere", "Table not found");
}

#[test]
fn test_alter_auto_increment() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "seq").create_simple("id INT PRIMARY KEY AUTO_INCREMENT, v INT");
    ctx.exec("INSERT INTO seq (v) VALUES (1)");
    ctx.exec("ALTER TABLE seq AUTO_INCREMENT = 100");
    ctx.exec("INSERT INTO seq (v) VALUES (2)");
    assert_eq!(ctx.session.last_insert_id(), Some(100));
}

#[test]
fn test_show_tables() {
    let mut ctx = setup_with_tables();

    let result = ctx.query_result("SHOW TABLES");
    assert_eq!(result.column_names(), vec!["Tables_in_default"]);
    assert_eq!(
        result.values("Tables_in_default"),
        vec![Value::from("orders"), Value::from("users")]
    );

    assert_rows!(ctx, "SHOW TABLES LIKE 'us%'", 1);
}

#[test]
fn test_show_index() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "t").create_simple(
        "id INT, a INT, b INT, PRIMARY KEY (id), UNIQUE KEY ab (a, b)",
    );
    let result = ctx.query_result("SHOW INDEX FROM t");
    assert_eq!(
        result.values("Key_name"),
        vec![Value::from("PRIMARY"), Value::from("ab"), Value::from("ab")]
    );
    assert_eq!(
        result.values("Seq_in_index"),
        vec![Value::Int(1), Value::Int(1), Value::Int(2)]
    );
    assert_eq!(
        result.values("Non_unique"),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
}

#[test]
fn test_use_database() {
    let mut ctx = setup_test();

    ctx.exec("USE app");
    ctx.exec("CREATE TABLE t (id INT)");
    ctx.exec("USE other");
    assert_error!(ctx, "SELECT * FROM t", "Table not found");
    assert_rows!(ctx, "SELECT * FROM app.t", 0);
    assert_rows!(ctx, "SHOW TABLES", 0);
    ctx.exec("CREATE TABLE app.u (id INT)");
    assert_eq!(ctx.session.database(), "other");
    ctx.exec("USE app");
    assert_rows!(ctx, "SHOW TABLES", 2);
}
