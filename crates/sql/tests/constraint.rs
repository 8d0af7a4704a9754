//! Tests for keys, NOT NULL and value coercion in strict and lenient modes

mod common;

use common::{setup_lenient, setup_test, TableBuilder, TestContext};
use shadow_sql::{EngineConfig, Value};

fn setup_strict() -> TestContext {
    TestContext::with_config(EngineConfig::strict())
}

fn create_accounts(ctx: &mut TestContext) {
    TableBuilder::new(ctx, "accounts").create_simple(
        "id INT PRIMARY KEY, email VARCHAR(10), code CHAR(3), \
         tiny TINYINT, price DECIMAL(5,2), name VARCHAR(20) NOT NULL, \
         UNIQUE KEY email_idx (email)",
    );
}

#[test]
fn test_primary_key_violation() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);

    ctx.exec("INSERT INTO accounts (id, name) VALUES (1, 'a')");
    assert_error!(
        ctx,
        "INSERT INTO accounts (id, name) VALUES (1, 'b')",
        "Duplicate entry '1' for key 'PRIMARY'"
    );
    // The failed statement left nothing behind
    assert_rows!(ctx, "SELECT * FROM accounts", 1);
}

#[test]
fn test_unique_key_violation() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);

    ctx.exec("INSERT INTO accounts (id, email, name) VALUES (1, 'a@x', 'a')");
    assert_error!(
        ctx,
        "INSERT INTO accounts (id, email, name) VALUES (2, 'a@x', 'b')",
        "for key 'email_idx'"
    );

    // NULLs never collide on a unique key
    ctx.exec("INSERT INTO accounts (id, email, name) VALUES (3, NULL, 'c'), (4, NULL, 'd')");
    assert_rows!(ctx, "SELECT * FROM accounts WHERE email IS NULL", 2);
}

#[test]
fn test_duplicate_within_one_statement() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);

    assert_error!(
        ctx,
        "INSERT INTO accounts (id, name) VALUES (1, 'a'), (1, 'b')",
        "Duplicate entry"
    );
    assert_rows!(ctx, "SELECT * FROM accounts", 0);
}

#[test]
fn test_update_into_duplicate() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);

    ctx.exec("INSERT INTO accounts (id, email, name) VALUES (1, 'a@x', 'a'), (2, 'b@x', 'b')");
    assert_error!(ctx, "UPDATE accounts SET email = 'a@x' WHERE id = 2", "Duplicate entry");
    assert_eq!(
        ctx.query_scalar("SELECT email FROM accounts WHERE id = 2"),
        Value::from("b@x")
    );
}

#[test]
fn test_lenient_mode_adjusts_values() {
    let mut ctx = setup_lenient();
    create_accounts(&mut ctx);

    ctx.exec(
        "INSERT INTO accounts (id, email, code, tiny, price) \
         VALUES (1, 'much-too-long@example.com', 'abcdef', 300, '12.345')",
    );
    let row = &ctx.query("SELECT * FROM accounts")[0];
    assert_eq!(row["email"], Value::from("much-too-l"));
    assert_eq!(row["code"], Value::from("abc"));
    assert_eq!(row["tiny"], Value::Int(127));
    assert_eq!(row["price"], Value::from("12.35"));
    // NOT NULL column without a default gets the zero value
    assert_eq!(row["name"], Value::from(""));
}

#[test]
fn test_strict_mode_rejects_values() {
    let mut ctx = setup_strict();
    create_accounts(&mut ctx);

    assert_error!(
        ctx,
        "INSERT INTO accounts (id, email, name) VALUES (1, 'much-too-long@example.com', 'a')",
        "Data too long for column 'email'"
    );
    assert_error!(
        ctx,
        "INSERT INTO accounts (id, tiny, name) VALUES (1, 300, 'a')",
        "Out of range value for column 'tiny'"
    );
    assert_error!(
        ctx,
        "INSERT INTO accounts (id) VALUES (1)",
        "Field 'name' doesn't have a default value"
    );
    assert_error!(
        ctx,
        "INSERT INTO accounts (id, name) VALUES (1, NULL)",
        "Column 'name' cannot be null"
    );
    assert_rows!(ctx, "SELECT * FROM accounts", 0);
}

#[test]
fn test_numeric_strings_are_coerced() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);

    ctx.exec("INSERT INTO accounts (id, tiny, price, name) VALUES ('7', ' 12 ', 3, 'x')");
    let row = &ctx.query("SELECT id, tiny, price FROM accounts")[0];
    assert_eq!(row["id"], Value::Int(7));
    assert_eq!(row["tiny"], Value::Int(12));
    assert_eq!(row["price"], Value::from("3.00"));
}

#[test]
fn test_enum_and_datetime_columns() {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "events").create_simple(
        "id INT PRIMARY KEY, size ENUM('small','large'), at DATETIME, day DATE",
    );
    ctx.exec("INSERT INTO events VALUES (1, 'LARGE', '2024-05-06 07:08:09', '2024-05-06 10:00:00')");
    let row = &ctx.query("SELECT * FROM events")[0];
    assert_eq!(row["size"], Value::from("large"));
    assert_eq!(row["at"], Value::from("2024-05-06 07:08:09"));
    assert_eq!(row["day"], Value::from("2024-05-06"));
}

#[test]
fn test_unknown_column_modes() {
    let mut ctx = setup_test();
    create_accounts(&mut ctx);
    assert_error!(ctx, "INSERT INTO accounts (id, name, bogus) VALUES (1, 'a', 2)", "bogus");

    let mut lenient = setup_lenient();
    create_accounts(&mut lenient);
    lenient.exec("INSERT INTO accounts (id, name, bogus) VALUES (1, 'a', 2)");
    assert_rows!(lenient, "SELECT * FROM accounts", 1);
}
