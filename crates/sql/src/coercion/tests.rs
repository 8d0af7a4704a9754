use super::*;
use crate::types::column::{CharacterKind, IntegerSize};

fn int_column() -> Column {
    Column::new("qty", ColumnType::integer(IntegerSize::Int)).not_null()
}

#[test]
fn test_null_into_nullable_column() {
    let column = Column::new("note", ColumnType::varchar(10));
    assert_eq!(coerce_value_to_column(&column, Value::Null, true).unwrap(), Value::Null);
}

#[test]
fn test_null_into_not_null_column() {
    assert_eq!(
        coerce_value_to_column(&int_column(), Value::Null, false).unwrap(),
        Value::Int(0)
    );
    assert!(matches!(
        coerce_value_to_column(&int_column(), Value::Null, true),
        Err(Error::NullConstraintViolation(_))
    ));
}

#[test]
fn test_booleans_and_empty_strings_into_integers() {
    assert_eq!(
        coerce_value_to_column(&int_column(), Value::boolean(true), true).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        coerce_value_to_column(&int_column(), Value::from(""), true).unwrap(),
        Value::Int(0)
    );
    assert!(coerce_value_to_column(&int_column(), Value::from("twelve"), false).is_err());
}

#[test]
fn test_numbers_into_text() {
    let column = Column::new("code", ColumnType::character(CharacterKind::Char, Some(4)));
    assert_eq!(
        coerce_value_to_column(&column, Value::Float(2.5), true).unwrap(),
        Value::from("2.5")
    );
}

#[test]
fn test_cast_targets() {
    assert_eq!(cast_value(&Value::from("12abc"), &CastTarget::Signed), Value::Int(12));
    assert_eq!(cast_value(&Value::from("-3.9"), &CastTarget::Signed), Value::Int(-3));
    assert_eq!(cast_value(&Value::Float(2.5), &CastTarget::Signed), Value::Int(3));
    assert_eq!(
        cast_value(&Value::Int(-1), &CastTarget::Unsigned),
        Value::from("18446744073709551615")
    );
    assert_eq!(cast_value(&Value::Int(42), &CastTarget::Char(None)), Value::from("42"));
    assert_eq!(cast_value(&Value::from("abcdef"), &CastTarget::Char(Some(2))), Value::from("ab"));
    assert_eq!(
        cast_value(&Value::from("3.14159"), &CastTarget::Decimal { precision: 5, scale: 2 }),
        Value::from("3.14")
    );
    assert_eq!(cast_value(&Value::from("2.5"), &CastTarget::Double), Value::Float(2.5));
    assert_eq!(cast_value(&Value::Null, &CastTarget::Signed), Value::Null);
}

#[test]
fn test_cast_to_temporal() {
    assert_eq!(
        cast_value(&Value::from("2024-01-31 12:00:00"), &CastTarget::Date),
        Value::from("2024-01-31")
    );
    assert_eq!(
        cast_value(&Value::from("2024-01-31"), &CastTarget::DateTime),
        Value::from("2024-01-31 00:00:00")
    );
    assert_eq!(cast_value(&Value::from("garbage"), &CastTarget::Date), Value::Null);
}
