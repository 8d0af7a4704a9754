//! MySQL column types
//!
//! Columns fall into families: integers, fixed/floating numbers, character
//! and binary strings, temporal values, and ENUM/SET. Each family knows its
//! bounds and its zero value. Bounds are only enforced when a value is
//! coerced into a column; nothing downstream re-validates.

use serde::{Deserialize, Serialize};
use shadow_value::Value;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerSize {
    Tiny,
    Small,
    Medium,
    Int,
    Big,
}

impl IntegerSize {
    /// Inclusive bounds, clipped to what an i64 can hold
    pub fn bounds(self, unsigned: bool) -> (i64, i64) {
        match (self, unsigned) {
            (IntegerSize::Tiny, false) => (-128, 127),
            (IntegerSize::Tiny, true) => (0, 255),
            (IntegerSize::Small, false) => (-32_768, 32_767),
            (IntegerSize::Small, true) => (0, 65_535),
            (IntegerSize::Medium, false) => (-8_388_608, 8_388_607),
            (IntegerSize::Medium, true) => (0, 16_777_215),
            (IntegerSize::Int, false) => (-2_147_483_648, 2_147_483_647),
            (IntegerSize::Int, true) => (0, 4_294_967_295),
            (IntegerSize::Big, false) => (i64::MIN, i64::MAX),
            (IntegerSize::Big, true) => (0, i64::MAX),
        }
    }

    fn sql_name(self) -> &'static str {
        match self {
            IntegerSize::Tiny => "tinyint",
            IntegerSize::Small => "smallint",
            IntegerSize::Medium => "mediumint",
            IntegerSize::Int => "int",
            IntegerSize::Big => "bigint",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Decimal { precision: u32, scale: u32 },
    Float,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Char,
    Varchar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Binary,
    Varbinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Json,
}

impl CharacterKind {
    /// Maximum length when the declaration does not give one
    pub fn default_max_length(self) -> u64 {
        match self {
            CharacterKind::Char | CharacterKind::Binary => 1,
            CharacterKind::Varchar | CharacterKind::Varbinary => 65_535,
            CharacterKind::TinyText | CharacterKind::TinyBlob => 255,
            CharacterKind::Text | CharacterKind::Blob => 65_535,
            CharacterKind::MediumText | CharacterKind::MediumBlob => 16_777_215,
            CharacterKind::LongText | CharacterKind::LongBlob | CharacterKind::Json => {
                4_294_967_295
            }
        }
    }

    /// Whether the declared length is part of the type name
    fn shows_length(self) -> bool {
        matches!(
            self,
            CharacterKind::Char
                | CharacterKind::Varchar
                | CharacterKind::Binary
                | CharacterKind::Varbinary
        )
    }

    fn sql_name(self) -> &'static str {
        match self {
            CharacterKind::Char => "char",
            CharacterKind::Varchar => "varchar",
            CharacterKind::TinyText => "tinytext",
            CharacterKind::Text => "text",
            CharacterKind::MediumText => "mediumtext",
            CharacterKind::LongText => "longtext",
            CharacterKind::Binary => "binary",
            CharacterKind::Varbinary => "varbinary",
            CharacterKind::TinyBlob => "tinyblob",
            CharacterKind::Blob => "blob",
            CharacterKind::MediumBlob => "mediumblob",
            CharacterKind::LongBlob => "longblob",
            CharacterKind::Json => "json",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChronoKind {
    Date,
    DateTime,
    Time,
    Year,
    Timestamp,
}

impl ChronoKind {
    /// The all-zero value MySQL stores for invalid or missing dates
    pub fn zero_value(self) -> &'static str {
        match self {
            ChronoKind::Date => "0000-00-00",
            ChronoKind::DateTime | ChronoKind::Timestamp => "0000-00-00 00:00:00",
            ChronoKind::Time => "00:00:00",
            ChronoKind::Year => "0000",
        }
    }
}

/// Column data type, grouped by family
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ColumnType {
    Integer {
        size: IntegerSize,
        #[serde(default)]
        unsigned: bool,
        #[serde(default)]
        display_width: Option<u32>,
        #[serde(default)]
        auto_increment: bool,
    },
    Number {
        kind: NumberKind,
        #[serde(default)]
        unsigned: bool,
    },
    Character {
        kind: CharacterKind,
        max_length: u64,
        #[serde(default)]
        charset: Option<String>,
        #[serde(default)]
        collation: Option<String>,
    },
    Chronological {
        kind: ChronoKind,
    },
    Enum {
        values: Vec<String>,
    },
    Set {
        values: Vec<String>,
    },
}

impl ColumnType {
    pub fn integer(size: IntegerSize) -> Self {
        ColumnType::Integer {
            size,
            unsigned: false,
            display_width: None,
            auto_increment: false,
        }
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        ColumnType::Number {
            kind: NumberKind::Decimal { precision, scale },
            unsigned: false,
        }
    }

    pub fn double() -> Self {
        ColumnType::Number {
            kind: NumberKind::Double,
            unsigned: false,
        }
    }

    pub fn character(kind: CharacterKind, max_length: Option<u64>) -> Self {
        ColumnType::Character {
            kind,
            max_length: max_length.unwrap_or_else(|| kind.default_max_length()),
            charset: None,
            collation: None,
        }
    }

    pub fn varchar(max_length: u64) -> Self {
        Self::character(CharacterKind::Varchar, Some(max_length))
    }

    pub fn chronological(kind: ChronoKind) -> Self {
        ColumnType::Chronological { kind }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer { .. } | ColumnType::Number { .. })
    }

    pub fn is_auto_increment(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer {
                auto_increment: true,
                ..
            }
        )
    }

    /// Maximum string length, for character columns
    pub fn max_length(&self) -> Option<u64> {
        match self {
            ColumnType::Character { max_length, .. } => Some(*max_length),
            _ => None,
        }
    }

    /// Value used for a NOT NULL column that was given nothing
    pub fn zero_value(&self) -> Value {
        match self {
            ColumnType::Integer { .. } => Value::Int(0),
            ColumnType::Number {
                kind: NumberKind::Decimal { scale, .. },
                ..
            } => Value::Str(format!("{:.*}", *scale as usize, 0.0)),
            ColumnType::Number { .. } => Value::Float(0.0),
            ColumnType::Character { .. } | ColumnType::Set { .. } => Value::Str(String::new()),
            ColumnType::Chronological {
                kind: ChronoKind::Year,
            } => Value::Int(0),
            ColumnType::Chronological { kind } => Value::Str(kind.zero_value().to_string()),
            ColumnType::Enum { values } => {
                Value::Str(values.first().cloned().unwrap_or_default())
            }
        }
    }

    /// Best guess at a column type for a computed value
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Int(_) => Self::integer(IntegerSize::Big),
            Value::Float(_) => Self::double(),
            Value::Str(_) | Value::Null => Self::character(CharacterKind::LongText, None),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer {
                size,
                unsigned,
                display_width,
                ..
            } => {
                write!(f, "{}", size.sql_name())?;
                if let Some(width) = display_width {
                    write!(f, "({})", width)?;
                }
                if *unsigned {
                    write!(f, " unsigned")?;
                }
                Ok(())
            }
            ColumnType::Number { kind, unsigned } => {
                match kind {
                    NumberKind::Decimal { precision, scale } => {
                        write!(f, "decimal({},{})", precision, scale)?
                    }
                    NumberKind::Float => write!(f, "float")?,
                    NumberKind::Double => write!(f, "double")?,
                }
                if *unsigned {
                    write!(f, " unsigned")?;
                }
                Ok(())
            }
            ColumnType::Character {
                kind, max_length, ..
            } => {
                if kind.shows_length() {
                    write!(f, "{}({})", kind.sql_name(), max_length)
                } else {
                    write!(f, "{}", kind.sql_name())
                }
            }
            ColumnType::Chronological { kind } => {
                let name = match kind {
                    ChronoKind::Date => "date",
                    ChronoKind::DateTime => "datetime",
                    ChronoKind::Time => "time",
                    ChronoKind::Year => "year",
                    ChronoKind::Timestamp => "timestamp",
                };
                write!(f, "{}", name)
            }
            ColumnType::Enum { values } | ColumnType::Set { values } => {
                let keyword = if matches!(self, ColumnType::Enum { .. }) {
                    "enum"
                } else {
                    "set"
                };
                let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                write!(f, "{}({})", keyword, quoted.join(","))
            }
        }
    }
}

/// Column DEFAULT clause
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum ColumnDefault {
    Value(Value),
    CurrentTimestamp,
}

/// A table column.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    pub data_type: ColumnType,
    /// Whether the column accepts NULL.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Value used when an INSERT does not name the column.
    #[serde(default)]
    pub default: Option<ColumnDefault>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// A nullable column without a default
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(ColumnDefault::Value(value));
        self
    }

    /// Column describing a computed value in a result set
    pub fn inferred(name: impl Into<String>, value: &Value) -> Self {
        Self::new(name, ColumnType::infer(value))
    }

    pub fn is_auto_increment(&self) -> bool {
        self.data_type.is_auto_increment()
    }
}
