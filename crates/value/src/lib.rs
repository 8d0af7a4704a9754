//! Shadow Value - the value type shared by shadow-sql components
//!
//! MySQL hands clients four kinds of scalar: NULL, integers, floating point
//! numbers and strings. Decimals, dates and enum members all travel as
//! strings, so this crate keeps the union small and puts the MySQL-flavoured
//! numeric interpretation of strings next to it.

pub mod numeric;
pub mod types;

pub use numeric::{is_numeric_str, parse_numeric_prefix};
pub use types::Value;
