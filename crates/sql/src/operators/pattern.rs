//! LIKE and REGEXP
//!
//! Compiled patterns are kept in a small process-wide LRU so a predicate
//! evaluated once per row compiles its pattern once.

use super::helpers::{boolean, like_to_regex, text_operand};
use super::traits::BinaryOperation;
use crate::error::{Error, Result};
use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use shadow_value::Value;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

const PATTERN_CACHE_CAPACITY: usize = 256;

static PATTERNS: LazyLock<Mutex<LruCache<String, Regex>>> = LazyLock::new(|| {
    let capacity = NonZeroUsize::new(PATTERN_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
    Mutex::new(LruCache::new(capacity))
});

fn compiled(pattern: String) -> Result<Regex> {
    let mut cache = PATTERNS.lock();
    if let Some(regex) = cache.get(&pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(&pattern)
        .map_err(|e| Error::InvalidValue(format!("Invalid pattern '{}': {}", pattern, e)))?;
    cache.put(pattern, regex.clone());
    Ok(regex)
}

pub struct LikeOperator;
pub struct RegexpOperator;

impl BinaryOperation for LikeOperator {
    fn symbol(&self) -> &'static str {
        "LIKE"
    }

    /// Whole-string match, case-insensitive
    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        let text = text_operand(left)?;
        let regex = compiled(like_to_regex(&text_operand(right)?))?;
        Ok(boolean(regex.is_match(&text)))
    }
}

impl BinaryOperation for RegexpOperator {
    fn symbol(&self) -> &'static str {
        "REGEXP"
    }

    /// Unanchored search, case-insensitive
    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        let text = text_operand(left)?;
        let regex = compiled(format!("(?i){}", text_operand(right)?))?;
        Ok(boolean(regex.is_match(&text)))
    }
}
