//! Caching parser for SQL statements
//!
//! Test suites run the same statement text over and over, so each session
//! keeps an LRU cache of parsed statements keyed by the exact SQL text.

use super::{Parser, Statement};
use crate::config::DEFAULT_PARSE_CACHE_CAPACITY;
use crate::error::Result;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// A caching wrapper around the SQL parser
pub struct CachingParser {
    cache: LruCache<String, Arc<Statement>>,
    hits: u64,
    misses: u64,
}

impl CachingParser {
    /// Create a new caching parser with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PARSE_CACHE_CAPACITY)
    }

    /// Create a new caching parser with specified capacity. A capacity of
    /// zero still keeps one statement.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Parse SQL with caching. Errors are not cached.
    pub fn parse(&mut self, sql: &str) -> Result<Arc<Statement>> {
        if let Some(statement) = self.cache.get(sql) {
            self.hits += 1;
            debug!(sql, "parse cache hit");
            return Ok(Arc::clone(statement));
        }

        self.misses += 1;
        debug!(sql, "parse cache miss");
        let statement = Arc::new(Parser::parse(sql)?);
        self.cache.put(sql.to_string(), Arc::clone(&statement));
        Ok(statement)
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for CachingParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_sql_hits_the_cache() {
        let mut parser = CachingParser::with_capacity(4);
        let first = parser.parse("SELECT 1").unwrap();
        let second = parser.parse("SELECT 1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.stats(), (1, 1));
    }

    #[test]
    fn test_eviction_and_errors() {
        let mut parser = CachingParser::with_capacity(1);
        parser.parse("SELECT 1").unwrap();
        parser.parse("SELECT 2").unwrap();
        assert_eq!(parser.len(), 1);
        assert!(parser.parse("SELECT FROM WHERE").is_err());
        assert_eq!(parser.len(), 1);
    }

    #[test]
    fn test_zero_capacity_still_caches() {
        let mut parser = CachingParser::with_capacity(0);
        parser.parse("SELECT 1").unwrap();
        assert_eq!(parser.len(), 1);
    }
}
