//! Engine configuration

/// Default capacity for the parse cache
pub const DEFAULT_PARSE_CACHE_CAPACITY: usize = 1000;

/// Snapshot name used by BEGIN/COMMIT/ROLLBACK
pub const DEFAULT_SNAPSHOT_NAME: &str = "transaction";

/// Policy switches threaded into coercion and table resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Raise on out-of-range, over-long and NULL-into-NOT-NULL values
    /// instead of clamping, truncating or substituting the zero value
    pub strict_mode: bool,
    /// Raise on unknown tables and columns instead of reading them as
    /// empty / NULL
    pub strict_schema_mode: bool,
    /// Number of parsed statements kept per session
    pub parse_cache_capacity: usize,
    /// Name of the store snapshot taken by BEGIN
    pub snapshot_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            strict_schema_mode: false,
            parse_cache_capacity: DEFAULT_PARSE_CACHE_CAPACITY,
            snapshot_name: DEFAULT_SNAPSHOT_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    /// Strict value handling and strict schema resolution
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            strict_schema_mode: true,
            ..Self::default()
        }
    }

    /// Create a config for testing: strict schema, lenient values, tiny cache
    pub fn for_testing() -> Self {
        Self {
            strict_schema_mode: true,
            parse_cache_capacity: 64,
            ..Self::default()
        }
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_strict_schema_mode(mut self, strict: bool) -> Self {
        self.strict_schema_mode = strict;
        self
    }

    pub fn with_parse_cache_capacity(mut self, capacity: usize) -> Self {
        self.parse_cache_capacity = capacity;
        self
    }

    pub fn with_snapshot_name(mut self, name: impl Into<String>) -> Self {
        self.snapshot_name = name.into();
        self
    }
}
