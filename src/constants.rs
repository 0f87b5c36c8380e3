//! # Hydration Constants
//!
//! Default limits and structured-log event names shared across the hydrator.

/// Maximum number of records under construction at once for one hydrate call
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// Maximum nesting of hydrate calls made from Loaders within one call tree
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Prefix for environment variable overrides (`HYDRATOR_CONCURRENCY_LIMIT`, ...)
pub const ENV_PREFIX: &str = "HYDRATOR";

/// Structured log event names
pub mod events {
    pub const HYDRATE_STARTED: &str = "hydrate.started";
    pub const HYDRATE_COMPLETED: &str = "hydrate.completed";
    pub const HYDRATE_FAILED: &str = "hydrate.failed";
    pub const HYDRATE_EMPTY: &str = "hydrate.empty";
    pub const RECORD_SHORT_CIRCUITED: &str = "record.short_circuited";
}
