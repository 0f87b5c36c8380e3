//! # Hydrator Configuration
//!
//! Process-wide defaults for hydrate calls. Values come from, in increasing
//! priority: built-in defaults, an optional TOML/YAML/JSON file, and
//! `HYDRATOR_*` environment variables.
//!
//! ```rust,no_run
//! use row_hydrator::config::HydratorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HydratorConfig::load("config/hydrator")?;
//! config.init_logging();
//! assert!(config.concurrency_limit > 0);
//! # Ok(())
//! # }
//! ```

use crate::constants::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_DEPTH, ENV_PREFIX};
use crate::error::{HydrationError, Result};
use crate::logging::init_structured_logging;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HydratorConfig {
    /// Maximum records under construction at once per hydrate call
    pub concurrency_limit: usize,
    /// Maximum nesting depth of hydrate calls made from Loaders
    pub max_depth: usize,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Default for HydratorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
            log_json: false,
        }
    }
}

impl HydratorConfig {
    /// Small limits so tests exercise queuing behaviour quickly
    pub fn for_test() -> Self {
        Self {
            concurrency_limit: 2,
            max_depth: 8,
            log_json: false,
        }
    }

    /// Load from `path` (extension optional, file optional) with environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::finish(settings)
    }

    /// Load from `HYDRATOR_*` environment variables only
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self> {
        let config: HydratorConfig = settings.try_deserialize()?;
        config.validate()?;
        debug!(
            concurrency_limit = config.concurrency_limit,
            max_depth = config.max_depth,
            "Hydrator configuration loaded"
        );
        Ok(config)
    }

    /// Install the tracing subscriber in the configured format
    pub fn init_logging(&self) {
        init_structured_logging(self.log_json);
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(HydrationError::Configuration(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(HydrationError::Configuration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
