//! Error types for row hydration.
//!

use thiserror::Error;

/// Boxed error accepted from Loaders and upstream row sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum HydrationError {
    /// The pending input handed to the hydrator resolved to an error
    #[error("Upstream input error: {0}")]
    Upstream(#[source] BoxError),
    /// A model's Loader failed
    #[error("Load error in {model}: {source}")]
    Load {
        model: &'static str,
        #[source]
        source: BoxError,
    },
    /// The record could not be copied onto a new model instance
    #[error("Construction error in {model}: {source}")]
    Construct {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid input shape: {0}")]
    InvalidShape(String),
    #[error("Maximum hydration depth {max_depth} exceeded while hydrating {model}")]
    DepthExceeded { model: &'static str, max_depth: usize },
    /// A spawned construction task panicked or was aborted
    #[error("Hydration task failed for {model}: {reason}")]
    TaskFailed { model: &'static str, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HydrationError {
    /// Wrap a Loader failure, passing nested hydration errors through untouched
    /// so the caller sees the error that was originally raised.
    pub fn from_loader(model: &'static str, error: BoxError) -> Self {
        match error.downcast::<HydrationError>() {
            Ok(inner) => *inner,
            Err(source) => HydrationError::Load { model, source },
        }
    }

    /// Wrap a failure of the pending input, with the same pass-through rule as
    /// [`HydrationError::from_loader`].
    pub fn from_upstream(error: BoxError) -> Self {
        match error.downcast::<HydrationError>() {
            Ok(inner) => *inner,
            Err(source) => HydrationError::Upstream(source),
        }
    }
}

impl From<config::ConfigError> for HydrationError {
    fn from(error: config::ConfigError) -> Self {
        HydrationError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HydrationError>;
