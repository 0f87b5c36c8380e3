//! # Hydration
//!
//! The row-to-model pipeline: shape dispatch, bounded fan-out, and the
//! call-scoped guard that keeps mutually referencing models from recursing
//! forever.
//!
//! - [`hydrator`] - public entry points and the fan-out
//! - [`shape`] - tagged input and output shapes
//! - [`context`] - the token threaded through every call and Loader
//! - [`guard`] - top-level detection and the construction chain
//! - [`stats`] - per-tree counters

pub mod context;
pub mod guard;
pub mod hydrator;
pub mod shape;
pub mod stats;

pub use context::{HydrateOptions, HydrationContext};
pub use guard::{ConstructionChain, ReentrancyGuard};
pub use hydrator::Hydrator;
pub use shape::{Hydrated, RowInput, RowKey, Shape};
pub use stats::HydrationStats;
