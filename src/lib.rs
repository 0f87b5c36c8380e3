#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Row Hydrator
//!
//! Promotes row-shaped data (query results and the like) into typed models.
//!
//! ## Overview
//!
//! Input arrives as a single row, a sequence of rows, or a numerically-keyed
//! collection of rows, optionally behind a future. Each raw row is copied onto
//! a fresh model instance and handed to that model's Loader, which may suspend
//! to fetch related data, including hydrating other models. Output mirrors the
//! input's shape.
//!
//! ## Key Features
//!
//! - **Bounded fan-out**: at most `concurrency_limit` rows under construction
//!   per hydrate call, with input order preserved
//! - **Fail-fast**: the first Loader failure is returned as is
//! - **Pass-through**: already-hydrated instances are never loaded twice
//! - **Call-scoped guard**: the originating call is the only one told it is
//!   top-level, and a record that re-enters its own Loader further down the
//!   same path is not loaded again, so mutually referencing models terminate
//!
//! ## Module Organization
//!
//! - [`models`] - the Loader contract and raw row types
//! - [`hydration`] - the pipeline
//! - [`config`] - configuration loading
//! - [`error`] - structured error handling
//! - [`logging`] - tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use row_hydrator::{
//!     BoxError, HydrateOptions, HydrationContext, Hydrator, Model, RawRecord, RowInput,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Integer {
//!     integer: i64,
//!     #[serde(default)]
//!     doubled: i64,
//! }
//!
//! #[async_trait]
//! impl Model for Integer {
//!     const MODEL_NAME: &'static str = "Integer";
//!
//!     async fn load(
//!         &mut self,
//!         _record: &RawRecord,
//!         _ctx: &HydrationContext,
//!     ) -> Result<(), BoxError> {
//!         self.doubled = self.integer * 2;
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let rows = RowInput::classify(json!([{"integer": 1}, {"integer": 2}])).unwrap();
//! let models = Hydrator::<Integer>::new()
//!     .hydrate(rows, HydrateOptions::default())
//!     .await
//!     .unwrap()
//!     .unwrap()
//!     .into_vec();
//! assert_eq!(models[1].doubled, 4);
//! # });
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod models;

pub use config::HydratorConfig;
pub use constants::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_DEPTH};
pub use error::{BoxError, HydrationError, Result};
pub use hydration::{
    ConstructionChain, HydrateOptions, Hydrated, HydrationContext, HydrationStats, Hydrator,
    ReentrancyGuard, RowInput, RowKey, Shape,
};
pub use models::{DynamicModel, Model, RawRecord, Row};
