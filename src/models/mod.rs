//! # Models
//!
//! The Loader contract every hydratable type implements, plus the raw row types
//! it is fed from.
//!
//! A model is allocated from its [`RawRecord`] by [`Model::from_record`], which
//! copies every field of the record onto the new instance (serde does the
//! copying, so unknown fields are ignored and derived fields fall back to their
//! `#[serde(default)]`). [`Model::load`] then mutates that same instance in
//! place, possibly suspending to fetch related data.
//!
//! ```rust
//! use async_trait::async_trait;
//! use row_hydrator::{BoxError, HydrationContext, Model, RawRecord};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Account {
//!     id: i64,
//!     #[serde(default)]
//!     display_name: String,
//! }
//!
//! #[async_trait]
//! impl Model for Account {
//!     const MODEL_NAME: &'static str = "Account";
//!
//!     async fn load(
//!         &mut self,
//!         _record: &RawRecord,
//!         _ctx: &HydrationContext,
//!     ) -> Result<(), BoxError> {
//!         self.display_name = format!("account-{}", self.id);
//!         Ok(())
//!     }
//! }
//! ```

pub mod dynamic;
pub mod record;

pub use dynamic::DynamicModel;
pub use record::{RawRecord, Row};

use self::record::canonical_identity;
use crate::error::{BoxError, HydrationError, Result};
use crate::hydration::HydrationContext;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait Model: DeserializeOwned + Send + Sync + Sized + 'static {
    /// Name used in errors and log fields
    const MODEL_NAME: &'static str;

    /// Allocate a new instance carrying every field of `record`
    fn from_record(record: &RawRecord) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(record.clone())).map_err(|source| {
            HydrationError::Construct {
                model: Self::MODEL_NAME,
                source,
            }
        })
    }

    /// Identity of `record` within a call tree. A record whose identity is
    /// already being loaded by an enclosing Loader on the same path is not
    /// loaded again; equal records on separate paths are each loaded.
    ///
    /// Defaults to the record's canonical JSON; override with a primary key
    /// when rows carry one.
    fn identity(record: &RawRecord) -> String {
        canonical_identity(record)
    }

    /// Add derived or fetched fields to `self`. Related models are hydrated
    /// through `ctx`, which marks those calls as nested.
    async fn load(
        &mut self,
        _record: &RawRecord,
        _ctx: &HydrationContext,
    ) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}
