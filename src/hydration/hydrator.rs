//! # Hydrator
//!
//! Turns raw rows into models of type `M`. A hydrate call resolves the input
//! (awaiting it first when it is pending), dispatches on its shape, and runs
//! each row through [`construct`]: already-hydrated instances pass through,
//! raw records are allocated and handed to the model's Loader.
//!
//! Sequences and keyed collections fan out over spawned tasks gated by a
//! semaphore, so at most `concurrency_limit` rows are under construction at
//! once. Results land in indexed slots, which keeps input order regardless of
//! completion order. The first failure is returned immediately; the semaphore
//! is closed so no further rows start, and rows already running finish in the
//! background with their results discarded.
//!
//! ```rust
//! use row_hydrator::{DynamicModel, HydrateOptions, Hydrator, RowInput};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let hydrator = Hydrator::<DynamicModel>::new();
//! let rows = RowInput::classify(json!([{"id": 1}, {"id": 2}])).unwrap();
//! let models = hydrator
//!     .hydrate(rows, HydrateOptions::default())
//!     .await
//!     .unwrap()
//!     .unwrap()
//!     .into_vec();
//! assert_eq!(models[1].get("id"), Some(&json!(2)));
//! # });
//! ```

use super::context::{HydrateOptions, HydrationContext};
use super::shape::{Hydrated, RowInput};
use super::stats::HydrationStats;
use crate::config::HydratorConfig;
use crate::constants::events;
use crate::error::{BoxError, HydrationError, Result};
use crate::logging::log_hydration_operation;
use crate::models::{Model, Row};
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn, Instrument};

pub struct Hydrator<M: Model> {
    config: HydratorConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for Hydrator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Clone for Hydrator<M> {
    fn clone(&self) -> Self {
        Self::with_config(self.config.clone())
    }
}

impl<M: Model> Hydrator<M> {
    pub fn new() -> Self {
        Self::with_config(HydratorConfig::default())
    }

    pub fn with_config(config: HydratorConfig) -> Self {
        Self {
            config,
            _model: PhantomData,
        }
    }

    pub fn config(&self) -> &HydratorConfig {
        &self.config
    }

    /// Hydrate `input` as the originating call of a new call tree.
    ///
    /// `None` input resolves to `None` without running any Loader.
    pub async fn hydrate(
        &self,
        input: Option<RowInput<M>>,
        options: HydrateOptions,
    ) -> Result<Option<Hydrated<M>>> {
        let ctx = HydrationContext::root::<M>(&self.config, options)?;
        hydrate_in(input, ctx).await
    }

    /// Like [`Hydrator::hydrate`], also returning the call tree's counters
    pub async fn hydrate_with_stats(
        &self,
        input: Option<RowInput<M>>,
        options: HydrateOptions,
    ) -> Result<(Option<Hydrated<M>>, HydrationStats)> {
        let ctx = HydrationContext::root::<M>(&self.config, options)?;
        let probe = ctx.clone();
        let hydrated = hydrate_in(input, ctx).await?;
        Ok((hydrated, probe.stats()))
    }

    /// Classify untyped JSON (see [`RowInput::classify`]) and hydrate it
    pub async fn hydrate_value(
        &self,
        value: Value,
        options: HydrateOptions,
    ) -> Result<Option<Hydrated<M>>> {
        let ctx = HydrationContext::root::<M>(&self.config, options)?;
        let input = RowInput::classify(value)?;
        hydrate_in(input, ctx).await
    }

    /// Await `pending` and hydrate what it resolves to. A failure of `pending`
    /// is returned as [`HydrationError::Upstream`].
    pub async fn hydrate_pending<F, E>(
        &self,
        pending: F,
        options: HydrateOptions,
    ) -> Result<Option<Hydrated<M>>>
    where
        F: Future<Output = std::result::Result<Option<RowInput<M>>, E>>,
        E: Into<BoxError>,
    {
        let ctx = HydrationContext::root::<M>(&self.config, options)?;
        let input = pending
            .instrument(ctx.span().clone())
            .await
            .map_err(|error| HydrationError::from_upstream(error.into()))?;
        hydrate_in(input, ctx).await
    }

    /// Construct a single model as the originating call of a new call tree
    pub async fn construct(&self, row: Row<M>, options: HydrateOptions) -> Result<M> {
        let ctx = HydrationContext::root::<M>(&self.config, options)?;
        let span = ctx.span().clone();
        construct(row, &ctx).instrument(span).await
    }
}

/// Hydrate `input` within an existing call tree
pub(crate) async fn hydrate_in<M: Model>(
    input: Option<RowInput<M>>,
    ctx: HydrationContext,
) -> Result<Option<Hydrated<M>>> {
    let Some(input) = input else {
        debug!(
            model = M::MODEL_NAME,
            event = events::HYDRATE_EMPTY,
            "No rows to hydrate"
        );
        return Ok(None);
    };

    let shape = input.shape();
    let records = input.len();
    let span = ctx.span().clone();

    let result = async {
        debug!(
            model = M::MODEL_NAME,
            shape = %shape,
            records = records,
            event = events::HYDRATE_STARTED,
            "Hydrating rows"
        );

        match input {
            RowInput::Single(row) => construct(row, &ctx).await.map(Hydrated::Single),
            RowInput::Sequence(rows) => fan_out(rows, &ctx).await.map(Hydrated::Sequence),
            RowInput::Keyed(rows) => {
                let (keys, rows): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
                let models = fan_out(rows, &ctx).await?;
                Ok(Hydrated::Keyed(keys.into_iter().zip(models).collect()))
            }
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) if ctx.is_top() => log_hydration_operation(
            events::HYDRATE_COMPLETED,
            M::MODEL_NAME,
            &shape.to_string(),
            records,
            true,
            None,
        ),
        Ok(_) => debug!(
            model = M::MODEL_NAME,
            shape = %shape,
            records = records,
            depth = ctx.depth(),
            event = events::HYDRATE_COMPLETED,
            "Nested hydration completed"
        ),
        Err(error) => warn!(
            model = M::MODEL_NAME,
            shape = %shape,
            records = records,
            depth = ctx.depth(),
            is_top = ctx.is_top(),
            error = %error,
            event = events::HYDRATE_FAILED,
            "Hydration failed"
        ),
    }

    result.map(Some)
}

/// Produce one model from one row.
///
/// Raw records get a fresh instance from [`Model::from_record`]; the Loader
/// then runs unless the same record is already being loaded further up this
/// path of the tree, in which case the base-copied instance is returned as is.
pub(crate) async fn construct<M: Model>(row: Row<M>, ctx: &HydrationContext) -> Result<M> {
    let record = match row {
        Row::Hydrated(model) => {
            ctx.recorder().record_passed_through();
            return Ok(model);
        }
        Row::Raw(record) => record,
    };

    let mut model = M::from_record(&record)?;

    let identity = M::identity(&record);
    if ctx.chain().contains::<M>(&identity) {
        debug!(
            model = M::MODEL_NAME,
            depth = ctx.depth(),
            chain = ctx.chain().len(),
            event = events::RECORD_SHORT_CIRCUITED,
            "Record re-entered its own Loader, skipping"
        );
        ctx.recorder().record_short_circuited();
        return Ok(model);
    }

    let loader_ctx = ctx.entering::<M>(identity);
    model
        .load(&record, &loader_ctx)
        .await
        .map_err(|error| HydrationError::from_loader(M::MODEL_NAME, error))?;

    ctx.recorder().record_constructed();
    Ok(model)
}

async fn fan_out<M: Model>(rows: Vec<Row<M>>, ctx: &HydrationContext) -> Result<Vec<M>> {
    let total = rows.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(ctx.concurrency_limit()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let mut tasks = FuturesUnordered::new();

    for (index, row) in rows.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let in_flight = Arc::clone(&in_flight);
        let task_ctx = ctx.clone();
        let span = ctx.span().clone();

        let handle = tokio::spawn(
            async move {
                // Closed once a sibling fails; rows not yet started are skipped
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                task_ctx.recorder().observe_in_flight(running);

                let result = construct(row, &task_ctx).await;

                in_flight.fetch_sub(1, Ordering::SeqCst);
                Some(result)
            }
            .instrument(span),
        );
        tasks.push(async move { (index, handle.await) });
    }

    let mut slots: Vec<Option<M>> = (0..total).map(|_| None).collect();

    while let Some((index, joined)) = tasks.next().await {
        match joined {
            Ok(Some(Ok(model))) => slots[index] = Some(model),
            Ok(Some(Err(error))) => {
                semaphore.close();
                return Err(error);
            }
            Ok(None) => {}
            Err(join_error) => {
                semaphore.close();
                return Err(HydrationError::TaskFailed {
                    model: M::MODEL_NAME,
                    reason: join_error.to_string(),
                });
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| HydrationError::TaskFailed {
                model: M::MODEL_NAME,
                reason: "construction did not complete".to_string(),
            })
        })
        .collect()
}
