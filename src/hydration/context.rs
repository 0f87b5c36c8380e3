//! # Hydration Context
//!
//! The explicit token threaded through every hydrate call and every Loader.
//! It replaces process-wide mutable state: the call tree's [`ReentrancyGuard`],
//! its identifier, the caller's metadata and the tracing span all travel with
//! the context, so concurrent calls for the same model cannot interfere.

use super::guard::{ConstructionChain, ReentrancyGuard};
use super::hydrator;
use super::shape::{Hydrated, RowInput};
use super::stats::{HydrationStats, StatsRecorder};
use crate::config::HydratorConfig;
use crate::error::{HydrationError, Result};
use crate::models::{Model, RawRecord, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

/// Per-call options, merged over [`HydratorConfig`] defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydrateOptions {
    /// Overrides the guard-derived top-level flag when set
    pub is_top: Option<bool>,
    pub concurrency_limit: Option<usize>,
    /// Only honoured on the originating call of a tree
    pub max_depth: Option<usize>,
    /// Caller data made available to every Loader in the tree
    #[serde(default)]
    pub metadata: RawRecord,
}

impl HydrateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_is_top(mut self, is_top: bool) -> Self {
        self.is_top = Some(is_top);
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HydrationContext {
    tree_id: Uuid,
    is_top: bool,
    depth: usize,
    concurrency_limit: usize,
    max_depth: usize,
    metadata: Arc<RawRecord>,
    span: Span,
    guard: Arc<ReentrancyGuard>,
    chain: ConstructionChain,
    stats: Arc<StatsRecorder>,
}

impl HydrationContext {
    /// Start a new call tree for `M`. Marks `M` as top before reading the flag,
    /// so the originating call is the one that observes `is_top == true`.
    pub(crate) fn root<M: Model>(
        config: &HydratorConfig,
        options: HydrateOptions,
    ) -> Result<Self> {
        let concurrency_limit = options.concurrency_limit.unwrap_or(config.concurrency_limit);
        let max_depth = options.max_depth.unwrap_or(config.max_depth);
        validate_limits(concurrency_limit, max_depth)?;

        let guard = Arc::new(ReentrancyGuard::new());
        guard.mark_top::<M>();
        let detected = guard.consume_is_top::<M>();
        let is_top = options.is_top.unwrap_or(detected);

        let tree_id = Uuid::new_v4();
        let span = info_span!(
            "hydrate",
            model = M::MODEL_NAME,
            tree_id = %tree_id,
            depth = 0,
            is_top = is_top
        );

        Ok(Self {
            tree_id,
            is_top,
            depth: 0,
            concurrency_limit,
            max_depth,
            metadata: Arc::new(options.metadata),
            span,
            guard,
            chain: ConstructionChain::new(),
            stats: Arc::new(StatsRecorder::default()),
        })
    }

    /// Context for a hydrate call made from inside a Loader. `N` is never
    /// marked top here, so the nested call reads `false` unless overridden.
    pub(crate) fn nested<N: Model>(&self, options: HydrateOptions) -> Result<Self> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(HydrationError::DepthExceeded {
                model: N::MODEL_NAME,
                max_depth: self.max_depth,
            });
        }

        let concurrency_limit = options.concurrency_limit.unwrap_or(self.concurrency_limit);
        validate_limits(concurrency_limit, self.max_depth)?;

        let detected = self.guard.consume_is_top::<N>();
        let is_top = options.is_top.unwrap_or(detected);

        let metadata = if options.metadata.is_empty() {
            Arc::clone(&self.metadata)
        } else {
            let mut merged = (*self.metadata).clone();
            merged.extend(options.metadata);
            Arc::new(merged)
        };

        let span = info_span!(
            parent: &self.span,
            "hydrate",
            model = N::MODEL_NAME,
            tree_id = %self.tree_id,
            depth = depth,
            is_top = is_top
        );

        self.stats.record_nested_call();

        Ok(Self {
            tree_id: self.tree_id,
            is_top,
            depth,
            concurrency_limit,
            max_depth: self.max_depth,
            metadata,
            span,
            guard: Arc::clone(&self.guard),
            chain: self.chain.clone(),
            stats: Arc::clone(&self.stats),
        })
    }

    /// Context handed to `M`'s Loader for the record identified by `identity`
    pub(crate) fn entering<M: Model>(&self, identity: String) -> Self {
        Self {
            chain: self.chain.extend::<M>(identity),
            ..self.clone()
        }
    }

    /// Whether this is the externally initiated call of the tree
    pub fn is_top(&self) -> bool {
        self.is_top
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn tree_id(&self) -> Uuid {
        self.tree_id
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn metadata(&self) -> &RawRecord {
        &self.metadata
    }

    /// Span of the current hydrate call; every construction runs inside it
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    /// Records whose Loaders enclose this point of the tree
    pub fn chain(&self) -> &ConstructionChain {
        &self.chain
    }

    pub fn stats(&self) -> HydrationStats {
        self.stats.snapshot()
    }

    pub(crate) fn recorder(&self) -> &StatsRecorder {
        &self.stats
    }

    /// Hydrate a related model as a nested call of this tree
    pub async fn hydrate<N: Model>(
        &self,
        input: Option<RowInput<N>>,
    ) -> Result<Option<Hydrated<N>>> {
        self.hydrate_with(input, HydrateOptions::default()).await
    }

    pub async fn hydrate_with<N: Model>(
        &self,
        input: Option<RowInput<N>>,
        options: HydrateOptions,
    ) -> Result<Option<Hydrated<N>>> {
        let ctx = self.nested::<N>(options)?;
        hydrator::hydrate_in(input, ctx).await
    }

    /// Classify untyped JSON, then hydrate it as a nested call
    pub async fn hydrate_value<N: Model>(&self, value: Value) -> Result<Option<Hydrated<N>>> {
        let ctx = self.nested::<N>(HydrateOptions::default())?;
        let input = RowInput::classify(value)?;
        hydrator::hydrate_in(input, ctx).await
    }

    /// Hydrate a single related record
    pub async fn hydrate_one<N: Model>(&self, record: RawRecord) -> Result<N> {
        let ctx = self.nested::<N>(HydrateOptions::default())?;
        let span = ctx.span().clone();
        hydrator::construct(Row::Raw(record), &ctx)
            .instrument(span)
            .await
    }
}

fn validate_limits(concurrency_limit: usize, max_depth: usize) -> Result<()> {
    if concurrency_limit == 0 {
        return Err(HydrationError::Configuration(
            "concurrency_limit must be at least 1".to_string(),
        ));
    }
    if max_depth == 0 {
        return Err(HydrationError::Configuration(
            "max_depth must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DynamicModel;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Other;

    impl Model for Other {
        const MODEL_NAME: &'static str = "Other";
    }

    #[test]
    fn test_root_is_top_and_nested_is_not() {
        let root = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::default(),
        )
        .unwrap();
        assert!(root.is_top());
        assert_eq!(root.depth(), 0);

        let same_model = root.nested::<DynamicModel>(HydrateOptions::default()).unwrap();
        let other_model = root.nested::<Other>(HydrateOptions::default()).unwrap();
        assert!(!same_model.is_top());
        assert!(!other_model.is_top());
        assert_eq!(other_model.depth(), 1);
        assert_eq!(other_model.tree_id(), root.tree_id());
        assert_eq!(root.stats().nested_calls, 2);
    }

    #[test]
    fn test_explicit_is_top_overrides_detection() {
        let root = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::new().with_is_top(false),
        )
        .unwrap();
        assert!(!root.is_top());

        let nested = root
            .nested::<Other>(HydrateOptions::new().with_is_top(true))
            .unwrap();
        assert!(nested.is_top());
    }

    #[test]
    fn test_separate_roots_do_not_share_state() {
        let config = HydratorConfig::default();
        let first =
            HydrationContext::root::<DynamicModel>(&config, HydrateOptions::default()).unwrap();
        let second =
            HydrationContext::root::<DynamicModel>(&config, HydrateOptions::default()).unwrap();

        assert!(first.is_top());
        assert!(second.is_top());
        assert_ne!(first.tree_id(), second.tree_id());
    }

    #[test]
    fn test_depth_limit() {
        let root = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::new().with_max_depth(1),
        )
        .unwrap();
        let nested = root.nested::<Other>(HydrateOptions::default()).unwrap();
        let error = nested.nested::<DynamicModel>(HydrateOptions::default()).unwrap_err();
        assert!(matches!(
            error,
            HydrationError::DepthExceeded {
                model: "DynamicModel",
                max_depth: 1
            }
        ));
    }

    #[test]
    fn test_metadata_is_inherited_and_merged() {
        let root = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::new().with_metadata("request_id", json!("req-1")),
        )
        .unwrap();
        let nested = root
            .nested::<Other>(HydrateOptions::new().with_metadata("source", json!("books")))
            .unwrap();

        assert_eq!(nested.metadata().get("request_id"), Some(&json!("req-1")));
        assert_eq!(nested.metadata().get("source"), Some(&json!("books")));
        assert!(root.metadata().get("source").is_none());
    }

    #[test]
    fn test_entering_extends_only_the_new_context() {
        let root = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::default(),
        )
        .unwrap();
        let loading = root.entering::<DynamicModel>("row-1".to_string());
        let nested = loading.nested::<Other>(HydrateOptions::default()).unwrap();

        assert!(root.chain().is_empty());
        assert!(loading.chain().contains::<DynamicModel>("row-1"));
        assert!(nested.chain().contains::<DynamicModel>("row-1"));
        assert_eq!(loading.tree_id(), root.tree_id());
        assert!(loading.is_top());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = HydrationContext::root::<DynamicModel>(
            &HydratorConfig::default(),
            HydrateOptions::new().with_concurrency_limit(0),
        );
        assert!(matches!(result, Err(HydrationError::Configuration(_))));
    }
}
