//! # Reentrancy Guard
//!
//! Call-scoped state for one call tree. A fresh guard is created for each
//! externally initiated hydrate call, so concurrent trees never observe each
//! other's flags.
//!
//! Two mechanisms live here:
//!
//! - the per-model `is_top` flag, set by [`ReentrancyGuard::mark_top`] and read
//!   exactly once by [`ReentrancyGuard::consume_is_top`], so only the originating
//!   call in a tree is told it is top-level;
//! - the [`ConstructionChain`], the (model, record identity) pairs whose Loaders
//!   are running on the path from the originating call down to the current
//!   construction. A record already on its own chain is not loaded again, which
//!   is what terminates mutually recursive models. Sibling rows and separate
//!   branches carry separate chains, so equal records reached by different
//!   paths are each loaded.

use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    top_flags: DashMap<TypeId, bool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `M`'s top flag
    pub fn mark_top<M: 'static>(&self) {
        self.top_flags.insert(TypeId::of::<M>(), true);
    }

    /// Read `M`'s top flag and clear it. Models never marked read `false`.
    pub fn consume_is_top<M: 'static>(&self) -> bool {
        let mut flag = self.top_flags.entry(TypeId::of::<M>()).or_insert(false);
        std::mem::replace(&mut *flag, false)
    }
}

#[derive(Debug)]
struct Link {
    model: TypeId,
    identity: String,
    parent: Option<Arc<Link>>,
}

/// Records under construction along one path of a call tree, innermost first.
///
/// Extending a chain shares the parent's links, so every descendant of a
/// construction sees it without any shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct ConstructionChain {
    head: Option<Arc<Link>>,
    len: usize,
}

impl ConstructionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain seen by `M`'s Loader for `identity`
    pub fn extend<M: 'static>(&self, identity: String) -> Self {
        Self {
            head: Some(Arc::new(Link {
                model: TypeId::of::<M>(),
                identity,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Whether `M`'s Loader is already running for `identity` on this path
    pub fn contains<M: 'static>(&self, identity: &str) -> bool {
        let model = TypeId::of::<M>();
        let mut link = self.head.as_deref();
        while let Some(current) = link {
            if current.model == model && current.identity == identity {
                return true;
            }
            link = current.parent.as_deref();
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
