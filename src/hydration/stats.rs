//! Per-call-tree counters, shared by every hydrate call in the tree.

use parking_lot::Mutex;
use serde::Serialize;

/// Snapshot of what a call tree did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrationStats {
    /// Records whose Loader ran to completion
    pub constructed: usize,
    /// Already-hydrated instances returned unchanged
    pub passed_through: usize,
    /// Records that re-entered their own Loader and were returned base-copied
    pub short_circuited: usize,
    /// Hydrate calls made from Loaders
    pub nested_calls: usize,
    /// Highest number of simultaneous constructions seen in any single fan-out
    pub peak_in_flight: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    inner: Mutex<HydrationStats>,
}

impl StatsRecorder {
    pub(crate) fn record_constructed(&self) {
        self.inner.lock().constructed += 1;
    }

    pub(crate) fn record_passed_through(&self) {
        self.inner.lock().passed_through += 1;
    }

    pub(crate) fn record_short_circuited(&self) {
        self.inner.lock().short_circuited += 1;
    }

    pub(crate) fn record_nested_call(&self) {
        self.inner.lock().nested_calls += 1;
    }

    pub(crate) fn observe_in_flight(&self, in_flight: usize) {
        let mut stats = self.inner.lock();
        stats.peak_in_flight = stats.peak_in_flight.max(in_flight);
    }

    pub(crate) fn snapshot(&self) -> HydrationStats {
        *self.inner.lock()
    }
}
