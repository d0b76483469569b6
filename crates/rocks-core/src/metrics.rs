//! Process-wide counters for a status run.
//!
//! Counters are bumped at the call site and emitted together by
//! [`Metrics::flush`] once the report is built.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    snapshots_loaded: AtomicU64,
    packages_classified: AtomicU64,
    merge_conflicts: AtomicU64,
    irreducible_splits: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            snapshots_loaded: AtomicU64::new(0),
            packages_classified: AtomicU64::new(0),
            merge_conflicts: AtomicU64::new(0),
            irreducible_splits: AtomicU64::new(0),
        }
    }

    pub fn inc_snapshots_loaded(&self) {
        self.snapshots_loaded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "snapshots_loaded", "counter incremented");
    }

    /// One per (package, distribution) classification.
    pub fn inc_packages_classified(&self) {
        self.packages_classified.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "packages_classified", "counter incremented");
    }

    pub fn add_merge_conflicts(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.merge_conflicts.fetch_add(count, Ordering::Relaxed);
        tracing::trace!(metric = "merge_conflicts", count, "counter incremented");
    }

    pub fn inc_irreducible_splits(&self) {
        self.irreducible_splits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "irreducible_splits", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            snapshots_loaded = self.snapshots_loaded(),
            packages_classified = self.packages_classified(),
            merge_conflicts = self.merge_conflicts(),
            irreducible_splits = self.irreducible_splits(),
        );
    }

    pub fn snapshots_loaded(&self) -> u64 {
        self.snapshots_loaded.load(Ordering::Relaxed)
    }

    pub fn packages_classified(&self) -> u64 {
        self.packages_classified.load(Ordering::Relaxed)
    }

    pub fn merge_conflicts(&self) -> u64 {
        self.merge_conflicts.load(Ordering::Relaxed)
    }

    pub fn irreducible_splits(&self) -> u64 {
        self.irreducible_splits.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.snapshots_loaded.store(0, Ordering::Relaxed);
        self.packages_classified.store(0, Ordering::Relaxed);
        self.merge_conflicts.store(0, Ordering::Relaxed);
        self.irreducible_splits.store(0, Ordering::Relaxed);
    }
}
