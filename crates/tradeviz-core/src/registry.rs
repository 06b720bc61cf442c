// File: crates/tradeviz-core/src/registry.rs
// Summary: Slot-name → chart ownership; replacing a chart destroys the previous one first.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::chart::LineChart;

pub type ChartId = u64;

/// An attached chart together with the render target it was drawn into.
pub struct ChartHandle {
    pub id: ChartId,
    pub target: String,
    pub chart: LineChart,
}

/// Owns every live line chart, keyed by slot name.
///
/// Loaders share one registry through `&ChartRegistry`; the lock is only
/// held for map updates, never across an await point.
#[derive(Default)]
pub struct ChartRegistry {
    slots: Mutex<BTreeMap<String, ChartHandle>>,
    next_id: AtomicU64,
    destroyed: AtomicU64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ChartHandle>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach `chart` to `slot`, destroying whatever chart held it before.
    pub fn attach(&self, slot: &str, target: &str, chart: LineChart) -> ChartId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut slots = self.lock();
        if let Some(previous) = slots.remove(slot) {
            self.release(slot, previous);
        }
        slots.insert(slot.to_string(), ChartHandle { id, target: target.to_string(), chart });
        id
    }

    /// Destroy the chart in `slot`, if any.
    pub fn destroy(&self, slot: &str) -> bool {
        let removed = self.lock().remove(slot);
        match removed {
            Some(handle) => {
                self.release(slot, handle);
                true
            }
            None => false,
        }
    }

    fn release(&self, slot: &str, handle: ChartHandle) {
        tracing::debug!(slot, chart = handle.id, element = %handle.target, "destroying previous chart");
        self.destroyed.fetch_add(1, Ordering::Relaxed);
        drop(handle);
    }

    /// Run `f` against the chart in `slot`.
    pub fn get<R>(&self, slot: &str, f: impl FnOnce(&ChartHandle) -> R) -> Option<R> {
        self.lock().get(slot).map(f)
    }

    pub fn id_of(&self, slot: &str) -> Option<ChartId> {
        self.get(slot, |h| h.id)
    }

    pub fn slots(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of charts currently attached (one per occupied slot).
    pub fn live_instances(&self) -> usize {
        self.lock().len()
    }

    /// Total charts destroyed so far, by replacement or explicit destroy.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed.load(Ordering::Relaxed)
    }
}
