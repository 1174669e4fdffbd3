//! Grid-level best-result slot shared by sub-workers.

use cal_types::BestResult;
use parking_lot::Mutex;

/// Holds the best result for one grid. Every update reads, compares and
/// writes under a single lock acquisition.
#[derive(Debug)]
pub struct BestSlot {
    inner: Mutex<BestResult>,
}

impl BestSlot {
    pub fn new(initial: BestResult) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Merge a sub-worker's local winner. Replaces the held result only on
    /// strict improvement; returns whether it did.
    pub fn offer(&self, candidate: &BestResult) -> bool {
        let Some(point) = candidate.point else {
            return false;
        };
        self.inner
            .lock()
            .offer(point, candidate.error, candidate.parameters)
    }

    pub fn snapshot(&self) -> BestResult {
        self.inner.lock().clone()
    }

    /// Freeze the slot once all contributors have finished.
    pub fn into_inner(self) -> BestResult {
        self.inner.into_inner()
    }
}
