use std::sync::{Condvar, Mutex};

use crate::util::{OrFatal, lock};

/// Counting signal: a non-negative counter consumers block on until it is positive.
///
/// Initialized to 1 it acts as a binary gate.
#[derive(Debug)]
pub(crate) struct Semaphore {
    name: &'static str,
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub(crate) fn new(name: &'static str, permits: usize) -> Self {
        Semaphore {
            name,
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    pub(crate) fn acquire(&self) {
        let mut permits = lock(&self.permits, self.name);
        while *permits == 0 {
            permits = self.available.wait(permits).or_fatal(self.name);
        }
        *permits -= 1;
    }

    pub(crate) fn release(&self) {
        let mut permits = lock(&self.permits, self.name);
        *permits += 1;
        self.available.notify_one();
    }

    pub(crate) fn value(&self) -> usize {
        *lock(&self.permits, self.name)
    }
}

/// Completion condition for the map phase.
///
/// Map workers retire into it; the shuffle worker pokes it after every pair
/// it absorbs so the orchestrator re-checks whether anything is still in flight.
#[derive(Debug, Default)]
pub(crate) struct MapProgress {
    retired: Mutex<usize>,
    changed: Condvar,
}

impl MapProgress {
    pub(crate) fn retire(&self) {
        let mut retired = lock(&self.retired, "lock map progress");
        *retired += 1;
        self.changed.notify_all();
    }

    pub(crate) fn poke(&self) {
        let _retired = lock(&self.retired, "lock map progress");
        self.changed.notify_all();
    }

    /// Blocks until `workers` map workers retired and `pending` reports zero.
    ///
    /// `pending` is evaluated under the progress lock, and every decrement of
    /// the pending count is followed by a [`MapProgress::poke`], so no wakeup is lost.
    pub(crate) fn wait_drained(&self, workers: usize, pending: impl Fn() -> usize) {
        let mut retired = lock(&self.retired, "lock map progress");
        while *retired < workers || pending() > 0 {
            retired = self
                .changed
                .wait(retired)
                .or_fatal("wait on map progress");
        }
    }
}

/// Marks a map worker retired when dropped, including while unwinding from a
/// panicking map callback.
pub(crate) struct RetireGuard<'a>(pub(crate) &'a MapProgress);

impl Drop for RetireGuard<'_> {
    fn drop(&mut self) {
        self.0.retire();
    }
}
