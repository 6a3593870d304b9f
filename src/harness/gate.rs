/*!
 * Arrival Gate
 *
 * Counting barrier the harness uses to hold off the release until every
 * waiter has registered, and to detect when every waiter has come back out.
 */

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Counts arrivals and lets one thread block until a target is reached
#[derive(Default)]
pub struct ArrivalGate {
    count: Mutex<usize>,
    arrived: Condvar,
}

impl ArrivalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one arrival
    pub fn arrive(&self) {
        let mut count = self.count.lock();
        *count += 1;
        self.arrived.notify_all();
    }

    /// Block until at least `target` arrivals have been recorded
    pub fn wait_for(&self, target: usize) {
        let mut count = self.count.lock();
        while *count < target {
            self.arrived.wait(&mut count);
        }
    }

    /// Arrivals so far
    pub fn arrived(&self) -> usize {
        *self.count.lock()
    }

    /// Token that records one arrival when dropped, including on unwind
    pub fn arrive_on_drop(self: &Arc<Self>) -> ArrivalToken {
        ArrivalToken {
            gate: Arc::clone(self),
        }
    }
}

/// Records an arrival at its gate when dropped
pub struct ArrivalToken {
    gate: Arc<ArrivalGate>,
}

impl Drop for ArrivalToken {
    fn drop(&mut self) {
        self.gate.arrive();
    }
}
