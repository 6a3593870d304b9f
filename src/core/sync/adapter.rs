/*!
 * Condition Variable Capability Adapter
 *
 * Exposes a `CondVar<()>` through the `Waitable`/`Notifier` traits. Each
 * operation takes the guard for its own duration, the way a goroutine would
 * wrap `cond.Wait()` in `L.Lock()`/`L.Unlock()`.
 */

use super::condvar::CondVar;
use super::traits::{Notifier, Waitable, WakeResult};
use crate::core::errors::SyncResult;

/// Condition variable behind the capability traits
#[derive(Default)]
pub struct CondSignal {
    cv: CondVar<()>,
}

impl CondSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signal/broadcast calls so far
    pub fn generation(&self) -> u64 {
        let guard = self.cv.lock();
        self.cv.generation(&guard).unwrap_or_default()
    }
}

impl Waitable for CondSignal {
    /// `on_registered` runs under the guard, so a notifier that takes the
    /// guard after observing it is ordered after this waiter's registration.
    fn wait_with(&self, on_registered: &mut dyn FnMut()) -> SyncResult<()> {
        let mut guard = self.cv.lock();
        on_registered();
        self.cv.wait(&mut guard)
    }
}

impl Notifier for CondSignal {
    fn signal(&self) -> SyncResult<WakeResult> {
        let mut guard = self.cv.lock();
        self.cv.signal(&mut guard)
    }

    fn broadcast(&self) -> SyncResult<WakeResult> {
        let mut guard = self.cv.lock();
        self.cv.broadcast(&mut guard)
    }

    fn waiter_count(&self) -> usize {
        let guard = self.cv.lock();
        self.cv.waiter_count(&guard).unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "condvar"
    }
}
