/*!
 * Synchronization Traits
 *
 * Capability interface shared by the condition variable and the channel
 * signal, so a driver can swap one for the other without touching its
 * measurement logic.
 */

use crate::core::errors::SyncResult;
use serde::{Deserialize, Serialize};

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Build from a raw count
    #[inline(always)]
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }

    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// Something a task can block on until released
pub trait Waitable: Send + Sync {
    /// Block until released
    ///
    /// `on_registered` runs exactly once, at the point where the caller can
    /// no longer miss a release issued after it returns. Drivers hook their
    /// registration barrier here.
    fn wait_with(&self, on_registered: &mut dyn FnMut()) -> SyncResult<()>;

    /// Block until released
    fn wait(&self) -> SyncResult<()> {
        self.wait_with(&mut || {})
    }
}

/// Something that releases blocked tasks
pub trait Notifier: Send + Sync {
    /// Release at most one waiter
    fn signal(&self) -> SyncResult<WakeResult>;

    /// Release every waiter registered at the moment of the call
    fn broadcast(&self) -> SyncResult<WakeResult>;

    /// Number of currently registered waiters (diagnostics and barriers)
    fn waiter_count(&self) -> usize;

    /// Get primitive name for debugging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_result_from_count() {
        assert_eq!(WakeResult::from_count(0), WakeResult::NoWaiters);
        assert_eq!(WakeResult::from_count(3), WakeResult::Woken(3));
        assert!(!WakeResult::NoWaiters.is_woken());
        assert_eq!(WakeResult::Woken(7).count(), 7);
    }
}
