/*!
 * Rendezvous Point
 *
 * One concrete type for "a place tasks block until released", selected from
 * a `SyncConfig`.
 *
 * # Design: Enum Dispatch
 *
 * Instead of `Arc<dyn Waitable + Notifier>`, an enum over the two primitives
 * keeps the harness hot path free of vtable calls while still letting it
 * swap implementations from configuration.
 */

use super::adapter::CondSignal;
use super::channel::ChannelSignal;
use super::config::{PrimitiveType, SyncConfig};
use super::traits::{Notifier, Waitable, WakeResult};
use crate::core::errors::SyncResult;

/// Primitive implementation (enum dispatch)
pub enum Rendezvous {
    Condvar(CondSignal),
    Channel(ChannelSignal),
}

impl Rendezvous {
    /// Build the primitive named by the configuration
    pub fn new(config: SyncConfig) -> Self {
        match config.primitive {
            PrimitiveType::Condvar => Self::Condvar(CondSignal::new()),
            PrimitiveType::Channel => Self::Channel(ChannelSignal::new(config.channel_broadcast)),
        }
    }
}

impl Waitable for Rendezvous {
    #[inline(always)]
    fn wait_with(&self, on_registered: &mut dyn FnMut()) -> SyncResult<()> {
        match self {
            Self::Condvar(s) => s.wait_with(on_registered),
            Self::Channel(s) => s.wait_with(on_registered),
        }
    }
}

impl Notifier for Rendezvous {
    #[inline(always)]
    fn signal(&self) -> SyncResult<WakeResult> {
        match self {
            Self::Condvar(s) => s.signal(),
            Self::Channel(s) => s.signal(),
        }
    }

    #[inline(always)]
    fn broadcast(&self) -> SyncResult<WakeResult> {
        match self {
            Self::Condvar(s) => s.broadcast(),
            Self::Channel(s) => s.broadcast(),
        }
    }

    #[inline(always)]
    fn waiter_count(&self) -> usize {
        match self {
            Self::Condvar(s) => s.waiter_count(),
            Self::Channel(s) => s.waiter_count(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Condvar(s) => s.name(),
            Self::Channel(s) => s.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::BroadcastStrategy;

    #[test]
    fn test_config_selects_primitive() {
        assert_eq!(Rendezvous::new(SyncConfig::default()).name(), "condvar");
        assert_eq!(
            Rendezvous::new(SyncConfig::channel(BroadcastStrategy::Close)).name(),
            "channel-close"
        );
        assert_eq!(
            Rendezvous::new(SyncConfig::channel(BroadcastStrategy::FanOut)).name(),
            "channel-fan-out"
        );
    }
}
