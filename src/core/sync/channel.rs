/*!
 * Channel-Based Signal
 *
 * The same wait/signal/broadcast surface as the condition variable, built on
 * a zero-capacity flume channel instead of a guarded wait set.
 *
 * # Handoff Asymmetry
 *
 * `signal` sends one token on a rendezvous channel and blocks until a
 * receiver takes it. `CondVar::signal` never blocks the signaller. This
 * difference is what the harness measures and must not be smoothed over.
 *
 * # Broadcast
 *
 * A single send cannot reach many receivers, so broadcast is one of two
 * strategies fixed at construction:
 * - `Close`: drop the only sender; every blocked and every future `wait`
 *   returns. Single-use, a fresh instance is needed per cycle.
 * - `FanOut`: send one token per registered waiter. Each send blocks until
 *   accepted, so cost grows linearly and release is sequential.
 */

use super::traits::{Notifier, Waitable, WakeResult};
use crate::core::errors::{SyncError, SyncResult};
use flume::{Receiver, RecvError, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, trace};

/// How a channel signal releases all waiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BroadcastStrategy {
    /// Close the channel (single-use)
    Close,
    /// Send one token per registered waiter
    #[default]
    FanOut,
}

impl BroadcastStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BroadcastStrategy::Close => "close",
            BroadcastStrategy::FanOut => "fan-out",
        }
    }
}

impl fmt::Display for BroadcastStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(BroadcastStrategy::Close),
            "fan-out" | "fanout" => Ok(BroadcastStrategy::FanOut),
            other => Err(format!("unknown broadcast strategy '{other}'")),
        }
    }
}

/// Lifecycle of the underlying channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Open,
    Closed,
}

/// Rendezvous-channel signal
pub struct ChannelSignal {
    strategy: BroadcastStrategy,
    /// `None` once closed
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
    /// Waiters registered and not yet handed a token
    waiting: AtomicUsize,
}

impl ChannelSignal {
    /// Create an open channel signal with a fixed broadcast strategy
    pub fn new(strategy: BroadcastStrategy) -> Self {
        let (sender, receiver) = flume::bounded(0);
        Self {
            strategy,
            sender: Mutex::new(Some(sender)),
            receiver,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Close-based broadcast
    pub fn with_close() -> Self {
        Self::new(BroadcastStrategy::Close)
    }

    /// Fan-out broadcast
    pub fn with_fan_out() -> Self {
        Self::new(BroadcastStrategy::FanOut)
    }

    pub fn strategy(&self) -> BroadcastStrategy {
        self.strategy
    }

    pub fn state(&self) -> ChannelState {
        if self.sender.lock().is_some() {
            ChannelState::Open
        } else {
            ChannelState::Closed
        }
    }

    /// Clone the sender without holding the lock across a blocking send
    fn sender(&self) -> SyncResult<Sender<()>> {
        self.sender.lock().clone().ok_or_else(|| {
            error!("signal on closed channel");
            SyncError::Closed
        })
    }

    /// Hand one token to a receiver, blocking until it is taken
    fn handoff(&self, sender: &Sender<()>) -> SyncResult<()> {
        // We hold a receiver, so the channel cannot disconnect under us
        sender.send(()).map_err(|_| SyncError::Closed)?;
        self.waiting.fetch_sub(1, Ordering::AcqRel);
        Ok(())
    }

    fn close(&self) -> SyncResult<WakeResult> {
        let sender = self.sender.lock().take().ok_or_else(|| {
            error!("close-based broadcast issued twice");
            SyncError::AlreadyClosed
        })?;
        let count = self.waiting.load(Ordering::Acquire);
        drop(sender);
        trace!(count, "channel closed");
        Ok(WakeResult::from_count(count))
    }

    fn fan_out(&self) -> SyncResult<WakeResult> {
        let sender = self.sender()?;
        let count = self.waiting.load(Ordering::Acquire);
        for _ in 0..count {
            self.handoff(&sender)?;
        }
        trace!(count, "fan-out broadcast");
        Ok(WakeResult::from_count(count))
    }
}

impl Default for ChannelSignal {
    fn default() -> Self {
        Self::new(BroadcastStrategy::default())
    }
}

impl Waitable for ChannelSignal {
    fn wait_with(&self, on_registered: &mut dyn FnMut()) -> SyncResult<()> {
        self.waiting.fetch_add(1, Ordering::AcqRel);
        on_registered();

        match self.receiver.recv() {
            Ok(()) => trace!("token received"),
            Err(RecvError::Disconnected) => {
                // No sender will account for us after a close
                self.waiting.fetch_sub(1, Ordering::AcqRel);
                trace!("released by close");
            }
        }
        Ok(())
    }
}

impl Notifier for ChannelSignal {
    /// Blocks until some waiter accepts the token
    fn signal(&self) -> SyncResult<WakeResult> {
        let sender = self.sender()?;
        self.handoff(&sender)?;
        Ok(WakeResult::Woken(1))
    }

    fn broadcast(&self) -> SyncResult<WakeResult> {
        match self.strategy {
            BroadcastStrategy::Close => self.close(),
            BroadcastStrategy::FanOut => self.fan_out(),
        }
    }

    fn waiter_count(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }

    fn name(&self) -> &'static str {
        match self.strategy {
            BroadcastStrategy::Close => "channel-close",
            BroadcastStrategy::FanOut => "channel-fan-out",
        }
    }
}
