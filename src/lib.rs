/*!
 * Rendezvous Library
 * Condition variable and channel signal primitives with a harness comparing them
 */

pub mod core;
pub mod demo;
pub mod harness;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::sync::{
    BroadcastStrategy, ChannelSignal, CondGuard, CondSignal, CondVar, Notifier, Rendezvous,
    SyncConfig, Waitable, WakeResult,
};
pub use demo::run_broadcast_demo;
pub use harness::{Harness, HarnessConfig, Mode, RunReport};
pub use monitoring::init_tracing;
