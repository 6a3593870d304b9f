/*!
 * Synchronization Primitives
 *
 * Two ways to park tasks at a rendezvous point and release them:
 * - `CondVar`: mutex-guarded wait-ticket queue, notify never blocks
 * - `ChannelSignal`: zero-capacity channel, notify is a blocking handoff
 *
 * # Architecture
 *
 * Both sit behind the `Waitable`/`Notifier` capability traits, and
 * `Rendezvous` picks one from a `SyncConfig` so a driver can compare them
 * without changing its own code.
 */

mod adapter;
mod channel;
mod condvar;
mod config;
mod rendezvous;
mod traits;

pub use adapter::CondSignal;
pub use channel::{BroadcastStrategy, ChannelSignal, ChannelState};
pub use condvar::{CondGuard, CondVar};
pub use config::{PrimitiveType, SyncConfig};
pub use rendezvous::Rendezvous;
pub use traits::{Notifier, Waitable, WakeResult};
