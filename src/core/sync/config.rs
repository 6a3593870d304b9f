/*!
 * Synchronization Configuration
 *
 * Runtime configuration for primitive selection
 */

use super::channel::BroadcastStrategy;
use serde::{Deserialize, Serialize};

/// Primitive type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveType {
    /// Guarded wait set, non-blocking notify
    Condvar,
    /// Zero-capacity channel, blocking handoff notify
    Channel,
}

/// Synchronization configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Which primitive to build
    pub primitive: PrimitiveType,
    /// Broadcast strategy when `primitive` is `Channel`
    pub channel_broadcast: BroadcastStrategy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::condvar()
    }
}

impl SyncConfig {
    pub const fn condvar() -> Self {
        Self {
            primitive: PrimitiveType::Condvar,
            channel_broadcast: BroadcastStrategy::FanOut,
        }
    }

    pub const fn channel(channel_broadcast: BroadcastStrategy) -> Self {
        Self {
            primitive: PrimitiveType::Channel,
            channel_broadcast,
        }
    }
}
