/*!
 * Harness Modes
 */

use crate::core::sync::PrimitiveType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive and release pattern for one harness run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Condition variable, one signal per waiter
    CondSignal,
    /// Condition variable, one broadcast
    CondBroadcast,
    /// Channel, one handoff per waiter
    ChannelSignal,
    /// Channel, one broadcast (close or fan-out)
    ChannelBroadcast,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::CondSignal,
        Mode::CondBroadcast,
        Mode::ChannelSignal,
        Mode::ChannelBroadcast,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::CondSignal => "cond-signal",
            Mode::CondBroadcast => "cond-broadcast",
            Mode::ChannelSignal => "channel-signal",
            Mode::ChannelBroadcast => "channel-broadcast",
        }
    }

    pub const fn primitive(&self) -> PrimitiveType {
        match self {
            Mode::CondSignal | Mode::CondBroadcast => PrimitiveType::Condvar,
            Mode::ChannelSignal | Mode::ChannelBroadcast => PrimitiveType::Channel,
        }
    }

    /// Whether the release is a single broadcast rather than one signal per waiter
    pub const fn is_broadcast(&self) -> bool {
        matches!(self, Mode::CondBroadcast | Mode::ChannelBroadcast)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| format!("unknown mode '{}'", s.trim()))
    }
}
