/*!
 * Harness Configuration
 *
 * Defaults, presets and environment overrides for harness runs
 */

use super::mode::Mode;
use crate::core::errors::{HarnessError, HarnessResult};
use crate::core::limits::{
    DEFAULT_WAITERS, ENV_CHANNEL_BROADCAST, ENV_MODE, ENV_WAITERS, MAX_WAITERS, WAITER_STACK_SIZE,
};
use crate::core::sync::{BroadcastStrategy, SyncConfig};
use serde::{Deserialize, Serialize};

/// Minimum waiter stack size accepted (16KB)
const MIN_STACK_SIZE: usize = 16 * 1024;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Primitive and release pattern
    pub mode: Mode,
    /// Number of concurrent waiters
    pub waiters: usize,
    /// Broadcast strategy for `channel-broadcast`
    pub channel_broadcast: BroadcastStrategy,
    /// Stack size for each waiter thread
    pub waiter_stack_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: Mode::CondBroadcast,
            waiters: DEFAULT_WAITERS,
            channel_broadcast: BroadcastStrategy::default(),
            waiter_stack_size: WAITER_STACK_SIZE,
        }
    }
}

impl HarnessConfig {
    pub fn new(mode: Mode, waiters: usize) -> Self {
        Self {
            mode,
            waiters,
            ..Default::default()
        }
    }

    pub fn with_channel_broadcast(mut self, strategy: BroadcastStrategy) -> Self {
        self.channel_broadcast = strategy;
        self
    }

    /// Defaults overridden by `RENDEZVOUS_MODE`, `RENDEZVOUS_WAITERS` and
    /// `RENDEZVOUS_CHANNEL_BROADCAST`
    pub fn from_env() -> HarnessResult<Self> {
        let mut config = Self::default();

        if let Ok(mode) = std::env::var(ENV_MODE) {
            config.mode = mode.parse().map_err(HarnessError::InvalidConfig)?;
        }
        if let Ok(waiters) = std::env::var(ENV_WAITERS) {
            config.waiters = waiters.trim().parse().map_err(|e| {
                HarnessError::InvalidConfig(format!("{ENV_WAITERS}='{waiters}': {e}"))
            })?;
        }
        if let Ok(strategy) = std::env::var(ENV_CHANNEL_BROADCAST) {
            config.channel_broadcast = strategy.parse().map_err(HarnessError::InvalidConfig)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.waiters > MAX_WAITERS {
            return Err(HarnessError::InvalidConfig(format!(
                "waiters must be at most {MAX_WAITERS}, got {}",
                self.waiters
            )));
        }
        if self.waiter_stack_size < MIN_STACK_SIZE {
            return Err(HarnessError::InvalidConfig(format!(
                "waiter stack size must be at least {MIN_STACK_SIZE} bytes, got {}",
                self.waiter_stack_size
            )));
        }
        Ok(())
    }

    /// Primitive configuration for this run
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            primitive: self.mode.primitive(),
            channel_broadcast: self.channel_broadcast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::PrimitiveType;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ENV_MODE);
        std::env::remove_var(ENV_WAITERS);
        std::env::remove_var(ENV_CHANNEL_BROADCAST);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(HarnessConfig::from_env().unwrap(), HarnessConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var(ENV_MODE, "channel-broadcast");
        std::env::set_var(ENV_WAITERS, "64");
        std::env::set_var(ENV_CHANNEL_BROADCAST, "close");

        let config = HarnessConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.mode, Mode::ChannelBroadcast);
        assert_eq!(config.waiters, 64);
        assert_eq!(config.channel_broadcast, BroadcastStrategy::Close);
        assert_eq!(config.sync_config().primitive, PrimitiveType::Channel);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        std::env::set_var(ENV_WAITERS, "lots");
        let result = HarnessConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(HarnessError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_limits() {
        assert!(HarnessConfig::new(Mode::CondSignal, MAX_WAITERS).validate().is_ok());
        assert!(HarnessConfig::new(Mode::CondSignal, MAX_WAITERS + 1).validate().is_err());

        let mut config = HarnessConfig::default();
        config.waiter_stack_size = 1024;
        assert!(config.validate().is_err());
    }
}
