/*!
 * Limits and Constants
 *
 * Centralized location for harness defaults and thread sizing.
 */

// =============================================================================
// HARNESS DEFAULTS
// =============================================================================

/// Default number of concurrent waiters per harness run
pub const DEFAULT_WAITERS: usize = 1000;

/// Upper bound on waiters per run
/// Each waiter is an OS thread; beyond this the run measures the scheduler, not the primitive
pub const MAX_WAITERS: usize = 10_000;

/// Stack size for waiter threads (64KB)
/// Waiters only block and bump a counter, the default 2MB stack is wasted address space
pub const WAITER_STACK_SIZE: usize = 64 * 1024;

/// Number of waiters in the broadcast demo
pub const DEMO_WAITERS: usize = 2;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Selects the harness mode (cond-signal, cond-broadcast, channel-signal, channel-broadcast)
pub const ENV_MODE: &str = "RENDEZVOUS_MODE";

/// Overrides the waiter count
pub const ENV_WAITERS: &str = "RENDEZVOUS_WAITERS";

/// Selects the channel broadcast strategy (close, fan-out)
pub const ENV_CHANNEL_BROADCAST: &str = "RENDEZVOUS_CHANNEL_BROADCAST";

/// Enables JSON log output
pub const ENV_TRACE_JSON: &str = "RENDEZVOUS_TRACE_JSON";
