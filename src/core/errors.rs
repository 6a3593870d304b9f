/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for synchronization primitive operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for harness runs
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Precondition violations raised by the primitives
///
/// None of these are transient: each one is a logic error in the caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Guard does not belong to this condition variable")]
    #[diagnostic(
        code(sync::foreign_guard),
        help("Lock the same CondVar you wait on or notify; guards are per instance.")
    )]
    ForeignGuard,

    #[error("Channel signal already closed by a broadcast")]
    #[diagnostic(
        code(sync::already_closed),
        help("Close-based broadcast is single-use. Construct a fresh ChannelSignal per cycle.")
    )]
    AlreadyClosed,

    #[error("Cannot signal on a closed channel")]
    #[diagnostic(
        code(sync::closed),
        help("The channel was closed by a broadcast; every waiter is already released.")
    )]
    Closed,
}

/// Harness construction and verification failures
#[derive(Error, Debug, Diagnostic)]
pub enum HarnessError {
    #[error("Invalid harness configuration: {0}")]
    #[diagnostic(
        code(harness::invalid_config),
        help("Valid modes: cond-signal, cond-broadcast, channel-signal, channel-broadcast.")
    )]
    InvalidConfig(String),

    #[error("Failed to spawn waiter {index}: {source}")]
    #[diagnostic(
        code(harness::spawn_failed),
        help("The system may be out of threads. Lower the waiter count or the stack size.")
    )]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Waiter {0} panicked")]
    #[diagnostic(code(harness::waiter_panicked))]
    WaiterPanicked(usize),

    #[error("Lost wakeup: expected {expected} releases, observed {released}")]
    #[diagnostic(
        code(harness::lost_wakeup),
        help("Every waiter must be registered before the release is issued.")
    )]
    LostWakeup { expected: usize, released: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),
}
