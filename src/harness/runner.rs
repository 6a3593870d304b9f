/*!
 * Harness Runner
 *
 * Drives N waiter threads against one primitive and release pattern, and
 * times how long the release takes to drain all of them.
 *
 * # Registration Barrier
 *
 * Each waiter arrives at a gate from its primitive's `on_registered` hook.
 * The release is only issued once all N have arrived, so the measured
 * window never includes waiter setup and no release can precede a waiter.
 *
 * For channel modes the hook fires just before `recv`, not once the thread
 * is actually blocked in it (flume does not expose blocked receivers). The
 * last stretch of scheduling into `recv` therefore lands in `release`.
 * Handoff never loses a token, so this only shifts timing, not correctness.
 *
 * Waiters record completion through a drop token, so a waiter that errors
 * or panics still lets the run reach `join_all` and report the failure.
 */

use super::config::HarnessConfig;
use super::gate::ArrivalGate;
use super::mode::Mode;
use crate::core::errors::{HarnessError, HarnessResult, SyncResult};
use crate::core::sync::{Notifier, Rendezvous, Waitable};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

fn serialize_micros<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_micros() as u64)
}

/// Outcome of one harness run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub mode: Mode,
    pub primitive: &'static str,
    pub waiters: usize,
    /// Waiters that observed their release
    pub released: usize,
    /// signal/broadcast calls issued
    pub notify_calls: usize,
    /// Spawning until every waiter registered
    #[serde(rename = "setup_us", serialize_with = "serialize_micros")]
    pub setup: Duration,
    /// First release call until every waiter returned from wait
    #[serde(rename = "release_us", serialize_with = "serialize_micros")]
    pub release: Duration,
    #[serde(rename = "total_us", serialize_with = "serialize_micros")]
    pub total: Duration,
}

impl RunReport {
    /// Release time per waiter
    pub fn release_per_waiter(&self) -> Duration {
        if self.waiters == 0 {
            Duration::ZERO
        } else {
            self.release / self.waiters as u32
        }
    }
}

/// Benchmark harness over one configuration
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run once against a fresh primitive
    pub fn run(&self) -> HarnessResult<RunReport> {
        let run_id = Uuid::new_v4();
        let waiters = self.config.waiters;
        let span = info_span!("harness_run", run_id = %run_id, mode = %self.config.mode, waiters);
        let _enter = span.enter();

        let start = Instant::now();
        let primitive = Arc::new(Rendezvous::new(self.config.sync_config()));
        let registered = Arc::new(ArrivalGate::new());
        let completed = Arc::new(ArrivalGate::new());

        let mut handles = Vec::with_capacity(waiters);
        for index in 0..waiters {
            match self.spawn_waiter(index, &primitive, &registered, &completed) {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    error!(index, error = %source, "failed to spawn waiter");
                    // Release whoever is already parked before bailing out
                    let spawned = handles.len();
                    registered.wait_for(spawned);
                    primitive.broadcast()?;
                    join_all(handles)?;
                    return Err(HarnessError::Spawn { index, source });
                }
            }
        }

        registered.wait_for(waiters);
        let setup = start.elapsed();
        debug!(setup_us = setup.as_micros() as u64, "all waiters registered");

        let release_start = Instant::now();
        let notify_calls = self.release(&primitive, waiters)?;
        completed.wait_for(waiters);
        let release = release_start.elapsed();

        join_all(handles)?;
        let released = completed.arrived();
        if released != waiters {
            error!(expected = waiters, released, "release count mismatch");
            return Err(HarnessError::LostWakeup {
                expected: waiters,
                released,
            });
        }

        let report = RunReport {
            run_id,
            mode: self.config.mode,
            primitive: primitive.name(),
            waiters,
            released,
            notify_calls,
            setup,
            release,
            total: start.elapsed(),
        };
        info!(
            primitive = report.primitive,
            notify_calls,
            release_us = release.as_micros() as u64,
            "harness run complete"
        );
        Ok(report)
    }

    fn spawn_waiter(
        &self,
        index: usize,
        primitive: &Arc<Rendezvous>,
        registered: &Arc<ArrivalGate>,
        completed: &Arc<ArrivalGate>,
    ) -> std::io::Result<JoinHandle<SyncResult<()>>> {
        let primitive = Arc::clone(primitive);
        let registered = Arc::clone(registered);
        let completed = Arc::clone(completed);

        thread::Builder::new()
            .name(format!("waiter-{index}"))
            .stack_size(self.config.waiter_stack_size)
            .spawn(move || -> SyncResult<()> {
                let _done = completed.arrive_on_drop();
                primitive.wait_with(&mut || registered.arrive())
            })
    }

    /// Issue the mode's release pattern, returning the number of calls made
    fn release(&self, primitive: &Rendezvous, waiters: usize) -> HarnessResult<usize> {
        if waiters == 0 {
            return Ok(0);
        }

        if self.config.mode.is_broadcast() {
            let woken = primitive.broadcast()?;
            debug!(woken = woken.count(), "broadcast issued");
            return Ok(1);
        }

        for call in 0..waiters {
            if !primitive.signal()?.is_woken() {
                // Registration barrier guarantees a waiter; drain the rest so joins cannot hang
                error!(call, "signal found no waiter");
                primitive.broadcast()?;
                return Err(HarnessError::LostWakeup {
                    expected: waiters,
                    released: call,
                });
            }
        }
        Ok(waiters)
    }
}

/// Join waiters in spawn order; errors carry the 0-based spawn index
pub(crate) fn join_all(handles: Vec<JoinHandle<SyncResult<()>>>) -> HarnessResult<()> {
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => return Err(HarnessError::WaiterPanicked(index)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SyncError;
    use crate::core::sync::BroadcastStrategy;

    #[test]
    fn test_every_mode_releases_all() {
        for mode in Mode::ALL {
            let harness = Harness::new(HarnessConfig::new(mode, 16)).unwrap();
            let report = harness.run().unwrap();
            assert_eq!(report.released, 16, "mode {mode}");
            assert_eq!(report.notify_calls, if mode.is_broadcast() { 1 } else { 16 });
        }
    }

    #[test]
    fn test_close_broadcast_mode() {
        let config = HarnessConfig::new(Mode::ChannelBroadcast, 16)
            .with_channel_broadcast(BroadcastStrategy::Close);
        let report = Harness::new(config).unwrap().run().unwrap();
        assert_eq!(report.primitive, "channel-close");
        assert_eq!(report.released, 16);
    }

    #[test]
    fn test_failed_waiter_reported_instead_of_hanging() {
        let completed = Arc::new(ArrivalGate::new());

        let handles: Vec<JoinHandle<SyncResult<()>>> = (0..3)
            .map(|index| {
                let completed = Arc::clone(&completed);
                thread::spawn(move || {
                    let _done = completed.arrive_on_drop();
                    match index {
                        1 => panic!("waiter {index} failed"),
                        2 => Err(SyncError::Closed),
                        _ => Ok(()),
                    }
                })
            })
            .collect();

        completed.wait_for(3);
        assert!(matches!(
            join_all(handles),
            Err(HarnessError::WaiterPanicked(1))
        ));
    }

    #[test]
    fn test_waiter_error_propagates() {
        let handles: Vec<JoinHandle<SyncResult<()>>> = vec![
            thread::spawn(|| Ok(())),
            thread::spawn(|| Err(SyncError::AlreadyClosed)),
        ];
        assert!(matches!(
            join_all(handles),
            Err(HarnessError::Sync(SyncError::AlreadyClosed))
        ));
    }

    #[test]
    fn test_zero_waiters() {
        let report = Harness::new(HarnessConfig::new(Mode::CondSignal, 0))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.released, 0);
        assert_eq!(report.notify_calls, 0);
        assert_eq!(report.release_per_waiter(), Duration::ZERO);
    }

    #[test]
    fn test_report_serializes_micros() {
        let report = Harness::new(HarnessConfig::new(Mode::CondBroadcast, 2))
            .unwrap()
            .run()
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "cond-broadcast");
        assert_eq!(json["released"], 2);
        assert!(json["release_us"].is_u64());
    }
}
