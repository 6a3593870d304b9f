/*!
 * Broadcast Demo
 *
 * A handful of threads park on one condition variable; the main thread
 * releases them with a single broadcast once every one has registered.
 * Waiters log with 1-based ids; errors carry the 0-based spawn index like
 * the harness does.
 */

use crate::core::errors::{HarnessError, HarnessResult, SyncResult};
use crate::core::sync::CondVar;
use crate::harness::{join_all, ArrivalGate};
use std::sync::Arc;
use std::thread;
use tracing::info;

/// Run the demo and return the order in which waiters resumed
pub fn run_broadcast_demo(waiters: usize) -> HarnessResult<Vec<usize>> {
    let cv = Arc::new(CondVar::new(Vec::with_capacity(waiters)));
    let registered = Arc::new(ArrivalGate::new());

    let mut handles = Vec::with_capacity(waiters);
    let mut spawn_error = None;
    for index in 0..waiters {
        let id = index + 1;
        let cv = Arc::clone(&cv);
        let registered = Arc::clone(&registered);
        let spawned = thread::Builder::new()
            .name(format!("demo-{id}"))
            .spawn(move || -> SyncResult<()> {
                let mut guard = cv.lock();
                registered.arrive();
                cv.wait(&mut guard)?;
                info!(waiter = id, "waiter resumed");
                guard.push(id);
                Ok(())
            });
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                spawn_error = Some(HarnessError::Spawn { index, source });
                break;
            }
        }
    }

    registered.wait_for(handles.len());
    {
        let mut guard = cv.lock();
        let woken = cv.broadcast(&mut guard)?;
        info!(woken = woken.count(), "broadcast");
    }

    join_all(handles)?;
    if let Some(err) = spawn_error {
        return Err(err);
    }

    let order = cv.lock().clone();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_releases_every_waiter() {
        crate::monitoring::init_test_tracing();

        let mut order = run_broadcast_demo(2).unwrap();
        assert_eq!(order.len(), 2);
        order.sort_unstable();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_demo_without_waiters() {
        assert!(run_broadcast_demo(0).unwrap().is_empty());
    }
}
