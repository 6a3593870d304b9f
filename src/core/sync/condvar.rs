/*!
 * Condition Variable with Explicit Wait-Ticket Queue
 *
 * A condition variable that owns the mutex guarding both its wait set and the
 * caller's predicate state. Waiters are tracked as tickets in a FIFO queue
 * protected by that mutex, and threads park on their own ticket address via
 * parking_lot_core.
 *
 * # Design
 *
 * - A ticket is pushed while the guard is held and before it is released, so
 *   a signal issued by anyone who later takes the guard always finds it.
 * - Park validation re-checks the ticket under the parking bucket lock, so a
 *   release landing between unlock and park is never lost.
 * - Every signal/broadcast bumps a generation counter; a released ticket
 *   carries the generation it was released at.
 */

use super::traits::WakeResult;
use crate::core::errors::{SyncError, SyncResult};
use parking_lot::{Mutex, MutexGuard};
use parking_lot_core::{park, unpark_one, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace};

/// One blocked task's entry in the wait set
struct Ticket {
    released: AtomicBool,
    /// Generation observed when the ticket was queued
    registered_at: u64,
    /// Generation of the signal/broadcast that released it
    released_at: AtomicU64,
}

impl Ticket {
    fn new(generation: u64) -> Self {
        Self {
            released: AtomicBool::new(false),
            registered_at: generation,
            released_at: AtomicU64::new(0),
        }
    }

    #[inline]
    fn park_key(&self) -> usize {
        self as *const Ticket as usize
    }

    #[inline]
    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Park the calling thread until this ticket is released
    fn park(&self) {
        let key = self.park_key();
        while !self.is_released() {
            // SAFETY: the key is the address of a ticket kept alive by the
            // caller's Arc for the whole park. The validate callback does not
            // call into parking_lot and does not panic.
            unsafe {
                park(
                    key,
                    || !self.is_released(),
                    || {},
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    None,
                );
            }
        }
    }

    /// Hand this ticket its release token and unpark its owner
    fn release(&self, generation: u64) {
        self.released_at.store(generation, Ordering::Relaxed);
        self.released.store(true, Ordering::Release);
        // SAFETY: the key is the address of a live ticket (the wait queue's Arc
        // is held by our caller). The callback does not call into parking_lot.
        unsafe {
            unpark_one(self.park_key(), |_| DEFAULT_UNPARK_TOKEN);
        }
    }
}

/// State protected by the guard
struct State<T> {
    value: T,
    waiters: VecDeque<Arc<Ticket>>,
    generation: u64,
}

/// Condition variable bundled with the mutex it waits on
///
/// # Examples
///
/// ```
/// use rendezvous::core::sync::CondVar;
/// use std::sync::Arc;
/// use std::thread;
///
/// let cv = Arc::new(CondVar::new(false));
/// let cv_clone = cv.clone();
///
/// let handle = thread::spawn(move || {
///     let mut guard = cv_clone.lock();
///     cv_clone.wait_while(&mut guard, |ready| !*ready).unwrap();
/// });
///
/// let mut guard = cv.lock();
/// *guard = true;
/// cv.broadcast(&mut guard).unwrap();
/// drop(guard);
/// handle.join().unwrap();
/// ```
pub struct CondVar<T> {
    state: Mutex<State<T>>,
}

/// Proof that the caller holds a `CondVar`'s guard
///
/// Derefs to the protected value.
pub struct CondGuard<'a, T> {
    owner: &'a CondVar<T>,
    inner: MutexGuard<'a, State<T>>,
}

impl<T> Deref for CondGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T> DerefMut for CondGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner.value
    }
}

impl<T> CondVar<T> {
    /// Create a condition variable guarding `value`
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(State {
                value,
                waiters: VecDeque::new(),
                generation: 0,
            }),
        }
    }

    /// Acquire the guard
    pub fn lock(&self) -> CondGuard<'_, T> {
        CondGuard {
            owner: self,
            inner: self.state.lock(),
        }
    }

    /// Consume and return the protected value
    pub fn into_inner(self) -> T {
        self.state.into_inner().value
    }

    #[inline]
    fn check_owner(&self, guard: &CondGuard<'_, T>, op: &'static str) -> SyncResult<()> {
        if std::ptr::eq(guard.owner, self) {
            Ok(())
        } else {
            error!(op, "guard belongs to a different condition variable");
            Err(SyncError::ForeignGuard)
        }
    }

    /// Release the guard, block until signalled, re-acquire the guard
    ///
    /// Registration happens before the guard is released, so no signal
    /// issued under the guard afterwards can be missed. A release says only
    /// "re-check"; callers loop on their own predicate (see [`wait_while`]).
    ///
    /// [`wait_while`]: CondVar::wait_while
    pub fn wait(&self, guard: &mut CondGuard<'_, T>) -> SyncResult<()> {
        self.check_owner(guard, "wait")?;

        let ticket = Arc::new(Ticket::new(guard.inner.generation));
        guard.inner.waiters.push_back(Arc::clone(&ticket));
        trace!(
            waiters = guard.inner.waiters.len(),
            generation = ticket.registered_at,
            "waiter registered"
        );

        MutexGuard::unlocked(&mut guard.inner, || ticket.park());

        debug_assert!(ticket.released_at.load(Ordering::Relaxed) > ticket.registered_at);
        debug_assert!(guard.inner.generation >= ticket.released_at.load(Ordering::Relaxed));
        Ok(())
    }

    /// Wait until `condition` returns false
    ///
    /// The condition is checked before the first wait and after each wake.
    pub fn wait_while<F>(&self, guard: &mut CondGuard<'_, T>, mut condition: F) -> SyncResult<()>
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut guard.inner.value) {
            self.wait(guard)?;
        }
        Ok(())
    }

    /// Wake the longest-waiting task, if any
    ///
    /// Never blocks. With no waiters this is a no-op and nothing is
    /// remembered for a later `wait`.
    pub fn signal(&self, guard: &mut CondGuard<'_, T>) -> SyncResult<WakeResult> {
        self.check_owner(guard, "signal")?;

        let state = &mut *guard.inner;
        state.generation += 1;
        match state.waiters.pop_front() {
            Some(ticket) => {
                ticket.release(state.generation);
                trace!(
                    generation = state.generation,
                    remaining = state.waiters.len(),
                    "signalled one waiter"
                );
                Ok(WakeResult::Woken(1))
            }
            None => Ok(WakeResult::NoWaiters),
        }
    }

    /// Wake every task currently waiting
    ///
    /// Woken tasks re-acquire the guard one at a time.
    pub fn broadcast(&self, guard: &mut CondGuard<'_, T>) -> SyncResult<WakeResult> {
        self.check_owner(guard, "broadcast")?;

        let state = &mut *guard.inner;
        state.generation += 1;
        let count = state.waiters.len();
        for ticket in state.waiters.drain(..) {
            ticket.release(state.generation);
        }
        trace!(generation = state.generation, count, "broadcast");
        Ok(WakeResult::from_count(count))
    }

    /// Number of tasks currently in the wait set
    pub fn waiter_count(&self, guard: &CondGuard<'_, T>) -> SyncResult<usize> {
        self.check_owner(guard, "waiter_count")?;
        Ok(guard.inner.waiters.len())
    }

    /// Number of signal/broadcast calls so far
    pub fn generation(&self, guard: &CondGuard<'_, T>) -> SyncResult<u64> {
        self.check_owner(guard, "generation")?;
        Ok(guard.inner.generation)
    }
}

impl<T: Default> Default for CondVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    /// Spin until `n` waiters are queued
    fn await_waiters<T>(cv: &CondVar<T>, n: usize) {
        loop {
            let guard = cv.lock();
            if cv.waiter_count(&guard).unwrap() == n {
                return;
            }
            drop(guard);
            thread::yield_now();
        }
    }

    #[test]
    fn test_signal_wakes_one() {
        let cv = Arc::new(CondVar::new(()));
        let woken = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cv = cv.clone();
                let woken = woken.clone();
                thread::spawn(move || {
                    let mut guard = cv.lock();
                    cv.wait(&mut guard).unwrap();
                    woken.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        await_waiters(&cv, 3);

        let mut guard = cv.lock();
        assert_eq!(cv.signal(&mut guard).unwrap(), WakeResult::Woken(1));
        drop(guard);

        while woken.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(50));
        assert_eq!(woken.load(Ordering::SeqCst), 1);
        assert_eq!(cv.waiter_count(&cv.lock()).unwrap(), 2);

        let mut guard = cv.lock();
        assert_eq!(cv.broadcast(&mut guard).unwrap(), WakeResult::Woken(2));
        drop(guard);

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(woken.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_signal_without_waiters_is_not_banked() {
        let cv = CondVar::new(0u32);
        let mut guard = cv.lock();
        assert_eq!(cv.signal(&mut guard).unwrap(), WakeResult::NoWaiters);
        assert_eq!(cv.broadcast(&mut guard).unwrap(), WakeResult::NoWaiters);
        assert_eq!(cv.waiter_count(&guard).unwrap(), 0);
        assert_eq!(cv.generation(&guard).unwrap(), 2);
    }

    #[test]
    fn test_foreign_guard_rejected() {
        let a = CondVar::new(());
        let b = CondVar::new(());
        let mut guard = a.lock();

        assert_eq!(b.signal(&mut guard), Err(SyncError::ForeignGuard));
        assert_eq!(b.broadcast(&mut guard), Err(SyncError::ForeignGuard));
        assert_eq!(b.wait(&mut guard), Err(SyncError::ForeignGuard));
        assert_eq!(b.waiter_count(&guard), Err(SyncError::ForeignGuard));
        // Rejected calls leave the owner untouched
        assert_eq!(a.generation(&guard).unwrap(), 0);
    }

    #[test]
    fn test_signal_order_is_fifo() {
        let cv = Arc::new(CondVar::new(Vec::new()));

        let mut handles = Vec::new();
        for id in 0..4usize {
            let cv_clone = cv.clone();
            handles.push(thread::spawn(move || {
                let mut guard = cv_clone.lock();
                cv_clone.wait(&mut guard).unwrap();
                guard.push(id);
            }));
            // Queue strictly in spawn order
            await_waiters(&cv, id + 1);
        }

        for expected in 1..=4usize {
            let mut guard = cv.lock();
            cv.signal(&mut guard).unwrap();
            drop(guard);
            loop {
                if cv.lock().len() == expected {
                    break;
                }
                thread::yield_now();
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }
        let cv = Arc::try_unwrap(cv).ok().unwrap();
        assert_eq!(cv.into_inner(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_wait_while_rechecks_predicate() {
        let cv = Arc::new(CondVar::new(0u32));
        let cv_clone = cv.clone();

        let handle = thread::spawn(move || {
            let mut guard = cv_clone.lock();
            cv_clone.wait_while(&mut guard, |value| *value < 3).unwrap();
            *guard
        });

        for step in 1..=3u32 {
            await_waiters(&cv, 1);
            let mut guard = cv.lock();
            *guard = step;
            cv.signal(&mut guard).unwrap();
        }

        assert_eq!(handle.join().unwrap(), 3);
    }

    #[test]
    fn test_generation_advances_per_release() {
        let cv = Arc::new(CondVar::new(()));
        let cv_clone = cv.clone();

        let handle = thread::spawn(move || {
            let mut guard = cv_clone.lock();
            cv_clone.wait(&mut guard).unwrap();
            cv_clone.generation(&guard).unwrap()
        });

        await_waiters(&cv, 1);
        let mut guard = cv.lock();
        cv.broadcast(&mut guard).unwrap();
        drop(guard);

        assert_eq!(handle.join().unwrap(), 1);
    }
}
