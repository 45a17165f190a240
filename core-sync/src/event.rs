//! Event wait handles.
//!
//! An event wait handle holds a binary signaled/unsignaled condition plus a
//! FIFO queue of suspended waiters. Tasks suspend on [`WaitEvent::wait`] and
//! are released by [`WaitEvent::set`] according to the handle's
//! [`ResetPolicy`]:
//!
//! - `Manual`: `set()` releases **all** queued waiters and the handle stays
//!   signaled until an explicit `reset()`
//! - `Auto`: `set()` releases exactly the head of the queue and the handle
//!   reverts to unsignaled on its own; with no waiter queued the signal is
//!   latched for the next `wait()` to consume without suspending
//!
//! Waiters are released in strict enqueue order. Releasing only marks the
//! waiter and wakes its task; the task actually resumes on a later turn of
//! the scheduler, never inline from `set()`, so the queue is never mutated
//! reentrantly while it drains.
//!
//! Handles are cheap `Rc`-backed clones of one shared state: any task
//! holding a clone may call any operation. Everything is single-threaded
//! cooperative, so state transitions are atomic with respect to other
//! coordination calls without locks.
//!
//! # Examples
//!
//! ```
//! use core_sync::ManualResetEvent;
//!
//! # async fn example() {
//! let ready = ManualResetEvent::new(false);
//!
//! let waiter = ready.clone();
//! core_sync::task::spawn(async move {
//!     waiter.wait().await;
//!     // ... runs once `ready` is signaled ...
//! });
//!
//! ready.set(); // releases every waiter, stays signaled
//! # }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Release policy applied when a wait handle is signaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Release every queued waiter; the handle stays signaled until an
    /// explicit `reset()`.
    Manual,
    /// Release exactly one queued waiter and revert to unsignaled; with no
    /// waiter queued, latch the signal for the next `wait()`.
    Auto,
}

/// One queued waiter: the resumption capability of a suspended task.
///
/// Owned by the queue from enqueue until released or cancelled; the waiting
/// future holds a second `Rc` so it can observe release and deregister on
/// drop.
struct WaiterSlot {
    released: Cell<bool>,
    waker: RefCell<Waker>,
}

struct EventState {
    signaled: bool,
    waiters: VecDeque<Rc<WaiterSlot>>,
}

struct EventInner {
    policy: ResetPolicy,
    state: RefCell<EventState>,
}

/// An event wait handle parameterized by its reset policy.
///
/// This is the concrete core behind [`ManualResetEvent`] and
/// [`AutoResetEvent`]; use those wrappers unless the policy is itself a
/// runtime parameter.
#[derive(Clone)]
pub struct WaitEvent {
    inner: Rc<EventInner>,
}

impl WaitEvent {
    /// Creates a handle with the given policy and initial signaled state.
    pub fn new(policy: ResetPolicy, initially_set: bool) -> Self {
        Self {
            inner: Rc::new(EventInner {
                policy,
                state: RefCell::new(EventState {
                    signaled: initially_set,
                    waiters: VecDeque::new(),
                }),
            }),
        }
    }

    /// Returns the reset policy this handle was created with.
    pub fn policy(&self) -> ResetPolicy {
        self.inner.policy
    }

    /// Signals the handle, releasing waiters per its reset policy.
    ///
    /// Released tasks resume on a later scheduler turn, in enqueue order.
    pub fn set(&self) {
        let mut state = self.inner.state.borrow_mut();
        let mut to_wake = Vec::new();
        match self.inner.policy {
            ResetPolicy::Auto => {
                if let Some(slot) = state.waiters.pop_front() {
                    // Self-consuming signal: the head waiter absorbs it and
                    // the handle stays unsignaled.
                    slot.released.set(true);
                    to_wake.push(slot.waker.borrow().clone());
                } else {
                    state.signaled = true;
                }
            }
            ResetPolicy::Manual => {
                state.signaled = true;
                let drained = std::mem::take(&mut state.waiters);
                for slot in drained {
                    slot.released.set(true);
                    to_wake.push(slot.waker.borrow().clone());
                }
            }
        }
        // Drop borrow before waking
        drop(state);
        tracing::trace!(
            policy = ?self.inner.policy,
            released = to_wake.len(),
            "wait handle signaled"
        );
        for waker in to_wake {
            waker.wake();
        }
    }

    /// Clears the signaled state.
    ///
    /// Has no effect on waiters that were already released. Legal (and a
    /// no-op in practice) on auto-reset handles, whose state self-resets.
    pub fn reset(&self) {
        self.inner.state.borrow_mut().signaled = false;
    }

    /// Snapshot of the signaled state.
    ///
    /// Purely observational: between this check and a subsequent `wait()`
    /// another task may consume or change the signal, so it is not a
    /// substitute for `wait()`.
    pub fn is_set(&self) -> bool {
        self.inner.state.borrow().signaled
    }

    /// Suspends the calling task until the handle is signaled.
    ///
    /// Resolves immediately if the handle is already signaled (consuming the
    /// signal when the policy is `Auto`). Never fails; there is no timeout
    /// at this layer. Compose one externally with
    /// [`time::timeout`](crate::time::timeout).
    pub async fn wait(&self) {
        WaitFuture {
            event: self,
            slot: None,
        }
        .await
    }

    /// Releases one queued waiter or latches the signal, for auto-reset
    /// redelivery. Callers must not hold the state borrow.
    fn redeliver(&self) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(slot) = state.waiters.pop_front() {
            slot.released.set(true);
            let waker = slot.waker.borrow().clone();
            drop(state);
            waker.wake();
        } else {
            state.signaled = true;
        }
    }
}

impl fmt::Debug for WaitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitEvent").finish_non_exhaustive()
    }
}

/// Future returned by [`WaitEvent::wait`].
struct WaitFuture<'a> {
    event: &'a WaitEvent,
    slot: Option<Rc<WaiterSlot>>,
}

impl Future for WaitFuture<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(slot) = self.slot.take() {
            if slot.released.get() {
                return Poll::Ready(());
            }
            {
                let mut waker = slot.waker.borrow_mut();
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }
            }
            self.slot = Some(slot);
            return Poll::Pending;
        }

        let mut state = self.event.inner.state.borrow_mut();
        if state.signaled {
            if self.event.inner.policy == ResetPolicy::Auto {
                state.signaled = false;
            }
            return Poll::Ready(());
        }

        let slot = Rc::new(WaiterSlot {
            released: Cell::new(false),
            waker: RefCell::new(cx.waker().clone()),
        });
        state.waiters.push_back(slot.clone());
        drop(state);
        self.slot = Some(slot);
        Poll::Pending
    }
}

impl Drop for WaitFuture<'_> {
    fn drop(&mut self) {
        let slot = match self.slot.take() {
            Some(slot) => slot,
            None => return,
        };
        let inner = &self.event.inner;
        {
            let mut state = inner.state.borrow_mut();
            if let Some(position) = state
                .waiters
                .iter()
                .position(|queued| Rc::ptr_eq(queued, &slot))
            {
                // Still queued: cancellation just deregisters the waiter.
                state.waiters.remove(position);
                return;
            }
        }
        // Released but never consumed. An auto-reset signal is one-shot, so
        // hand it to the next waiter (or latch it) instead of losing it.
        if inner.policy == ResetPolicy::Auto && slot.released.get() {
            self.event.redeliver();
        }
    }
}

/// A wait handle that, once signaled, releases all waiters and stays
/// signaled until explicitly reset.
///
/// # Examples
///
/// ```
/// use core_sync::ManualResetEvent;
///
/// # async fn example() {
/// let event = ManualResetEvent::new(true);
/// event.wait().await; // already signaled: resolves immediately
/// assert!(event.is_set()); // and stays signaled
///
/// event.reset();
/// assert!(!event.is_set());
/// # }
/// ```
#[derive(Clone)]
pub struct ManualResetEvent {
    event: WaitEvent,
}

impl ManualResetEvent {
    /// Creates the handle with an explicit initial signaled state.
    pub fn new(initially_set: bool) -> Self {
        Self {
            event: WaitEvent::new(ResetPolicy::Manual, initially_set),
        }
    }

    /// Suspends the calling task until the handle is signaled.
    pub async fn wait(&self) {
        self.event.wait().await
    }

    /// Signals the handle, releasing every queued waiter in enqueue order.
    pub fn set(&self) {
        self.event.set()
    }

    /// Clears the signaled state.
    pub fn reset(&self) {
        self.event.reset()
    }

    /// Snapshot of the signaled state.
    pub fn is_set(&self) -> bool {
        self.event.is_set()
    }
}

impl Default for ManualResetEvent {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ManualResetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualResetEvent").finish_non_exhaustive()
    }
}

/// A wait handle whose signal releases exactly one waiter, then reverts to
/// unsignaled on its own.
///
/// Constructed already signaled with no waiter around, the first `wait()`
/// consumes the pending signal immediately (no suspension); every later
/// `wait()` suspends until the next `set()`.
///
/// # Examples
///
/// ```
/// use core_sync::AutoResetEvent;
///
/// # async fn example() {
/// let event = AutoResetEvent::new(true);
/// event.wait().await; // consumes the pending signal
/// assert!(!event.is_set()); // self-reset: a second wait() would suspend
/// # }
/// ```
#[derive(Clone)]
pub struct AutoResetEvent {
    event: WaitEvent,
}

impl AutoResetEvent {
    /// Creates the handle with an explicit initial signaled state.
    pub fn new(initially_set: bool) -> Self {
        Self {
            event: WaitEvent::new(ResetPolicy::Auto, initially_set),
        }
    }

    /// Suspends the calling task until a signal is delivered to it.
    pub async fn wait(&self) {
        self.event.wait().await
    }

    /// Signals the handle: releases the head waiter, or latches the signal
    /// when no waiter is queued.
    pub fn set(&self) {
        self.event.set()
    }

    /// Clears a latched signal. Usually unnecessary (the handle self-resets
    /// when a signal is consumed) but legal.
    pub fn reset(&self) {
        self.event.reset()
    }

    /// Snapshot of the signaled state.
    pub fn is_set(&self) -> bool {
        self.event.is_set()
    }
}

impl Default for AutoResetEvent {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for AutoResetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoResetEvent").finish_non_exhaustive()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::runtime::block_on;
    use crate::task;

    #[test]
    fn initial_state_matches_constructor() {
        assert!(ManualResetEvent::new(true).is_set());
        assert!(!ManualResetEvent::new(false).is_set());
        assert!(AutoResetEvent::new(true).is_set());
        assert!(!AutoResetEvent::new(false).is_set());
    }

    #[test]
    fn manual_set_and_reset_are_idempotent() {
        let event = ManualResetEvent::new(false);

        event.set();
        assert!(event.is_set());
        event.set();
        assert!(event.is_set());

        event.reset();
        assert!(!event.is_set());
        event.reset();
        assert!(!event.is_set());
    }

    #[test]
    fn reset_on_auto_handle_is_a_legal_noop() {
        let event = AutoResetEvent::new(false);
        event.reset();
        assert!(!event.is_set());
    }

    #[test]
    fn wait_on_signaled_manual_handle_resolves_immediately() {
        block_on(async {
            let event = ManualResetEvent::new(true);
            let wait = event.wait();
            futures::pin_mut!(wait);
            assert!(futures::poll!(wait.as_mut()).is_ready());
            // Manual-reset: the signal survives consumption.
            assert!(event.is_set());
        });
    }

    #[test]
    fn auto_handle_consumes_pending_signal_once() {
        block_on(async {
            let event = AutoResetEvent::new(true);

            let first = event.wait();
            futures::pin_mut!(first);
            assert!(futures::poll!(first.as_mut()).is_ready());
            assert!(!event.is_set());

            let second = event.wait();
            futures::pin_mut!(second);
            assert!(futures::poll!(second.as_mut()).is_pending());
        });
    }

    #[test]
    fn manual_set_releases_all_waiters_in_enqueue_order() {
        block_on(async {
            let event = ManualResetEvent::new(false);
            let order = Rc::new(RefCell::new(Vec::new()));

            let mut handles = Vec::new();
            for index in 0..4 {
                let event = event.clone();
                let order = order.clone();
                handles.push(task::spawn(async move {
                    event.wait().await;
                    order.borrow_mut().push(index);
                }));
            }

            // Let every waiter enqueue before signaling.
            for _ in 0..4 {
                task::yield_now().await;
            }
            assert!(order.borrow().is_empty());

            event.set();
            for handle in handles {
                handle.await.unwrap();
            }
            assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
        });
    }

    #[test]
    fn auto_set_releases_exactly_one_waiter_per_call() {
        block_on(async {
            let event = AutoResetEvent::new(false);
            let resumed = Rc::new(Cell::new(0usize));

            let mut handles = Vec::new();
            for _ in 0..3 {
                let event = event.clone();
                let resumed = resumed.clone();
                handles.push(task::spawn(async move {
                    event.wait().await;
                    resumed.set(resumed.get() + 1);
                }));
            }

            for _ in 0..4 {
                task::yield_now().await;
            }
            assert_eq!(resumed.get(), 0);

            for expected in 1..=3 {
                event.set();
                for _ in 0..4 {
                    task::yield_now().await;
                }
                assert_eq!(resumed.get(), expected);
                // Each signal was absorbed by a waiter, never latched.
                assert!(!event.is_set());
            }

            for handle in handles {
                handle.await.unwrap();
            }
        });
    }

    #[test]
    fn dropped_waiter_deregisters_from_queue() {
        block_on(async {
            let event = AutoResetEvent::new(false);

            {
                let mut abandoned = Box::pin(event.wait());
                assert!(futures::poll!(abandoned.as_mut()).is_pending());
            } // dropped while still queued

            let survivor = event.wait();
            futures::pin_mut!(survivor);
            assert!(futures::poll!(survivor.as_mut()).is_pending());

            // The dropped waiter is gone: this signal reaches the survivor.
            event.set();
            assert!(futures::poll!(survivor.as_mut()).is_ready());
        });
    }

    #[test]
    fn unconsumed_auto_signal_is_handed_to_next_waiter() {
        block_on(async {
            let event = AutoResetEvent::new(false);

            let mut first = Box::pin(event.wait());
            assert!(futures::poll!(first.as_mut()).is_pending());

            let second = event.wait();
            futures::pin_mut!(second);
            assert!(futures::poll!(second.as_mut()).is_pending());

            // Release the head waiter, then drop it before it consumes the
            // signal: the signal must move on, not vanish.
            event.set();
            drop(first);
            assert!(futures::poll!(second.as_mut()).is_ready());
        });
    }

    #[test]
    fn unconsumed_auto_signal_with_empty_queue_is_latched() {
        block_on(async {
            let event = AutoResetEvent::new(false);

            let mut only = Box::pin(event.wait());
            assert!(futures::poll!(only.as_mut()).is_pending());

            event.set();
            drop(only);

            // No other waiter existed, so the signal is latched again.
            assert!(event.is_set());
        });
    }
}
