//! Timer substrate.
//!
//! Provides the injectable scheduling facility the wait handles are built on:
//! fire a callback once after a delay, with cancellation. Implementations
//! must run the callback from a fresh scheduler turn, never inline from
//! [`TimerService::schedule`], so a firing can never reenter caller state
//! that is still being mutated.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::time::Clock;

/// A scheduled one-shot callback.
pub type TimerCallback = Box<dyn FnOnce()>;

/// One-shot timer scheduling trait.
///
/// The returned [`TimerHandle`] cancels the pending fire when dropped, which
/// gives callers scoped teardown for free: hold the handle for as long as the
/// firing is wanted.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::timer::{TimerHandle, TimerService};
/// use std::time::Duration;
///
/// fn ring_later(timers: &dyn TimerService) -> Box<dyn TimerHandle> {
///     // Hold the returned handle for as long as the firing is wanted;
///     // dropping it before the 250ms elapse cancels the fire.
///     timers.schedule(Duration::from_millis(250), Box::new(|| {
///         println!("ding");
///     }))
/// }
/// ```
pub trait TimerService {
    /// Schedules `callback` to run once, `after` from now.
    ///
    /// The callback runs on a later scheduler turn. Dropping the returned
    /// handle cancels the fire if it has not happened yet.
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Box<dyn TimerHandle>;
}

/// Cancellation handle for a scheduled callback.
///
/// Dropping the handle has the same effect as calling [`cancel`](Self::cancel).
/// Cancelling after the callback has already fired is a no-op.
pub trait TimerHandle {
    /// Cancels the pending fire.
    fn cancel(&mut self);
}

struct ManualEntry {
    id: u64,
    due_millis: u64,
    callback: TimerCallback,
}

struct ManualState {
    now_millis: u64,
    next_id: u64,
    entries: Vec<ManualEntry>,
}

/// Deterministic timer service driven by an explicit virtual clock.
///
/// Scheduled callbacks fire only when [`advance`](Self::advance) moves the
/// virtual clock past their deadline, in deadline order (insertion order
/// breaks ties). A callback may schedule further timers; those fire within
/// the same `advance` call if their deadline falls inside it. This is the
/// mock-clock half of the timer substrate: tests drive time by hand and get
/// exact, repeatable firing sequences.
///
/// Also implements [`Clock`], reporting the virtual time; during a callback
/// the clock reads the deadline that fired.
///
/// # Example
///
/// ```
/// use bridge_traits::timer::{ManualTimers, TimerService};
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let timers = ManualTimers::new();
/// let fired = Rc::new(Cell::new(false));
///
/// let flag = fired.clone();
/// let _handle = timers.schedule(Duration::from_millis(100), Box::new(move || {
///     flag.set(true);
/// }));
///
/// timers.advance(Duration::from_millis(99));
/// assert!(!fired.get());
///
/// timers.advance(Duration::from_millis(1));
/// assert!(fired.get());
/// ```
#[derive(Clone)]
pub struct ManualTimers {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTimers {
    /// Creates a timer service with the virtual clock at zero and no entries.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                now_millis: 0,
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Advances the virtual clock by `by`, firing every due callback.
    ///
    /// Callbacks run outside the internal borrow, so they may schedule or
    /// cancel timers freely; a newly scheduled timer whose deadline falls
    /// within the advanced window fires in this same call.
    pub fn advance(&self, by: Duration) {
        let target = {
            let state = self.state.borrow();
            state.now_millis + by.as_millis() as u64
        };

        loop {
            let fired = {
                let mut state = self.state.borrow_mut();
                let next = state
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due_millis <= target)
                    .min_by_key(|(_, entry)| (entry.due_millis, entry.id))
                    .map(|(index, _)| index);
                match next {
                    Some(index) => {
                        let entry = state.entries.remove(index);
                        if entry.due_millis > state.now_millis {
                            state.now_millis = entry.due_millis;
                        }
                        Some(entry)
                    }
                    None => None,
                }
            };

            match fired {
                Some(entry) => {
                    tracing::trace!(id = entry.id, due_millis = entry.due_millis, "manual timer fired");
                    (entry.callback)();
                }
                None => break,
            }
        }

        self.state.borrow_mut().now_millis = target;
    }

    /// Number of scheduled entries that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.state.borrow().entries.len()
    }
}

impl Default for ManualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for ManualTimers {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Box<dyn TimerHandle> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due_millis = state.now_millis + after.as_millis() as u64;
        state.entries.push(ManualEntry {
            id,
            due_millis,
            callback,
        });
        Box::new(ManualTimerHandle {
            id,
            state: Rc::downgrade(&self.state),
            cancelled: false,
        })
    }
}

impl Clock for ManualTimers {
    fn now_millis(&self) -> u64 {
        self.state.borrow().now_millis
    }
}

struct ManualTimerHandle {
    id: u64,
    state: Weak<RefCell<ManualState>>,
    cancelled: bool,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Some(state) = self.state.upgrade() {
            let mut state = state.borrow_mut();
            state.entries.retain(|entry| entry.id != self.id);
        }
    }
}

impl Drop for ManualTimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_deadline_order() {
        let timers = ManualTimers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut handles = Vec::new();
        for (label, delay) in [("slow", 300), ("fast", 100), ("mid", 200)] {
            let order = order.clone();
            handles.push(timers.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(label)),
            ));
        }

        timers.advance(Duration::from_millis(300));
        assert_eq!(*order.borrow(), vec!["fast", "mid", "slow"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn equal_deadlines_fire_in_insertion_order() {
        let timers = ManualTimers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut handles = Vec::new();
        for label in ["first", "second", "third"] {
            let order = order.clone();
            handles.push(timers.schedule(
                Duration::from_millis(50),
                Box::new(move || order.borrow_mut().push(label)),
            ));
        }

        timers.advance(Duration::from_millis(50));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn partial_advance_does_not_fire() {
        let timers = ManualTimers::new();
        let fired = Rc::new(std::cell::Cell::new(false));

        let flag = fired.clone();
        let _handle = timers.schedule(
            Duration::from_millis(100),
            Box::new(move || flag.set(true)),
        );

        timers.advance(Duration::from_millis(60));
        assert!(!fired.get());
        timers.advance(Duration::from_millis(39));
        assert!(!fired.get());
        timers.advance(Duration::from_millis(1));
        assert!(fired.get());
    }

    #[test]
    fn cancel_prevents_fire() {
        let timers = ManualTimers::new();
        let fired = Rc::new(std::cell::Cell::new(false));

        let flag = fired.clone();
        let mut handle = timers.schedule(
            Duration::from_millis(100),
            Box::new(move || flag.set(true)),
        );

        handle.cancel();
        assert_eq!(timers.pending(), 0);
        timers.advance(Duration::from_millis(500));
        assert!(!fired.get());
    }

    #[test]
    fn dropping_handle_cancels() {
        let timers = ManualTimers::new();
        let fired = Rc::new(std::cell::Cell::new(false));

        {
            let flag = fired.clone();
            let _handle = timers.schedule(
                Duration::from_millis(100),
                Box::new(move || flag.set(true)),
            );
        }

        assert_eq!(timers.pending(), 0);
        timers.advance(Duration::from_millis(500));
        assert!(!fired.get());
    }

    #[test]
    fn callback_may_schedule_within_same_advance() {
        let timers = ManualTimers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        // Keep the chained handle alive past the callback's own scope.
        let parked: Rc<RefCell<Vec<Box<dyn TimerHandle>>>> = Rc::new(RefCell::new(Vec::new()));

        let inner_order = order.clone();
        let inner_timers = timers.clone();
        let inner_parked = parked.clone();
        let _handle = timers.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                inner_order.borrow_mut().push("outer");
                let chained_order = inner_order.clone();
                let handle = inner_timers.schedule(
                    Duration::from_millis(50),
                    Box::new(move || chained_order.borrow_mut().push("inner")),
                );
                inner_parked.borrow_mut().push(handle);
            }),
        );

        timers.advance(Duration::from_millis(200));
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn virtual_clock_tracks_advance() {
        let timers = ManualTimers::new();
        assert_eq!(timers.now_millis(), 0);

        timers.advance(Duration::from_millis(120));
        assert_eq!(timers.now_millis(), 120);

        let clock_at_fire = Rc::new(std::cell::Cell::new(0));
        let observed = clock_at_fire.clone();
        let observer = timers.clone();
        let _handle = timers.schedule(
            Duration::from_millis(80),
            Box::new(move || observed.set(observer.now_millis())),
        );

        timers.advance(Duration::from_millis(300));
        assert_eq!(clock_at_fire.get(), 200);
        assert_eq!(timers.now_millis(), 420);
    }
}
