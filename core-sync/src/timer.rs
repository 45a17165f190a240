//! Timer-driven auto-reset events.
//!
//! A [`TimerEvent`] couples an auto-reset wait handle with a timer scheduled
//! through an injected [`TimerService`]: each expiry signals the handle,
//! releasing one waiter or latching a single pending tick. Repeating timers
//! re-arm themselves after every firing until stopped.
//!
//! The timer lifecycle is `Idle → Armed → (Fired → Armed if repeating |
//! Fired → Idle otherwise) → Stopped`. `Stopped` is terminal: once
//! [`TimerEvent::stop`] runs, no timer-driven signal can occur again.
//!
//! Ticks coalesce. The embedded handle remembers at most one undelivered
//! firing, so a fast timer with a slow consumer collapses the excess: a
//! `wait()` observes "at least one tick since last wait", never a count.
//!
//! # Examples
//!
//! ```
//! use bridge_traits::timer::ManualTimers;
//! use core_sync::{TimerEvent, TimerEventOptions};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let timers = ManualTimers::new();
//! let heartbeat = TimerEvent::new(
//!     timers.clone(),
//!     TimerEventOptions::new(Duration::from_millis(100)).repeat(true),
//! )
//! .unwrap();
//!
//! heartbeat.wait().await; // resumes on the next firing
//! heartbeat.wait().await; // ...and again on the one after
//! heartbeat.stop();       // cancels the pending fire, terminal
//! # }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bridge_traits::timer::{TimerHandle, TimerService};

use crate::error::{Error, Result};
use crate::event::{ResetPolicy, WaitEvent};

/// Construction parameters for [`TimerEvent`].
///
/// # Examples
///
/// ```
/// use core_sync::TimerEventOptions;
/// use std::time::Duration;
///
/// let options = TimerEventOptions::new(Duration::from_secs(1))
///     .repeat(true)
///     .initially_set(false);
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct TimerEventOptions {
    interval: Duration,
    repeat: bool,
    initially_set: bool,
}

impl TimerEventOptions {
    /// One-shot, initially unsignaled timer with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            repeat: false,
            initially_set: false,
        }
    }

    /// Whether the timer re-arms after each firing.
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Whether the embedded handle starts out signaled.
    pub fn initially_set(mut self, initially_set: bool) -> Self {
        self.initially_set = initially_set;
        self
    }
}

struct TimerShared {
    interval: Duration,
    repeat: bool,
    armed: Option<Box<dyn TimerHandle>>,
    stopped: bool,
}

/// An auto-reset wait handle signaled by a timer.
///
/// Clones share one timer and one embedded handle. Dropping the last clone
/// cancels any pending fire, so a `TimerEvent` held in a scope cannot leak a
/// recurring callback past that scope; [`stop`](Self::stop) does the same
/// explicitly and is terminal.
pub struct TimerEvent {
    event: WaitEvent,
    shared: Rc<RefCell<TimerShared>>,
}

impl TimerEvent {
    /// Arms a timer on `timers` and returns the handle it signals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroInterval`] when `options` carries a zero
    /// interval; an interval that fires "immediately, forever" is rejected
    /// outright rather than looping the scheduler.
    pub fn new(timers: impl TimerService + 'static, options: TimerEventOptions) -> Result<Self> {
        if options.interval.is_zero() {
            return Err(Error::ZeroInterval);
        }

        let timers: Rc<dyn TimerService> = Rc::new(timers);
        let event = WaitEvent::new(ResetPolicy::Auto, options.initially_set);
        let shared = Rc::new(RefCell::new(TimerShared {
            interval: options.interval,
            repeat: options.repeat,
            armed: None,
            stopped: false,
        }));
        arm(&timers, &event, &shared);
        Ok(Self { event, shared })
    }

    /// Suspends the calling task until the next firing.
    ///
    /// Each resolved `wait()` consumes one tick; call again to block until
    /// the following firing. Firings that happened while nobody waited are
    /// coalesced into a single immediately-consumable tick.
    ///
    /// After [`stop`](Self::stop), a `wait()` that finds no leftover tick
    /// never resolves, since stopping removes the only signal source. Callers
    /// tear down waiting tasks before stopping, or signal them through
    /// [`set`](Self::set).
    pub async fn wait(&self) {
        self.event.wait().await
    }

    /// Signals the embedded handle directly, as if the timer had fired.
    pub fn set(&self) {
        self.event.set()
    }

    /// Clears a pending tick.
    pub fn reset(&self) {
        self.event.reset()
    }

    /// Snapshot of the embedded handle's signaled state.
    pub fn is_set(&self) -> bool {
        self.event.is_set()
    }

    /// Cancels any pending fire and transitions to the terminal `Stopped`
    /// state. No timer-driven signal can occur afterwards.
    ///
    /// A tick that was already latched stays consumable by one `wait()`;
    /// stopping is not a `reset()`.
    pub fn stop(&self) {
        let mut state = self.shared.borrow_mut();
        state.stopped = true;
        if let Some(mut handle) = state.armed.take() {
            handle.cancel();
        }
        tracing::debug!("timer event stopped");
    }

    /// True while a fire is scheduled (the `Armed` state).
    pub fn is_active(&self) -> bool {
        self.shared.borrow().armed.is_some()
    }

    /// True once [`stop`](Self::stop) has run.
    pub fn is_stopped(&self) -> bool {
        self.shared.borrow().stopped
    }

    /// The firing interval this timer was created with.
    pub fn interval(&self) -> Duration {
        self.shared.borrow().interval
    }

    /// Whether the timer re-arms after each firing.
    pub fn is_repeating(&self) -> bool {
        self.shared.borrow().repeat
    }
}

impl Clone for TimerEvent {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl fmt::Debug for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEvent").finish_non_exhaustive()
    }
}

fn arm(timers: &Rc<dyn TimerService>, event: &WaitEvent, shared: &Rc<RefCell<TimerShared>>) {
    let interval = shared.borrow().interval;
    let callback = {
        let timers = Rc::clone(timers);
        let event = event.clone();
        let shared = Rc::downgrade(shared);
        Box::new(move || fire(timers, event, shared))
    };
    let handle = timers.schedule(interval, callback);
    shared.borrow_mut().armed = Some(handle);
    tracing::trace!(interval_ms = interval.as_millis() as u64, "timer event armed");
}

fn fire(timers: Rc<dyn TimerService>, event: WaitEvent, shared: Weak<RefCell<TimerShared>>) {
    tracing::trace!("timer event fired");
    event.set();

    // The callback holds only a weak reference: an abandoned TimerEvent is
    // never revived by a stray firing.
    let shared = match shared.upgrade() {
        Some(shared) => shared,
        None => return,
    };
    let rearm = {
        let mut state = shared.borrow_mut();
        state.armed = None;
        state.repeat && !state.stopped
    };
    if rearm {
        arm(&timers, &event, &shared);
    }
}
