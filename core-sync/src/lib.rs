//! Wait-handle synchronization primitives for cooperative async tasks.
//!
//! This crate provides a small family of OS-style wait handles adapted to a
//! single-threaded, non-blocking execution model:
//!
//! - [`ManualResetEvent`]: once signaled, stays signaled and releases every
//!   waiter until explicitly reset
//! - [`AutoResetEvent`]: signaling releases exactly one waiter, then the
//!   handle reverts to unsignaled on its own
//! - [`TimerEvent`]: an auto-reset handle signaled by a recurring or
//!   one-shot timer
//!
//! # Architecture
//!
//! Tasks suspend by awaiting [`wait()`](event::WaitEvent::wait) and are
//! resumed through their stored `Waker` when another task (or a timer
//! firing) calls `set()`. Everything is single-threaded cooperative: handles
//! are `Rc`-shared and `!Send`, so no locking is needed. The timer facility is never
//! ambient: [`TimerEvent`] and the [`delay`](time::delay) utility receive a
//! [`TimerService`](bridge_traits::timer::TimerService) explicitly, so tests
//! drive time with a virtual clock while production code uses the platform
//! service ([`TokioTimers`](time::TokioTimers) on native,
//! `BrowserTimers` on WebAssembly).
//!
//! # Modules
//!
//! - `event`: the wait-handle core and its concrete manual/auto variants
//! - `timer`: timer-driven auto-reset events
//! - `time`: platform timer services, `delay`, and the `timeout` combinator
//! - `task`: task spawning helpers for the local executor
//! - `runtime`: `block_on` entry point driving a current-thread executor
//!
//! # Examples
//!
//! ```
//! use core_sync::AutoResetEvent;
//!
//! # async fn example() {
//! let gate = AutoResetEvent::new(false);
//!
//! let signal = gate.clone();
//! core_sync::task::spawn(async move {
//!     // ... produce something ...
//!     signal.set();
//! });
//!
//! gate.wait().await; // resumes after the producer signals
//! # }
//! ```

pub mod error;
pub mod event;
pub mod runtime;
pub mod task;
pub mod time;
pub mod timer;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use event::{AutoResetEvent, ManualResetEvent, ResetPolicy, WaitEvent};
pub use time::{delay, timeout, Duration, TimeoutError};
pub use timer::{TimerEvent, TimerEventOptions};
