//! # Host Bridge Traits
//!
//! Substrate traits the wait-handle crates require from their host
//! environment.
//!
//! ## Overview
//!
//! The wait handles in `core-sync` never talk to a timer facility directly.
//! Instead they receive an implementation of the traits defined here, so the
//! same primitives run against the Tokio timer wheel on desktop, against
//! `setTimeout` in the browser, or against a virtual clock in tests. Task
//! suspension and resumption need no bridge of their own: they ride on the
//! language-level `Future`/`Waker` contract.
//!
//! ## Traits
//!
//! - [`TimerService`](timer::TimerService) - Schedule a one-shot callback after a delay, with cancellation
//! - [`TimerHandle`](timer::TimerHandle) - Cancellation handle for a scheduled callback
//! - [`Clock`](time::Clock) - Monotonic time source for deterministic testing
//!
//! ## Provided implementations
//!
//! - [`SystemClock`](time::SystemClock) - Real monotonic clock
//! - [`ManualTimers`](timer::ManualTimers) - Virtual clock plus ordered
//!   callback queue, driven explicitly by `advance()`; the workhorse of the
//!   deterministic timing tests in `core-sync`
//!
//! ## Threading
//!
//! Everything here targets a single-threaded cooperative execution model, so
//! none of the traits carry `Send`/`Sync` bounds and implementations are free
//! to use `Rc`/`RefCell` internally.

pub mod time;
pub mod timer;

// Re-export commonly used types
pub use time::{Clock, SystemClock};
pub use timer::{ManualTimers, TimerCallback, TimerHandle, TimerService};
