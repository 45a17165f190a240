//! Platform timer services and delay utilities.
//!
//! This module provides the platform-specific [`TimerService`]
//! implementations plus the standalone [`delay`] and [`timeout`] helpers:
//! - On native platforms: [`TokioTimers`], backed by `tokio::time`
//! - On WASM: `BrowserTimers`, backed by the browser's `setTimeout` via
//!   `gloo-timers`
//!
//! # Platform Differences
//!
//! ## Native (Tokio)
//! - Scheduled callbacks run as local tasks on the current thread's
//!   `LocalSet`; use [`runtime::block_on`](crate::runtime::block_on) (or an
//!   explicit `LocalSet`) to provide one
//! - Timing precision comes from Tokio's timer wheel
//!
//! ## WASM
//! - Scheduled callbacks run from the browser event loop
//! - Timing precision depends on browser throttling
//!
//! # Examples
//!
//! ```
//! use bridge_traits::timer::ManualTimers;
//! use core_sync::time::{delay, Duration};
//!
//! # async fn example() {
//! let timers = ManualTimers::new();
//! delay(&timers, Duration::from_millis(100)).await;
//! # }
//! ```

use std::fmt;

use bridge_traits::timer::{TimerCallback, TimerHandle, TimerService};

use crate::event::{ResetPolicy, WaitEvent};

pub use std::time::Duration;

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

/// Timer service backed by the Tokio timer wheel.
///
/// Each scheduled callback becomes a local task that sleeps and then runs
/// the callback; cancelling aborts the task.
///
/// # Panics
///
/// `schedule` panics if called outside a `tokio::task::LocalSet`, because
/// the callback task is `!Send`. [`runtime::block_on`](crate::runtime::block_on)
/// sets one up.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct TokioTimers;

#[cfg(not(target_arch = "wasm32"))]
impl TokioTimers {
    /// Creates the service. Stateless; clones are interchangeable.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TimerService for TokioTimers {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Box<dyn TimerHandle> {
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(after).await;
            callback();
        });
        Box::new(TokioTimerHandle { task })
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct TokioTimerHandle {
    task: tokio::task::JoinHandle<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.task.abort();
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// WASM Implementation
// ============================================================================

/// Timer service backed by the browser's `setTimeout`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct BrowserTimers;

#[cfg(target_arch = "wasm32")]
impl BrowserTimers {
    /// Creates the service. Stateless; clones are interchangeable.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl TimerService for BrowserTimers {
    fn schedule(&self, after: Duration, callback: TimerCallback) -> Box<dyn TimerHandle> {
        let millis = after.as_millis().min(u128::from(u32::MAX)) as u32;
        let timeout = gloo_timers::callback::Timeout::new(millis, move || callback());
        Box::new(BrowserTimerHandle {
            timeout: Some(timeout),
        })
    }
}

#[cfg(target_arch = "wasm32")]
struct BrowserTimerHandle {
    timeout: Option<gloo_timers::callback::Timeout>,
}

#[cfg(target_arch = "wasm32")]
impl TimerHandle for BrowserTimerHandle {
    fn cancel(&mut self) {
        if let Some(timeout) = self.timeout.take() {
            timeout.cancel();
        }
    }
}

// `gloo_timers::callback::Timeout` clears itself on drop, so no Drop impl is
// needed to cancel here.

// ============================================================================
// Common Utilities
// ============================================================================

/// Suspends the calling task for `duration`.
///
/// Arms an independent one-shot timer against a private auto-reset handle
/// and resolves when it fires; no state is shared with any
/// [`TimerEvent`](crate::timer::TimerEvent). Dropping the future before
/// expiry cancels the timer.
///
/// # Examples
///
/// ```
/// use bridge_traits::timer::ManualTimers;
/// use core_sync::time::{delay, Duration};
///
/// # async fn example() {
/// let timers = ManualTimers::new();
/// delay(&timers, Duration::from_secs(1)).await;
/// # }
/// ```
pub async fn delay(timers: &dyn TimerService, duration: Duration) {
    let event = WaitEvent::new(ResetPolicy::Auto, false);
    let signal = event.clone();
    // The handle must outlive the await: dropping it cancels the fire.
    let _armed = timers.schedule(duration, Box::new(move || signal.set()));
    event.wait().await;
}

/// Requires a future to complete before `duration` has elapsed.
///
/// If the future completes first, its output is returned; otherwise the
/// future is dropped and `Err(TimeoutError)` is returned. This is the
/// composed-externally timeout the wait handles themselves do not provide.
///
/// # Examples
///
/// ```
/// use bridge_traits::timer::ManualTimers;
/// use core_sync::time::{timeout, Duration};
///
/// # async fn example() {
/// let timers = ManualTimers::new();
/// let result = timeout(&timers, Duration::from_secs(1), async { 42 }).await;
/// assert_eq!(result, Ok(42));
/// # }
/// ```
pub async fn timeout<F>(
    timers: &dyn TimerService,
    duration: Duration,
    future: F,
) -> std::result::Result<F::Output, TimeoutError>
where
    F: std::future::Future,
{
    let expiry = delay(timers, duration);

    futures::pin_mut!(future);
    futures::pin_mut!(expiry);

    match futures::future::select(future, expiry).await {
        futures::future::Either::Left((output, _)) => Ok(output),
        futures::future::Either::Right(_) => Err(TimeoutError),
    }
}

/// Error returned when a [`timeout`] expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError;

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation timed out")
    }
}

impl std::error::Error for TimeoutError {}
