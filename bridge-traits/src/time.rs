//! Monotonic time source.
//!
//! Abstracts elapsed-time measurement to enable deterministic testing: real
//! code reads [`SystemClock`], tests read the virtual clock side of
//! [`ManualTimers`](crate::timer::ManualTimers).

/// Monotonic time source trait.
///
/// The origin is arbitrary; only differences between readings are meaningful.
/// Readings never decrease.
///
/// # Example
///
/// ```
/// use bridge_traits::time::{Clock, SystemClock};
///
/// fn measure(clock: &dyn Clock) -> u64 {
///     let start = clock.now_millis();
///     // ... do work ...
///     clock.now_millis() - start
/// }
///
/// let _elapsed = measure(&SystemClock);
/// ```
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    fn now_millis(&self) -> u64;
}

/// System clock implementation using actual monotonic time.
///
/// On native targets this measures against a process-wide origin captured on
/// first use; on WebAssembly it reads `performance.now()`.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        use std::sync::OnceLock;
        use std::time::Instant;

        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        ORIGIN.get_or_init(Instant::now).elapsed().as_millis() as u64
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        let window = web_sys::window().expect("no global window");
        let performance = window
            .performance()
            .expect("performance API not available");
        performance.now() as u64
    }
}
