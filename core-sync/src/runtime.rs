//! Runtime utilities that abstract over the underlying async executor.
//!
//! On native targets we wrap Tokio's current-thread runtime in a `LocalSet`
//! so that `!Send` futures and `spawn_local`-based timers work out of the
//! box. For WebAssembly targets a LocalPool-based fallback exists for
//! immediate futures only.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a current-thread runtime.
///
/// The future is driven inside a `tokio::task::LocalSet`, so it (and
/// anything it spawns with [`task::spawn`](crate::task::spawn)) may be
/// `!Send`, and the [`TokioTimers`](crate::time::TokioTimers) service works
/// without further setup.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_sync::runtime::block_on: failed to build Tokio runtime");
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

/// Attempts to run a future to completion on WASM.
///
/// **WASM cannot truly block.** This uses
/// `futures::executor::LocalPool::run_until`, which works for immediate
/// futures only; a future that awaits a browser timer or any other event
/// loop resource will hang. Prefer keeping code `async` end to end and
/// spawning with [`task::spawn`](crate::task::spawn).
#[cfg(target_arch = "wasm32")]
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future + 'static,
    F::Output: 'static,
{
    use futures::executor::LocalPool;

    let mut pool = LocalPool::new();
    pool.run_until(future)
}
