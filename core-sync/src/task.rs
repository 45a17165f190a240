//! Task spawning helpers for the local executor.
//!
//! The wait handles are `!Send`, so tasks that share them must stay on one
//! thread:
//! - On native platforms: wraps `tokio::task::spawn_local` (requires a
//!   `LocalSet`, see [`runtime::block_on`](crate::runtime::block_on))
//! - On WASM: wraps `wasm_bindgen_futures::spawn_local` with an awaitable
//!   `JoinHandle` shim for API parity

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{yield_now, JoinError, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a task onto the current thread's `LocalSet`.
///
/// # Panics
///
/// Panics if called outside a `tokio::task::LocalSet`.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + 'static,
    F::Output: 'static,
{
    tokio::task::spawn_local(future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
use futures::channel::oneshot;
#[cfg(target_arch = "wasm32")]
use std::future::Future;
#[cfg(target_arch = "wasm32")]
use std::pin::Pin;
#[cfg(target_arch = "wasm32")]
use std::task::{Context, Poll};

#[cfg(target_arch = "wasm32")]
/// An error returned when a spawned task is dropped without completing.
#[derive(Debug, Clone)]
pub struct JoinError;

#[cfg(target_arch = "wasm32")]
impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task was cancelled")
    }
}

#[cfg(target_arch = "wasm32")]
impl std::error::Error for JoinError {}

#[cfg(target_arch = "wasm32")]
/// A handle to a spawned task that can be awaited for its result.
pub struct JoinHandle<T> {
    receiver: oneshot::Receiver<T>,
}

#[cfg(target_arch = "wasm32")]
impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(output)) => Poll::Ready(Ok(output)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(JoinError)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(target_arch = "wasm32")]
/// Spawns a task onto the browser event loop.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    let (sender, receiver) = oneshot::channel();
    wasm_bindgen_futures::spawn_local(async move {
        let output = future.await;
        let _ = sender.send(output);
    });
    JoinHandle { receiver }
}

#[cfg(target_arch = "wasm32")]
/// Cooperatively yields execution back to the event loop.
pub async fn yield_now() {
    // A 0ms timeout is the reliable way to yield to the browser event loop.
    gloo_timers::future::TimeoutFuture::new(0).await;
}
