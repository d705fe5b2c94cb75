//! Task spawning abstractions.
//!
//! - On native platforms: `tokio::task::spawn`
//! - On WASM: `wasm_bindgen_futures::spawn_local` (single-threaded, no `Send`)
//!
//! Native spawning requires a Tokio runtime on the current thread; check
//! [`runtime::has_runtime`](crate::runtime::has_runtime) first when the caller
//! may be running outside one.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{JoinError, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a new asynchronous task on the Tokio runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a task whose result nobody awaits.
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    drop(tokio::task::spawn(future));
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
/// Spawns a task whose result nobody awaits.
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
