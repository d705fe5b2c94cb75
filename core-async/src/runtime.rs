//! Runtime utilities that abstract over the underlying async executor.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Returns `true` when tasks can be spawned from the current thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn has_runtime() -> bool {
    Handle::try_current().is_ok()
}

/// Runs `future` to completion on a throwaway current-thread runtime.
///
/// Fails only if the runtime cannot be built. Must not be called from
/// inside a runtime; check [`has_runtime`] first.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

// ============================================================================
// WASM Implementation
// ============================================================================

/// The browser event loop is always available.
#[cfg(target_arch = "wasm32")]
pub fn has_runtime() -> bool {
    true
}

#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen_futures::spawn_local;
