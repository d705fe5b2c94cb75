//! Runtime-agnostic async helpers for the sound dispatcher.
//!
//! The dispatcher's public API is synchronous; the only asynchronous piece is
//! the deferred start of a delayed sound. This crate hides where that deferred
//! work runs:
//! - Native platforms: Tokio runtime
//! - WebAssembly: the browser event loop via `wasm-bindgen-futures`
//!
//! # Modules
//!
//! - `task`: fire-and-forget task spawning
//! - `time`: sleeping and cancellable delays
//! - `sync`: [`CancellationToken`](sync::CancellationToken)
//! - `runtime`: runtime detection and `block_on`
//!
//! # Examples
//!
//! ```rust,no_run
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep_unless_cancelled, Duration};
//!
//! async fn example(token: CancellationToken) {
//!     if sleep_unless_cancelled(Duration::from_millis(250), &token).await {
//!         // delay elapsed without cancellation
//!     }
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

// WASM-specific implementations
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use task::spawn_detached;
pub use time::{sleep, Duration};
