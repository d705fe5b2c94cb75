//! Synchronization primitives.
//!
//! - On native platforms: `tokio_util::sync::CancellationToken` (`Send + Sync`)
//! - On WASM: a single-threaded token with the same API
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let child = token.clone();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub use tokio_util::sync::CancellationToken;

#[cfg(target_arch = "wasm32")]
pub use crate::wasm::CancellationToken;
