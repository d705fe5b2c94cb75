//! Time-related abstractions.
//!
//! - On native platforms: `tokio::time`
//! - On WASM: `gloo-timers` (browser `setTimeout`)
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     sleep(Duration::from_millis(10)).await;
//! }
//! ```

use crate::sync::CancellationToken;
use futures::future::{self, Either};

pub use std::time::Duration;

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::{sleep, Instant};

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
/// Sleeps for the specified duration using the browser's `setTimeout`.
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

// ============================================================================
// Common Utilities
// ============================================================================

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// Returns `true` when the full delay elapsed and the token is still live,
/// `false` when cancellation won the race (or happened before the call).
pub async fn sleep_unless_cancelled(duration: Duration, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }

    let sleep_fut = sleep(duration);
    let cancelled = token.cancelled();

    futures::pin_mut!(sleep_fut);
    futures::pin_mut!(cancelled);

    match future::select(sleep_fut, cancelled).await {
        Either::Left(_) => !token.is_cancelled(),
        Either::Right(_) => false,
    }
}
