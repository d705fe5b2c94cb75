//! Thread-safety bound shared by every bridge trait.
//!
//! A native host can call into a sound context from any thread, so its
//! bridges must be `Send + Sync`. Browser bridges wrap `JsValue` handles and
//! live on the page's only thread. [`PlatformSendSync`] resolves to the right
//! bound per target so each trait is declared once.

#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> PlatformSendSync for T {}

/// No bound on `wasm32`.
#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> PlatformSendSync for T {}
