//! Workspace placeholder crate.
//!
//! Exposes the playback facade behind feature flags so host applications can
//! depend on `soundjs-workspace` and pick a host flavour (`native-shims` or
//! `wasm`) without wiring each crate individually.

#[cfg(any(feature = "native-shims", feature = "wasm"))]
pub use bridge_traits as bridge;
#[cfg(any(feature = "native-shims", feature = "wasm"))]
pub use core_playback as playback;
#[cfg(any(feature = "native-shims", feature = "wasm"))]
pub use core_runtime as runtime;

#[cfg(any(feature = "native-shims", feature = "wasm"))]
pub use core_playback::{PlayOptions, SoundContext, SoundError, SoundInstance};
