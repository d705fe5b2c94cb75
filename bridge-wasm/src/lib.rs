//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the bridge traits defined
//! in `bridge-traits`. Audio mechanics are delegated to the page's
//! `window.empiriaSoundJs*` functions; environment probing uses `web-sys`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `JsAudioBridge`: `AudioBridge` over the `empiriaSoundJs*` globals
//! - `HtmlMediaProbe`: `MediaProbe` over `HTMLAudioElement.canPlayType`
//! - `UserAgentEnvironment`: `HostEnvironment` from `navigator.userAgent`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{HtmlMediaProbe, JsAudioBridge, UserAgentEnvironment};
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .audio_bridge(Arc::new(JsAudioBridge::new()))
//!     .media_probe(Arc::new(HtmlMediaProbe::new()?))
//!     .environment(Arc::new(UserAgentEnvironment::detect()?))
//!     .build()?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod audio;
pub mod error;
pub mod probe;
pub mod wasm;

// Re-export commonly used types
pub use audio::JsAudioBridge;
pub use error::{WasmError, WasmResult};
pub use probe::{HtmlMediaProbe, UserAgentEnvironment};
