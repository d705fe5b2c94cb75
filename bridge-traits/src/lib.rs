//! # Host Bridge Traits
//!
//! Contracts between the sound dispatcher and the environment that actually
//! produces audio.
//!
//! ## Overview
//!
//! The playback core never touches an audio device, a DOM `<audio>` tag, or a
//! Flash/AIR runtime directly. Every mechanic is delegated to a host that
//! implements the traits in this crate. Each trait represents a capability the
//! core requires but that differs per host (browser WebView shell, AIR
//! runtime, native test harness).
//!
//! ## Traits
//!
//! ### Audio Mechanics
//! - [`AudioBridge`](audio::AudioBridge) - init/begin/pause/resume/stop/seek keyed by source path
//!
//! ### Environment Probing
//! - [`MediaProbe`](probe::MediaProbe) - media-type playability (`canPlayType`)
//! - [`HostEnvironment`](probe::HostEnvironment) - runtime detection (Adobe AIR, Android)
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Host Implementations
//!
//! | Host     | Implementation Crate | Status |
//! |----------|----------------------|--------|
//! | Native   | `bridge-native`      | ✅ In-process reference host |
//! | Browser  | `bridge-wasm`        | ✅ `window.empiriaSoundJs*` globals |
//!
//! ## Bridge Contract
//!
//! The audio bridge is synchronous and identifies sounds by their resolved
//! source path. Once a bridge-backed backend reports itself supported, the
//! bridge is assumed present for the rest of the session. Hosts report
//! failures as [`BridgeError`](error::BridgeError); the core never panics on a
//! failed native call.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` on native targets (see
//! [`PlatformSendSync`](platform::PlatformSendSync)). On `wasm32` the bound is
//! relaxed because browser handles are single-threaded.
//!
//! ## Examples
//!
//! ### Implementing AudioBridge
//!
//! ```ignore
//! use bridge_traits::audio::AudioBridge;
//! use bridge_traits::error::Result;
//!
//! pub struct MyHost;
//!
//! impl AudioBridge for MyHost {
//!     fn init(&self, src: &str) -> Result<()> { todo!() }
//!     fn begin(&self, src: &str) -> Result<()> { todo!() }
//!     fn begin_looped(&self, src: &str) -> Result<()> { todo!() }
//!     fn pause(&self, src: &str) -> Result<()> { todo!() }
//!     fn resume(&self, src: &str) -> Result<()> { todo!() }
//!     fn stop(&self, src: &str) -> Result<()> { todo!() }
//!     fn current_time(&self, src: &str) -> Result<f64> { todo!() }
//!     fn set_current_time(&self, src: &str, seconds: f64) -> Result<()> { todo!() }
//! }
//! ```

pub mod audio;
pub mod error;
pub mod log;
pub mod platform;
pub mod probe;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::AudioBridge;
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use probe::{HostEnvironment, MediaProbe, PlayTypeSupport};
