//! # Native Bridge Implementations
//!
//! In-process implementations of the host bridge traits for targets that have
//! no browser or AIR shell around them (desktop tools, servers, test suites).
//!
//! ## Overview
//!
//! - `AudioBridge` using [`InMemoryAudioHost`], which keeps a voice table per
//!   source and records every call it receives
//! - `MediaProbe` using [`StaticMediaProbe`], a fixed MIME support table
//! - `HostEnvironment` using [`StaticEnvironment`], fixed runtime flags
//!
//! The audio host produces no sound. It models the observable state of a host
//! voice (playing, paused, looping, playhead) so the dispatcher can be driven
//! and inspected deterministically.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_native::{InMemoryAudioHost, StaticMediaProbe};
//! use std::sync::Arc;
//!
//! let host = Arc::new(InMemoryAudioHost::new());
//! let probe = Arc::new(StaticMediaProbe::new().with_type("audio/mpeg"));
//! ```

mod audio;
mod probe;

pub use audio::{BridgeCall, BridgeOp, InMemoryAudioHost, VoiceState};
pub use probe::{StaticEnvironment, StaticMediaProbe};
