//! # Sound Dispatch Module
//!
//! Selects one audio backend for the session and forwards playback calls to
//! the host through it.
//!
//! ## Overview
//!
//! This module handles:
//! - Capability probing per backend (formats, panning, volume, channels)
//! - Source negotiation over `|`-delimited format alternatives
//! - Symbolic ids registered at preload time
//! - Sound instances with delayed, cancellable starts and interrupt policies
//! - Bulk pause/resume/stop and host event routing
//!
//! The host does the actual audio work through
//! [`bridge_traits::AudioBridge`]; see `bridge-native` and `bridge-wasm`.

pub mod backend;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod instance;
pub mod preload;
pub mod registry;
pub mod source;
pub mod tracker;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use backend::{AudioBackend, Backend, BackendKind};
pub use capabilities::{CapabilitySet, CapabilityValue};
pub use config::SoundConfig;
pub use context::{SoundContext, SoundEvent};
pub use error::{ErrorKind, Result, SoundError};
pub use instance::{InterruptMode, PlayOptions, PlayState, SoundCallback, SoundInstance, LOOP_FOREVER};
pub use preload::{PreloadHandle, PreloadHandlers, PreloadProgress};
pub use registry::IdRegistry;
pub use source::{resolve_source, SourceDescriptor};
pub use tracker::InstanceTracker;
