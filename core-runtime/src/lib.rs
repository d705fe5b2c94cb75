//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the sound dispatcher:
//! - Logging and tracing infrastructure
//! - Host bridge configuration
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that `core-playback` depends on.
//! It establishes the logging conventions and the fail-fast bridge injection
//! used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
