//! # Core Configuration Module
//!
//! Holds the host bridges a sound context is built on.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every host collaborator the dispatcher needs. It enforces fail-fast
//! validation so a context never starts without an audio bridge unless the
//! caller explicitly asked for a headless configuration.
//!
//! ## Dependencies
//!
//! - `AudioBridge` - Required for every backend (native default: `InMemoryAudioHost`)
//! - `MediaProbe` - Required by the HTML backend (native default: `StaticMediaProbe::all_common`)
//! - `HostEnvironment` - Runtime detection (native default: `StaticEnvironment::plain`)
//!
//! When the `native-shims` feature is enabled, `bridge-native` defaults are
//! injected for anything not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .audio_bridge(Arc::new(MyHost::new()))
//!     .media_probe(Arc::new(MyProbe))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Without `native-shims`, a missing audio bridge is reported with an
//! actionable [`Error::CapabilityMissing`]:
//!
//! ```ignore
//! let err = CoreConfig::builder().build().unwrap_err();
//! assert!(matches!(err, Error::CapabilityMissing { .. }));
//! ```

use crate::error::Result;
#[cfg(not(feature = "native-shims"))]
use crate::error::Error;
use bridge_traits::{AudioBridge, HostEnvironment, MediaProbe};
use std::sync::Arc;

/// Host collaborators for a sound context.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone, Default)]
pub struct CoreConfig {
    /// Audio mechanics keyed by source path. `None` only for headless configs.
    pub audio_bridge: Option<Arc<dyn AudioBridge>>,

    /// Media-type playability query, needed by the HTML backend.
    pub media_probe: Option<Arc<dyn MediaProbe>>,

    /// Runtime detection. Absent means a plain (non-AIR, non-Android) host.
    pub environment: Option<Arc<dyn HostEnvironment>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field(
                "audio_bridge",
                &self.audio_bridge.as_ref().map(|_| "AudioBridge { ... }"),
            )
            .field(
                "media_probe",
                &self.media_probe.as_ref().map(|_| "MediaProbe { ... }"),
            )
            .field(
                "environment",
                &self.environment.as_ref().map(|_| "HostEnvironment { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Whether the host is the Adobe AIR runtime on Android.
    pub fn is_air_on_android(&self) -> bool {
        self.environment
            .as_ref()
            .map(|env| env.is_air_on_android())
            .unwrap_or(false)
    }

    /// Whether the host is the Adobe AIR runtime on any platform.
    pub fn is_adobe_air(&self) -> bool {
        self.environment
            .as_ref()
            .map(|env| env.is_adobe_air())
            .unwrap_or(false)
    }
}

#[cfg(not(feature = "native-shims"))]
fn audio_bridge_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioBridge".to_string(),
        message: "AudioBridge implementation is required for playback. \
                 Native: enable the 'native-shims' feature to use the in-memory host. \
                 Web: inject bridge_wasm::JsAudioBridge. \
                 Tests that need no audio at all: call CoreConfigBuilder::headless()."
            .to_string(),
    }
}

#[cfg(feature = "native-shims")]
fn provide_default_audio_bridge() -> Result<Arc<dyn AudioBridge>> {
    use bridge_native::InMemoryAudioHost;

    let bridge: Arc<dyn AudioBridge> = Arc::new(InMemoryAudioHost::new());
    Ok(bridge)
}

#[cfg(not(feature = "native-shims"))]
fn provide_default_audio_bridge() -> Result<Arc<dyn AudioBridge>> {
    Err(audio_bridge_missing_error())
}

#[cfg(feature = "native-shims")]
fn provide_default_media_probe() -> Option<Arc<dyn MediaProbe>> {
    use bridge_native::StaticMediaProbe;

    let probe: Arc<dyn MediaProbe> = Arc::new(StaticMediaProbe::all_common());
    Some(probe)
}

#[cfg(not(feature = "native-shims"))]
fn provide_default_media_probe() -> Option<Arc<dyn MediaProbe>> {
    None
}

#[cfg(feature = "native-shims")]
fn provide_default_environment() -> Option<Arc<dyn HostEnvironment>> {
    use bridge_native::StaticEnvironment;

    let env: Arc<dyn HostEnvironment> = Arc::new(StaticEnvironment::plain());
    Some(env)
}

#[cfg(not(feature = "native-shims"))]
fn provide_default_environment() -> Option<Arc<dyn HostEnvironment>> {
    None
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    audio_bridge: Option<Arc<dyn AudioBridge>>,
    media_probe: Option<Arc<dyn MediaProbe>>,
    environment: Option<Arc<dyn HostEnvironment>>,
    headless: bool,
}

impl CoreConfigBuilder {
    /// Sets the audio bridge implementation.
    ///
    /// If not provided, the in-memory host is used when the `native-shims`
    /// feature is enabled.
    pub fn audio_bridge(mut self, bridge: Arc<dyn AudioBridge>) -> Self {
        self.audio_bridge = Some(bridge);
        self
    }

    /// Sets the media probe used by the HTML backend.
    pub fn media_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.media_probe = Some(probe);
        self
    }

    /// Sets the host environment used for runtime detection.
    pub fn environment(mut self, environment: Arc<dyn HostEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Builds without any default bridges and without failing on a missing
    /// audio bridge. Such a context has no supported backend unless bridges
    /// are supplied explicitly.
    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when no audio bridge was injected,
    /// the `native-shims` feature is disabled, and the builder is not headless.
    pub fn build(self) -> Result<CoreConfig> {
        if self.headless {
            return Ok(CoreConfig {
                audio_bridge: self.audio_bridge,
                media_probe: self.media_probe,
                environment: self.environment,
            });
        }

        let audio_bridge = match self.audio_bridge {
            Some(bridge) => bridge,
            None => provide_default_audio_bridge()?,
        };

        let media_probe = self.media_probe.or_else(provide_default_media_probe);
        let environment = self.environment.or_else(provide_default_environment);

        Ok(CoreConfig {
            audio_bridge: Some(audio_bridge),
            media_probe,
            environment,
        })
    }
}
