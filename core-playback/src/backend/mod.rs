//! # Audio Backends
//!
//! The three interchangeable playback mechanisms and the closed [`Backend`]
//! enum that dispatches to them.
//!
//! | Kind       | Supported when                               | Capabilities |
//! |------------|----------------------------------------------|--------------|
//! | `Default`  | an audio bridge is injected                  | all formats, no channel limit |
//! | `Html`     | not AIR on Android, probe finds a format     | probed formats, volume, `html_max_instances` channels |
//! | `External` | AIR on Android with an audio bridge          | all formats, panning, volume, 255 channels |
//!
//! Every backend memoizes its [`CapabilitySet`] on first use and never
//! recomputes it, even if the host environment changes afterwards.

mod default;
mod external;
mod html;

pub use default::DefaultBackend;
pub use external::ExternalBackend;
pub use html::HtmlBackend;

use crate::capabilities::CapabilitySet;
use crate::config::SoundConfig;
use crate::error::{Result, SoundError};
use crate::instance::SoundInstance;
use crate::preload::PreloadHandle;
use crate::tracker::InstanceTracker;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::AudioBridge;
use core_runtime::config::CoreConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifies a backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Default,
    Html,
    External,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Default, BackendKind::Html, BackendKind::External];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Default => "default",
            BackendKind::Html => "html",
            BackendKind::External => "external",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = SoundError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "default" => Ok(BackendKind::Default),
            "html" | "htmlaudio" => Ok(BackendKind::Html),
            "external" => Ok(BackendKind::External),
            other => Err(SoundError::Config(format!("unknown backend: {}", other))),
        }
    }
}

/// Contract shared by every playback mechanism.
pub trait AudioBackend: PlatformSendSync {
    fn kind(&self) -> BackendKind;

    /// Whether this backend can run in the current host. Memoized.
    fn is_supported(&self) -> bool;

    /// Formats and features offered. Memoized; an unsupported backend
    /// reports an empty set.
    fn capabilities(&self) -> CapabilitySet;

    /// Prepares `src` for later playback.
    ///
    /// `channels_hint` caps concurrent instances of this source, overriding
    /// the configured and backend-wide limits.
    fn register(&self, src: &str, channels_hint: Option<u32>) -> Result<PreloadHandle>;

    /// New instance bound to `src` and to this backend's tracker.
    fn create(&self, src: &str) -> Result<SoundInstance>;

    /// Live instances of this backend.
    fn tracker(&self) -> &Arc<InstanceTracker>;
}

/// Closed set of backends, selected by [`BackendKind`].
pub enum Backend {
    Default(DefaultBackend),
    Html(HtmlBackend),
    External(ExternalBackend),
}

impl Backend {
    pub fn new(kind: BackendKind, core: &CoreConfig, config: &SoundConfig) -> Self {
        match kind {
            BackendKind::Default => Backend::Default(DefaultBackend::new(core, config)),
            BackendKind::Html => Backend::Html(HtmlBackend::new(core, config)),
            BackendKind::External => Backend::External(ExternalBackend::new(core, config)),
        }
    }

    fn inner(&self) -> &dyn AudioBackend {
        match self {
            Backend::Default(backend) => backend,
            Backend::Html(backend) => backend,
            Backend::External(backend) => backend,
        }
    }
}

impl AudioBackend for Backend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn is_supported(&self) -> bool {
        self.inner().is_supported()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.inner().capabilities()
    }

    fn register(&self, src: &str, channels_hint: Option<u32>) -> Result<PreloadHandle> {
        self.inner().register(src, channels_hint)
    }

    fn create(&self, src: &str) -> Result<SoundInstance> {
        self.inner().create(src)
    }

    fn tracker(&self) -> &Arc<InstanceTracker> {
        self.inner().tracker()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind())
            .field("live_instances", &self.tracker().len())
            .finish()
    }
}

/// State every backend carries: the bridge, the live-instance tracker, and
/// channel limits.
pub(crate) struct BackendCore {
    bridge: Option<Arc<dyn AudioBridge>>,
    tracker: Arc<InstanceTracker>,
    channel_override: Option<u32>,
    source_limits: RwLock<HashMap<String, u32>>,
}

impl BackendCore {
    pub(crate) fn new(core: &CoreConfig, config: &SoundConfig) -> Self {
        Self {
            bridge: core.audio_bridge.clone(),
            tracker: Arc::new(InstanceTracker::new()),
            channel_override: config.max_channels_per_source,
            source_limits: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    pub(crate) fn bridge(&self) -> Result<&Arc<dyn AudioBridge>> {
        self.bridge
            .as_ref()
            .ok_or_else(|| SoundError::Unsupported("no audio bridge injected".to_string()))
    }

    pub(crate) fn tracker(&self) -> &Arc<InstanceTracker> {
        &self.tracker
    }

    pub(crate) fn remember_limit(&self, src: &str, channels_hint: Option<u32>) {
        if let Some(limit) = channels_hint.filter(|limit| *limit > 0) {
            self.source_limits.write().insert(src.to_string(), limit);
        }
    }

    /// Per-source hint, then configured override, then the backend's own count.
    pub(crate) fn channel_limit(&self, src: &str, capabilities: &CapabilitySet) -> Option<u32> {
        self.source_limits
            .read()
            .get(src)
            .copied()
            .or(self.channel_override)
            .or(capabilities.channels)
    }

    pub(crate) fn create(&self, src: &str, capabilities: CapabilitySet) -> Result<SoundInstance> {
        if src.is_empty() {
            return Err(SoundError::InvalidSource(String::new()));
        }
        let bridge = self.bridge()?.clone();
        let limit = self.channel_limit(src, &capabilities);
        Ok(SoundInstance::new(
            src,
            bridge,
            self.tracker.clone(),
            capabilities,
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_native::{InMemoryAudioHost, StaticEnvironment, StaticMediaProbe};

    fn core(env: StaticEnvironment, probe: StaticMediaProbe) -> CoreConfig {
        CoreConfig::builder()
            .audio_bridge(Arc::new(InMemoryAudioHost::new()))
            .media_probe(Arc::new(probe))
            .environment(Arc::new(env))
            .build()
            .unwrap()
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("HTML".parse::<BackendKind>().unwrap(), BackendKind::Html);
        assert_eq!("external".parse::<BackendKind>().unwrap(), BackendKind::External);
        assert!("flash".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Default.to_string(), "default");
    }

    #[test]
    fn enum_dispatches_to_variant() {
        let core = core(StaticEnvironment::plain(), StaticMediaProbe::all_common());
        let config = SoundConfig::default();

        for kind in BackendKind::ALL {
            let backend = Backend::new(kind, &core, &config);
            assert_eq!(backend.kind(), kind);
        }

        assert!(Backend::new(BackendKind::Default, &core, &config).is_supported());
        assert!(Backend::new(BackendKind::Html, &core, &config).is_supported());
        assert!(!Backend::new(BackendKind::External, &core, &config).is_supported());
    }

    #[test]
    fn channel_limit_precedence() {
        let core = core(StaticEnvironment::plain(), StaticMediaProbe::all_common());
        let mut config = SoundConfig::default();
        let caps = CapabilitySet {
            channels: Some(30),
            ..CapabilitySet::all_formats()
        };

        let backend = BackendCore::new(&core, &config);
        assert_eq!(backend.channel_limit("a.mp3", &caps), Some(30));

        config.max_channels_per_source = Some(4);
        let backend = BackendCore::new(&core, &config);
        assert_eq!(backend.channel_limit("a.mp3", &caps), Some(4));

        backend.remember_limit("a.mp3", Some(2));
        backend.remember_limit("b.mp3", Some(0));
        assert_eq!(backend.channel_limit("a.mp3", &caps), Some(2));
        assert_eq!(backend.channel_limit("b.mp3", &caps), Some(4));
    }

    #[test]
    fn headless_core_cannot_create() {
        let core = CoreConfig::builder().headless().build().unwrap();
        let backend = BackendCore::new(&core, &SoundConfig::default());

        assert!(!backend.has_bridge());
        assert!(matches!(
            backend.create("a.mp3", CapabilitySet::all_formats()),
            Err(SoundError::Unsupported(_))
        ));
    }
}
