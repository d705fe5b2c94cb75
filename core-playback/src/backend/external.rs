//! Backend for the external player bridge of Adobe AIR on Android.
//!
//! Registration only records intent: the external player loads sources on
//! demand, so preload handles are issued already complete.

use super::{AudioBackend, BackendCore, BackendKind};
use crate::capabilities::CapabilitySet;
use crate::config::SoundConfig;
use crate::error::Result;
use crate::instance::SoundInstance;
use crate::preload::PreloadHandle;
use crate::tracker::InstanceTracker;
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Channel count the external player can mix.
pub const EXTERNAL_MAX_CHANNELS: u32 = 255;

pub struct ExternalBackend {
    core: BackendCore,
    air_on_android: bool,
    next_preload: AtomicU64,
    capabilities: OnceLock<CapabilitySet>,
}

impl ExternalBackend {
    pub fn new(core: &CoreConfig, config: &SoundConfig) -> Self {
        Self {
            core: BackendCore::new(core, config),
            air_on_android: core.is_air_on_android(),
            next_preload: AtomicU64::new(0),
            capabilities: OnceLock::new(),
        }
    }
}

impl AudioBackend for ExternalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::External
    }

    fn is_supported(&self) -> bool {
        self.capabilities().any_format()
    }

    fn capabilities(&self) -> CapabilitySet {
        *self.capabilities.get_or_init(|| {
            if self.air_on_android && self.core.has_bridge() {
                CapabilitySet {
                    panning: true,
                    volume: true,
                    channels: Some(EXTERNAL_MAX_CHANNELS),
                    ..CapabilitySet::all_formats()
                }
            } else {
                CapabilitySet::default()
            }
        })
    }

    fn register(&self, src: &str, channels_hint: Option<u32>) -> Result<PreloadHandle> {
        self.core.bridge()?;
        self.core.remember_limit(src, channels_hint);
        let preload_id = format!("p{}", self.next_preload.fetch_add(1, Ordering::Relaxed));
        debug!(src = %strip_path(src), preload_id = %preload_id, backend = "external", "registered");
        Ok(PreloadHandle::loaded(src, Some(preload_id)))
    }

    fn create(&self, src: &str) -> Result<SoundInstance> {
        self.core.create(src, self.capabilities())
    }

    fn tracker(&self) -> &Arc<InstanceTracker> {
        self.core.tracker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_native::{InMemoryAudioHost, StaticEnvironment};

    fn backend(env: StaticEnvironment, host: Arc<InMemoryAudioHost>) -> ExternalBackend {
        let core = CoreConfig::builder()
            .audio_bridge(host)
            .environment(Arc::new(env))
            .build()
            .unwrap();
        ExternalBackend::new(&core, &SoundConfig::default())
    }

    #[test]
    fn only_supported_on_air_android() {
        let host = Arc::new(InMemoryAudioHost::new());
        assert!(!backend(StaticEnvironment::plain(), host.clone()).is_supported());

        let air = StaticEnvironment {
            adobe_air: true,
            android: false,
        };
        assert!(!backend(air, host.clone()).is_supported());

        let backend = backend(StaticEnvironment::air_on_android(), host);
        assert!(backend.is_supported());
        let caps = backend.capabilities();
        assert!(caps.panning && caps.volume);
        assert_eq!(caps.channels, Some(255));
    }

    #[test]
    fn register_issues_preload_ids_without_host_calls() {
        let host = Arc::new(InMemoryAudioHost::new());
        let backend = backend(StaticEnvironment::air_on_android(), host.clone());

        let first = backend.register("a.mp3", None).unwrap();
        let second = backend.register("b.mp3", None).unwrap();

        assert_eq!(first.preload_id(), Some("p0"));
        assert_eq!(second.preload_id(), Some("p1"));
        assert!(first.is_loaded());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn instances_can_pan() {
        let backend = backend(
            StaticEnvironment::air_on_android(),
            Arc::new(InMemoryAudioHost::new()),
        );
        let instance = backend.create("a.mp3").unwrap();
        instance.set_pan(0.5).unwrap();
        assert_eq!(instance.channel_limit(), Some(255));
    }
}
