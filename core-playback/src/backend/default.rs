//! Backend that hands every call to the injected audio bridge.

use super::{AudioBackend, BackendCore, BackendKind};
use crate::capabilities::CapabilitySet;
use crate::config::SoundConfig;
use crate::error::Result;
use crate::instance::SoundInstance;
use crate::preload::PreloadHandle;
use crate::tracker::InstanceTracker;
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Bridge-backed backend. Supported whenever an audio bridge is present.
pub struct DefaultBackend {
    core: BackendCore,
    capabilities: OnceLock<CapabilitySet>,
}

impl DefaultBackend {
    pub fn new(core: &CoreConfig, config: &SoundConfig) -> Self {
        Self {
            core: BackendCore::new(core, config),
            capabilities: OnceLock::new(),
        }
    }
}

impl AudioBackend for DefaultBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Default
    }

    fn is_supported(&self) -> bool {
        self.capabilities().any_format()
    }

    fn capabilities(&self) -> CapabilitySet {
        *self.capabilities.get_or_init(|| {
            if self.core.has_bridge() {
                CapabilitySet::all_formats()
            } else {
                CapabilitySet::default()
            }
        })
    }

    fn register(&self, src: &str, channels_hint: Option<u32>) -> Result<PreloadHandle> {
        self.core.bridge()?.init(src)?;
        self.core.remember_limit(src, channels_hint);
        debug!(src = %strip_path(src), backend = "default", "registered");
        Ok(PreloadHandle::pending(src, None))
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
    use crate::error::SoundError;
    use bridge_native::{BridgeCall, BridgeOp, InMemoryAudioHost};

    fn backend(host: Arc<InMemoryAudioHost>) -> DefaultBackend {
        let core = CoreConfig::builder().audio_bridge(host).build().unwrap();
        DefaultBackend::new(&core, &SoundConfig::default())
    }

    #[test]
    fn supported_with_bridge() {
        let backend = backend(Arc::new(InMemoryAudioHost::new()));
        assert!(backend.is_supported());

        let caps = backend.capabilities();
        assert!(caps.mp3 && caps.ogg && caps.wav && caps.mpeg);
        assert!(!caps.panning);
        assert_eq!(caps.channels, None);
    }

    #[test]
    fn unsupported_without_bridge() {
        let core = CoreConfig::builder().headless().build().unwrap();
        let backend = DefaultBackend::new(&core, &SoundConfig::default());
        assert!(!backend.is_supported());
        assert!(!backend.capabilities().any_format());
    }

    #[test]
    fn register_initializes_on_host() {
        let host = Arc::new(InMemoryAudioHost::new());
        let backend = backend(host.clone());

        let handle = backend.register("sfx/boom.ogg", None).unwrap();

        assert_eq!(handle.src(), "sfx/boom.ogg");
        assert!(!handle.is_loaded());
        assert_eq!(host.calls(), vec![BridgeCall::Init("sfx/boom.ogg".into())]);
    }

    #[test]
    fn register_surfaces_host_failure() {
        let host = Arc::new(InMemoryAudioHost::new());
        host.fail_on(BridgeOp::Init);
        let backend = backend(host);

        assert!(matches!(
            backend.register("a.mp3", None),
            Err(SoundError::NativeCallFailed(_))
        ));
    }

    #[test]
    fn created_instances_share_tracker() {
        let backend = backend(Arc::new(InMemoryAudioHost::new()));
        backend.register("a.mp3", Some(3)).unwrap();

        let instance = backend.create("a.mp3").unwrap();
        assert_eq!(instance.channel_limit(), Some(3));
        assert!(backend.tracker().is_empty());

        instance.play(Default::default()).unwrap();
        assert!(backend.tracker().contains(instance.id()));
    }
}
