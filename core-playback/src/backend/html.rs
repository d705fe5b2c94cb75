//! Backend for hosts that play through HTML audio elements.
//!
//! Playable formats come from the host's `canPlayType` answers. The browser
//! caps live audio tags, which becomes the per-source channel limit.

use super::{AudioBackend, BackendCore, BackendKind};
use crate::capabilities::CapabilitySet;
use crate::config::SoundConfig;
use crate::error::Result;
use crate::instance::SoundInstance;
use crate::preload::PreloadHandle;
use crate::tracker::InstanceTracker;
use bridge_traits::MediaProbe;
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub struct HtmlBackend {
    core: BackendCore,
    probe: Option<Arc<dyn MediaProbe>>,
    air_on_android: bool,
    max_instances: u32,
    capabilities: OnceLock<CapabilitySet>,
}

impl HtmlBackend {
    pub fn new(core: &CoreConfig, config: &SoundConfig) -> Self {
        Self {
            core: BackendCore::new(core, config),
            probe: core.media_probe.clone(),
            air_on_android: core.is_air_on_android(),
            max_instances: config.html_max_instances,
            capabilities: OnceLock::new(),
        }
    }

    fn probe_capabilities(&self) -> CapabilitySet {
        if self.air_on_android || !self.core.has_bridge() {
            return CapabilitySet::default();
        }
        let Some(probe) = self.probe.as_ref() else {
            return CapabilitySet::default();
        };

        let playable = |mime: &str| probe.can_play_type(mime).is_playable();
        let mp3 = playable("audio/mp3");
        let mpeg = playable("audio/mpeg");
        let ogg = playable("audio/ogg");
        let wav = playable("audio/wav");

        let formats = CapabilitySet {
            mp3: mp3 || mpeg,
            ogg,
            wav,
            mpeg,
            ..CapabilitySet::default()
        };
        if !formats.any_format() {
            return CapabilitySet::default();
        }

        CapabilitySet {
            panning: false,
            volume: true,
            channels: Some(self.max_instances),
            ..formats
        }
    }
}

impl AudioBackend for HtmlBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Html
    }

    fn is_supported(&self) -> bool {
        self.capabilities().any_format()
    }

    fn capabilities(&self) -> CapabilitySet {
        *self.capabilities.get_or_init(|| self.probe_capabilities())
    }

    fn register(&self, src: &str, channels_hint: Option<u32>) -> Result<PreloadHandle> {
        self.core.bridge()?.init(src)?;
        self.core.remember_limit(src, channels_hint);
        debug!(src = %strip_path(src), backend = "html", "registered");
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
    use bridge_native::{InMemoryAudioHost, StaticEnvironment, StaticMediaProbe};
    use bridge_traits::PlayTypeSupport;
    use mockall::mock;

    mock! {
        Probe {}

        impl MediaProbe for Probe {
            fn can_play_type(&self, mime: &str) -> PlayTypeSupport;
        }
    }

    fn core_with(probe: Arc<dyn MediaProbe>, env: StaticEnvironment) -> CoreConfig {
        CoreConfig::builder()
            .audio_bridge(Arc::new(InMemoryAudioHost::new()))
            .media_probe(probe)
            .environment(Arc::new(env))
            .build()
            .unwrap()
    }

    #[test]
    fn probes_each_type_once() {
        let mut probe = MockProbe::new();
        probe
            .expect_can_play_type()
            .times(4)
            .returning(|mime| match mime {
                "audio/mpeg" | "audio/wav" => PlayTypeSupport::Maybe,
                _ => PlayTypeSupport::No,
            });

        let core = core_with(Arc::new(probe), StaticEnvironment::plain());
        let backend = HtmlBackend::new(&core, &SoundConfig::default());

        let first = backend.capabilities();
        assert!(backend.is_supported());
        let second = backend.capabilities();

        assert_eq!(first, second);
        assert!(first.mp3 && first.mpeg && first.wav);
        assert!(!first.ogg);
        assert!(first.volume && !first.panning);
        assert_eq!(first.channels, Some(30));
    }

    #[test]
    fn unsupported_on_air_android() {
        let core = core_with(
            Arc::new(StaticMediaProbe::all_common()),
            StaticEnvironment::air_on_android(),
        );
        let backend = HtmlBackend::new(&core, &SoundConfig::default());
        assert!(!backend.is_supported());
    }

    #[test]
    fn unsupported_when_nothing_plays() {
        let core = core_with(Arc::new(StaticMediaProbe::new()), StaticEnvironment::plain());
        let backend = HtmlBackend::new(&core, &SoundConfig::default());
        assert!(!backend.is_supported());
        assert_eq!(backend.capabilities(), CapabilitySet::default());
    }

    #[test]
    fn channel_count_from_config() {
        let core = core_with(
            Arc::new(StaticMediaProbe::new().with_type("audio/ogg")),
            StaticEnvironment::plain(),
        );
        let config = SoundConfig {
            html_max_instances: 8,
            ..SoundConfig::default()
        };
        let backend = HtmlBackend::new(&core, &config);

        assert_eq!(backend.capabilities().channels, Some(8));
        assert_eq!(backend.create("a.ogg").unwrap().channel_limit(), Some(8));
    }
}
