//! Fixed-answer environment probes.

use bridge_traits::probe::{HostEnvironment, MediaProbe, PlayTypeSupport};
use std::collections::HashSet;

/// Media probe answering from a fixed set of MIME types.
#[derive(Debug, Clone, Default)]
pub struct StaticMediaProbe {
    playable: HashSet<String>,
}

impl StaticMediaProbe {
    /// A probe that can play nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe answering "probably" for every common audio type.
    pub fn all_common() -> Self {
        Self::new()
            .with_type("audio/mp3")
            .with_type("audio/mpeg")
            .with_type("audio/ogg")
            .with_type("audio/wav")
    }

    /// Mark a MIME type as playable.
    pub fn with_type(mut self, mime: impl Into<String>) -> Self {
        self.playable.insert(mime.into().to_ascii_lowercase());
        self
    }
}

impl MediaProbe for StaticMediaProbe {
    fn can_play_type(&self, mime: &str) -> PlayTypeSupport {
        if self.playable.contains(&mime.to_ascii_lowercase()) {
            PlayTypeSupport::Probably
        } else {
            PlayTypeSupport::No
        }
    }
}

/// Host environment with fixed runtime flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    pub adobe_air: bool,
    pub android: bool,
}

impl StaticEnvironment {
    /// A plain host (neither AIR nor Android).
    pub fn plain() -> Self {
        Self::default()
    }

    /// The Adobe AIR on Android runtime.
    pub fn air_on_android() -> Self {
        Self {
            adobe_air: true,
            android: true,
        }
    }
}

impl HostEnvironment for StaticEnvironment {
    fn is_adobe_air(&self) -> bool {
        self.adobe_air
    }

    fn is_android(&self) -> bool {
        self.android
    }
}
