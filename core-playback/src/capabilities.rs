//! # Capability Sets
//!
//! What a backend can play and control, computed once per backend object.

use serde::{Deserialize, Serialize};

/// Formats and features a backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub mp3: bool,
    pub ogg: bool,
    pub wav: bool,
    pub mpeg: bool,
    pub panning: bool,
    pub volume: bool,
    /// Concurrent instances allowed per source; `None` means unlimited.
    pub channels: Option<u32>,
}

/// A single capability looked up by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Count(u32),
}

impl CapabilitySet {
    /// Every format playable, no control features, no channel limit.
    pub fn all_formats() -> Self {
        Self {
            mp3: true,
            ogg: true,
            wav: true,
            mpeg: true,
            ..Self::default()
        }
    }

    /// Keyed lookup. Unknown keys and an unlimited channel count yield `None`.
    pub fn get(&self, key: &str) -> Option<CapabilityValue> {
        match key {
            "mp3" => Some(CapabilityValue::Bool(self.mp3)),
            "ogg" => Some(CapabilityValue::Bool(self.ogg)),
            "wav" => Some(CapabilityValue::Bool(self.wav)),
            "mpeg" => Some(CapabilityValue::Bool(self.mpeg)),
            "panning" => Some(CapabilityValue::Bool(self.panning)),
            "volume" => Some(CapabilityValue::Bool(self.volume)),
            "channels" => self.channels.map(CapabilityValue::Count),
            _ => None,
        }
    }

    /// Whether a file extension (without the dot) is playable. Case-insensitive.
    pub fn supports_extension(&self, extension: &str) -> bool {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => self.mp3,
            "ogg" => self.ogg,
            "wav" => self.wav,
            "mpeg" => self.mpeg,
            _ => false,
        }
    }

    /// Whether at least one format is playable.
    pub fn any_format(&self) -> bool {
        self.mp3 || self.ogg || self.wav || self.mpeg
    }
}
