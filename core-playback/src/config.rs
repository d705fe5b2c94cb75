//! # Dispatcher Configuration
//!
//! Tunables for a [`SoundContext`](crate::context::SoundContext). Host
//! collaborators live in [`core_runtime::config::CoreConfig`]; this type only
//! carries plain values and can be loaded from JSON.

use crate::backend::BackendKind;
use crate::error::{Result, SoundError};
use crate::source::{DEFAULT_DELIMITER, SOUND_KIND};
use serde::{Deserialize, Serialize};

/// Sound dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Separator between format alternatives in a source string.
    ///
    /// Default: `'|'`.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Backends tried by [`register_preferred_backends`], first supported wins.
    ///
    /// Default: External, HTML, Default.
    ///
    /// [`register_preferred_backends`]: crate::context::SoundContext::register_preferred_backends
    #[serde(default = "default_backend_priority")]
    pub backend_priority: Vec<BackendKind>,

    /// Install the Default backend on first use when nothing is active.
    ///
    /// Default: true.
    #[serde(default = "default_auto_install_default")]
    pub auto_install_default: bool,

    /// Channel count the HTML backend reports (browser limit on live tags).
    ///
    /// Default: 30.
    #[serde(default = "default_html_max_instances")]
    pub html_max_instances: u32,

    /// Per-source channel limit overriding the backend's own.
    ///
    /// Default: none.
    #[serde(default)]
    pub max_channels_per_source: Option<u32>,

    /// Asset kinds advertised to preloaders.
    #[serde(default = "default_preload_types")]
    pub preload_types: Vec<String>,

    /// File extensions advertised to preloaders.
    #[serde(default = "default_preload_extensions")]
    pub preload_extensions: Vec<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            backend_priority: default_backend_priority(),
            auto_install_default: default_auto_install_default(),
            html_max_instances: default_html_max_instances(),
            max_channels_per_source: None,
            preload_types: default_preload_types(),
            preload_extensions: default_preload_extensions(),
        }
    }
}

impl SoundConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.delimiter, '.' | '/') || self.delimiter.is_whitespace() {
            return Err(SoundError::Config(format!(
                "delimiter {:?} would split inside a path",
                self.delimiter
            )));
        }

        if self.backend_priority.is_empty() {
            return Err(SoundError::Config(
                "backend_priority must name at least one backend".to_string(),
            ));
        }

        if self.html_max_instances == 0 {
            return Err(SoundError::Config(
                "html_max_instances must be > 0".to_string(),
            ));
        }

        if self.max_channels_per_source == Some(0) {
            return Err(SoundError::Config(
                "max_channels_per_source must be > 0 when set".to_string(),
            ));
        }

        if self.preload_types.is_empty() {
            return Err(SoundError::Config(
                "preload_types must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_backend_priority() -> Vec<BackendKind> {
    vec![BackendKind::External, BackendKind::Html, BackendKind::Default]
}

fn default_auto_install_default() -> bool {
    true
}

fn default_html_max_instances() -> u32 {
    30
}

fn default_preload_types() -> Vec<String> {
    vec![SOUND_KIND.to_string()]
}

fn default_preload_extensions() -> Vec<String> {
    ["mp3", "ogg", "wav"].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SoundConfig::default();
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.html_max_instances, 30);
        assert!(config.auto_install_default);
        assert_eq!(config.backend_priority.last(), Some(&BackendKind::Default));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SoundConfig =
            serde_json::from_str(r#"{ "html_max_instances": 8, "backend_priority": ["html"] }"#)
                .unwrap();

        assert_eq!(config.html_max_instances, 8);
        assert_eq!(config.backend_priority, vec![BackendKind::Html]);
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.preload_extensions, vec!["mp3", "ogg", "wav"]);
    }

    #[test]
    fn test_validation() {
        let mut config = SoundConfig::default();
        config.delimiter = '.';
        assert!(config.validate().is_err());

        let mut config = SoundConfig::default();
        config.max_channels_per_source = Some(0);
        assert!(config.validate().is_err());

        let mut config = SoundConfig::default();
        config.backend_priority.clear();
        assert!(config.validate().is_err());

        let mut config = SoundConfig::default();
        config.html_max_instances = 0;
        assert!(config.validate().is_err());
    }
}
