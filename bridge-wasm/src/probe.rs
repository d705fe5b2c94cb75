//! Browser environment probes.

use crate::error::{WasmError, WasmResult};
use bridge_traits::probe::{HostEnvironment, MediaProbe, PlayTypeSupport};
use web_sys::HtmlAudioElement;

/// [`MediaProbe`] asking a detached `<audio>` element.
#[derive(Debug, Clone)]
pub struct HtmlMediaProbe {
    element: HtmlAudioElement,
}

impl HtmlMediaProbe {
    /// Create the probe element.
    pub fn new() -> WasmResult<Self> {
        let element = HtmlAudioElement::new()?;
        Ok(Self { element })
    }
}

impl MediaProbe for HtmlMediaProbe {
    fn can_play_type(&self, mime: &str) -> PlayTypeSupport {
        PlayTypeSupport::from_answer(&self.element.can_play_type(mime))
    }
}

/// [`HostEnvironment`] read once from `navigator.userAgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentEnvironment {
    adobe_air: bool,
    android: bool,
}

impl UserAgentEnvironment {
    /// Inspect the current browser's user agent.
    pub fn detect() -> WasmResult<Self> {
        let window = web_sys::window().ok_or_else(|| WasmError::Unavailable("window".to_string()))?;
        let agent = window.navigator().user_agent()?;
        Ok(Self::from_user_agent(&agent))
    }

    /// Classify a user agent string.
    pub fn from_user_agent(agent: &str) -> Self {
        Self {
            adobe_air: agent.contains("AdobeAIR"),
            android: agent.contains("Android"),
        }
    }
}

impl HostEnvironment for UserAgentEnvironment {
    fn is_adobe_air(&self) -> bool {
        self.adobe_air
    }

    fn is_android(&self) -> bool {
        self.android
    }
}
