//! Audio bridge over the page's `empiriaSoundJs*` globals.
//!
//! The embedding page (WebView shell or Flash runtime wrapper) defines:
//!
//! | Global                           | Bridge call        |
//! |----------------------------------|--------------------|
//! | `empiriaSoundJsInit(null, src)`  | `init`             |
//! | `empiriaSoundJsPlay(src)`        | `begin`            |
//! | `empiriaSoundJsPlayLooped(src)`  | `begin_looped`     |
//! | `empiriaSoundJsPause(src)`       | `pause`            |
//! | `empiriaSoundJsResume(src)`      | `resume`           |
//! | `empiriaSoundJsStop(src)`        | `stop`             |
//! | `empiriaSoundJsGetCurrentTime(src)` | `current_time`  |
//! | `empiriaSoundJsSetCurrentTime(src, seconds)` | `set_current_time` |
//!
//! Exceptions thrown by these functions (including `ReferenceError` when one
//! is missing) become [`BridgeError`]s.

use crate::error::WasmError;
use bridge_traits::{
    audio::AudioBridge,
    error::{BridgeError, Result},
};
use tracing::debug;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = empiriaSoundJsInit, catch)]
    fn sound_init(instance: &JsValue, src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsPlay, catch)]
    fn sound_play(src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsPlayLooped, catch)]
    fn sound_play_looped(src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsPause, catch)]
    fn sound_pause(src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsResume, catch)]
    fn sound_resume(src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsStop, catch)]
    fn sound_stop(src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsGetCurrentTime, catch)]
    fn sound_get_current_time(src: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = empiriaSoundJsSetCurrentTime, catch)]
    fn sound_set_current_time(src: &str, seconds: f64) -> std::result::Result<(), JsValue>;
}

fn host_error(call: &str, src: &str, err: JsValue) -> BridgeError {
    let err = WasmError::from(err);
    debug!(call, src, error = %err, "host call threw");
    BridgeError::OperationFailed(format!("{} failed for {}: {}", call, src, err))
}

/// [`AudioBridge`] delegating to the page's `empiriaSoundJs*` functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsAudioBridge;

impl JsAudioBridge {
    /// Create a bridge. The globals are looked up on every call.
    pub fn new() -> Self {
        Self
    }
}

impl AudioBridge for JsAudioBridge {
    fn init(&self, src: &str) -> Result<()> {
        sound_init(&JsValue::NULL, src).map_err(|e| host_error("init", src, e))
    }

    fn begin(&self, src: &str) -> Result<()> {
        sound_play(src).map_err(|e| host_error("play", src, e))
    }

    fn begin_looped(&self, src: &str) -> Result<()> {
        sound_play_looped(src).map_err(|e| host_error("playLooped", src, e))
    }

    fn pause(&self, src: &str) -> Result<()> {
        sound_pause(src).map_err(|e| host_error("pause", src, e))
    }

    fn resume(&self, src: &str) -> Result<()> {
        sound_resume(src).map_err(|e| host_error("resume", src, e))
    }

    fn stop(&self, src: &str) -> Result<()> {
        sound_stop(src).map_err(|e| host_error("stop", src, e))
    }

    fn current_time(&self, src: &str) -> Result<f64> {
        let value = sound_get_current_time(src).map_err(|e| host_error("getCurrentTime", src, e))?;
        value.as_f64().ok_or_else(|| {
            WasmError::UnexpectedValue(format!("current time of {} is not a number", src)).into()
        })
    }

    fn set_current_time(&self, src: &str, seconds: f64) -> Result<()> {
        sound_set_current_time(src, seconds).map_err(|e| {
            let message = WasmError::from(e).to_string();
            if message.contains("RangeError") || message.contains("out of range") {
                BridgeError::OutOfRange(format!("{} to {}s: {}", src, seconds, message))
            } else {
                BridgeError::OperationFailed(format!("setCurrentTime failed for {}: {}", src, message))
            }
        })
    }
}
