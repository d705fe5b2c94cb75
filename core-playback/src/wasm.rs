//! WebAssembly bindings for core-playback
//!
//! JavaScript-facing wrappers around [`SoundContext`] and [`SoundInstance`],
//! wired to the browser bridges from `bridge-wasm`.
//!
//! ```javascript
//! const sound = new JsSoundContext();
//! sound.registerPreferredBackends();
//! sound.registerForPreload("sfx/boom.ogg|sfx/boom.mp3", "boom", null);
//! const boom = sound.play("boom", new JsPlayOptions().setDelayMs(250));
//! boom.onComplete(() => console.log("done"));
//! ```

use crate::backend::BackendKind;
use crate::config::SoundConfig;
use crate::context::{SoundContext, SoundEvent};
use crate::instance::{InterruptMode, PlayOptions, SoundCallback, SoundInstance};
use bridge_wasm::{HtmlMediaProbe, JsAudioBridge, UserAgentEnvironment};
use core_async::time::Duration;
use core_runtime::config::CoreConfig;
use js_sys::Function as JsFunction;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

// =============================================================================
// Error Handling
// =============================================================================

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn ms(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value / 1000.0)
    } else {
        Duration::ZERO
    }
}

fn js_callback(function: JsFunction) -> SoundCallback {
    Arc::new(move |instance: &SoundInstance| {
        let handle = JsValue::from(JsSoundInstance {
            inner: instance.clone(),
        });
        if let Err(err) = function.call1(&JsValue::NULL, &handle) {
            tracing::warn!(instance = instance.id(), error = ?err, "sound callback threw");
        }
    })
}

/// Install the panic hook so Rust panics show up in DevTools.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = initPanicHook)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// Play Options
// =============================================================================

/// JavaScript-accessible play options
#[wasm_bindgen]
#[derive(Clone, Copy, Default)]
pub struct JsPlayOptions {
    inner: PlayOptions,
}

#[wasm_bindgen]
impl JsPlayOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set interrupt mode: "none", "any", "early" or "late"
    #[wasm_bindgen(js_name = setInterrupt)]
    pub fn set_interrupt(mut self, mode: &str) -> Result<JsPlayOptions, JsValue> {
        self.inner.interrupt = mode.parse::<InterruptMode>().map_err(to_js_error)?;
        Ok(self)
    }

    #[wasm_bindgen(js_name = setDelayMs)]
    pub fn set_delay_ms(mut self, delay: f64) -> JsPlayOptions {
        self.inner.delay = ms(delay);
        self
    }

    #[wasm_bindgen(js_name = setOffsetMs)]
    pub fn set_offset_ms(mut self, offset: f64) -> JsPlayOptions {
        self.inner.offset = ms(offset);
        self
    }

    /// Extra iterations; -1 loops forever
    #[wasm_bindgen(js_name = setLoop)]
    pub fn set_loop(mut self, loops: i32) -> JsPlayOptions {
        self.inner.loops = loops;
        self
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(mut self, volume: f32) -> JsPlayOptions {
        self.inner.volume = volume;
        self
    }

    #[wasm_bindgen(js_name = setPan)]
    pub fn set_pan(mut self, pan: f32) -> JsPlayOptions {
        self.inner.pan = pan;
        self
    }
}

// =============================================================================
// Sound Instance
// =============================================================================

/// JavaScript-accessible sound instance
#[wasm_bindgen]
pub struct JsSoundInstance {
    inner: SoundInstance,
}

#[wasm_bindgen]
impl JsSoundInstance {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.inner.id() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn src(&self) -> String {
        self.inner.src().to_string()
    }

    /// "notStarted", "playing", "paused", "interrupted", "finished" or "failed"
    #[wasm_bindgen(getter, js_name = playState)]
    pub fn play_state(&self) -> String {
        self.inner.play_state().as_str().to_string()
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.inner.pause().map_err(to_js_error)
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        self.inner.resume().map_err(to_js_error)
    }

    pub fn stop(&self) -> Result<(), JsValue> {
        self.inner.stop().map_err(to_js_error)
    }

    /// Playhead in milliseconds
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> Result<f64, JsValue> {
        let position = self.inner.position().map_err(to_js_error)?;
        Ok(position.as_secs_f64() * 1000.0)
    }

    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&self, position_ms: f64) -> Result<(), JsValue> {
        self.inner.set_position(ms(position_ms)).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) -> Result<(), JsValue> {
        self.inner.set_volume(volume).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f32 {
        self.inner.volume()
    }

    #[wasm_bindgen(js_name = setPan)]
    pub fn set_pan(&self, pan: f32) -> Result<(), JsValue> {
        self.inner.set_pan(pan).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setMute)]
    pub fn set_mute(&self, muted: bool) {
        self.inner.set_muted(muted);
    }

    #[wasm_bindgen(js_name = onComplete)]
    pub fn on_complete(&self, callback: JsFunction) {
        self.inner.set_on_complete(js_callback(callback));
    }

    #[wasm_bindgen(js_name = onLoop)]
    pub fn on_loop(&self, callback: JsFunction) {
        self.inner.set_on_loop(js_callback(callback));
    }

    #[wasm_bindgen(js_name = onReady)]
    pub fn on_ready(&self, callback: JsFunction) {
        self.inner.set_on_ready(js_callback(callback));
    }

    #[wasm_bindgen(js_name = onPlayFailed)]
    pub fn on_play_failed(&self, callback: JsFunction) {
        self.inner.set_on_play_failed(js_callback(callback));
    }

    #[wasm_bindgen(js_name = onPlayInterrupted)]
    pub fn on_play_interrupted(&self, callback: JsFunction) {
        self.inner.set_on_play_interrupted(js_callback(callback));
    }
}

// =============================================================================
// Sound Context
// =============================================================================

/// JavaScript-accessible sound dispatcher
#[wasm_bindgen]
pub struct JsSoundContext {
    inner: SoundContext,
}

#[wasm_bindgen]
impl JsSoundContext {
    /// Create a context over the page's `empiriaSoundJs*` bridge.
    ///
    /// `config` is an optional plain object with `SoundConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsSoundContext, JsValue> {
        let config: SoundConfig = if config.is_undefined() || config.is_null() {
            SoundConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };

        let core = CoreConfig::builder()
            .audio_bridge(Arc::new(JsAudioBridge::new()))
            .media_probe(Arc::new(HtmlMediaProbe::new().map_err(to_js_error)?))
            .environment(Arc::new(UserAgentEnvironment::detect().map_err(to_js_error)?))
            .build()
            .map_err(to_js_error)?;

        let inner = SoundContext::new(core, config).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Activate the first supported backend of the configured priority list.
    #[wasm_bindgen(js_name = registerPreferredBackends)]
    pub fn register_preferred_backends(&self) -> Result<String, JsValue> {
        self.inner
            .register_preferred_backends()
            .map(|kind| kind.name().to_string())
            .map_err(to_js_error)
    }

    /// Activate one backend: "default", "html" or "external".
    #[wasm_bindgen(js_name = registerBackend)]
    pub fn register_backend(&self, kind: &str) -> Result<String, JsValue> {
        let kind = kind.parse::<BackendKind>().map_err(to_js_error)?;
        self.inner
            .register_backend(kind)
            .map(|kind| kind.name().to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    #[wasm_bindgen(js_name = getCapabilities)]
    pub fn get_capabilities(&self) -> Result<JsValue, JsValue> {
        let caps = self.inner.capabilities().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&caps).map_err(to_js_error)
    }

    /// One capability; `undefined` for unknown keys.
    #[wasm_bindgen(js_name = getCapability)]
    pub fn get_capability(&self, key: &str) -> Result<JsValue, JsValue> {
        match self.inner.capability(key).map_err(to_js_error)? {
            Some(value) => serde_wasm_bindgen::to_value(&value).map_err(to_js_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn play(&self, value: &str, options: Option<JsPlayOptions>) -> Result<JsSoundInstance, JsValue> {
        let options = options.map(|o| o.inner).unwrap_or_default();
        let inner = self.inner.play(value, options).map_err(to_js_error)?;
        Ok(JsSoundInstance { inner })
    }

    /// Pause all instances, or those of `id`. Returns the count paused.
    pub fn pause(&self, id: Option<String>) -> Result<u32, JsValue> {
        self.inner
            .pause(id.as_deref())
            .map(|n| n as u32)
            .map_err(to_js_error)
    }

    pub fn resume(&self, id: Option<String>) -> Result<u32, JsValue> {
        self.inner
            .resume(id.as_deref())
            .map(|n| n as u32)
            .map_err(to_js_error)
    }

    pub fn stop(&self, id: Option<String>) -> Result<u32, JsValue> {
        self.inner
            .stop(id.as_deref())
            .map(|n| n as u32)
            .map_err(to_js_error)
    }

    /// Returns the `{ type, id, data, name, src, extension }` descriptor.
    #[wasm_bindgen(js_name = registerForPreload)]
    pub fn register_for_preload(
        &self,
        src: &str,
        id: Option<String>,
        data: JsValue,
    ) -> Result<JsValue, JsValue> {
        let data = if data.is_undefined() || data.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(data).map_err(to_js_error)?)
        };
        let descriptor = self
            .inner
            .register_for_preload(src, None, id.as_deref(), data)
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&descriptor).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getPreloadHandlers)]
    pub fn get_preload_handlers(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.preload_handlers()).map_err(to_js_error)
    }

    /// Host notification: "ready", "loop", "complete" or "error".
    #[wasm_bindgen(js_name = handleSoundEvent)]
    pub fn handle_sound_event(&self, src: &str, event: &str) -> Result<u32, JsValue> {
        let event = event.parse::<SoundEvent>().map_err(to_js_error)?;
        self.inner
            .handle_sound_event(src, event)
            .map(|n| n as u32)
            .map_err(to_js_error)
    }

    /// Host load progress for a registered source.
    #[wasm_bindgen(js_name = handleSoundProgress)]
    pub fn handle_sound_progress(&self, src: &str, loaded: f64, total: f64) -> Result<(), JsValue> {
        self.inner
            .handle_sound_event(
                src,
                SoundEvent::Progress {
                    loaded: loaded.max(0.0) as u64,
                    total: total.max(0.0) as u64,
                },
            )
            .map(|_| ())
            .map_err(to_js_error)
    }
}
