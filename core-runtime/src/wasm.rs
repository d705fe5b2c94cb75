//! WASM bindings for core-runtime
//!
//! Exposes logging setup to JavaScript so the page can turn on console
//! tracing before creating a sound context.

use crate::logging::{init_logging, LoggingConfig};
use bridge_traits::log::LogLevel;
use wasm_bindgen::prelude::*;

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// JavaScript-accessible logging configuration
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct JsLoggingConfig {
    inner: LoggingConfig,
}

#[wasm_bindgen]
impl JsLoggingConfig {
    /// Create a new logging configuration with defaults
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum log level (0 = Trace, 1 = Debug, 2 = Info, 3 = Warn, 4 = Error)
    #[wasm_bindgen(js_name = setLevel)]
    pub fn set_level(&mut self, level: u8) {
        self.inner.level = match level {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            _ => LogLevel::Error,
        };
    }

    /// Set a custom filter string (e.g. "core_playback=trace")
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&mut self, filter: String) {
        self.inner.filter = Some(filter);
    }

    /// Report span timings in the browser performance panel
    #[wasm_bindgen(js_name = setSpans)]
    pub fn set_spans(&mut self, enable: bool) {
        self.inner.enable_spans = enable;
    }
}

/// Initialize console logging. Fails if logging was already initialized.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging_js(config: &JsLoggingConfig) -> Result<(), JsValue> {
    init_logging(config.inner.clone()).map_err(to_js_error)
}
