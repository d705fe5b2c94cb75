//! WebAssembly bindings for bridge-wasm
//!
//! Small helpers the page can call before wiring up a sound context.

use wasm_bindgen::prelude::*;

/// Names of the globals [`JsAudioBridge`](crate::JsAudioBridge) calls.
pub const SOUND_BRIDGE_GLOBALS: [&str; 8] = [
    "empiriaSoundJsInit",
    "empiriaSoundJsPlay",
    "empiriaSoundJsPlayLooped",
    "empiriaSoundJsPause",
    "empiriaSoundJsResume",
    "empiriaSoundJsStop",
    "empiriaSoundJsGetCurrentTime",
    "empiriaSoundJsSetCurrentTime",
];

/// Globals from [`SOUND_BRIDGE_GLOBALS`] that the page has not defined as functions.
#[wasm_bindgen(js_name = missingSoundBridgeGlobals)]
pub fn missing_sound_bridge_globals() -> Vec<String> {
    let global = js_sys::global();
    SOUND_BRIDGE_GLOBALS
        .iter()
        .filter(|name| {
            !js_sys::Reflect::get(&global, &JsValue::from_str(name))
                .map(|value| value.is_function())
                .unwrap_or(false)
        })
        .map(|name| name.to_string())
        .collect()
}

/// Get the bridge-wasm version
#[wasm_bindgen(js_name = bridgeWasmVersion)]
pub fn bridge_wasm_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the bridge-wasm name
#[wasm_bindgen(js_name = bridgeWasmName)]
pub fn bridge_wasm_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}
