//! In-memory audio host.

use bridge_traits::{
    audio::AudioBridge,
    error::{BridgeError, Result},
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Bridge operation names, used for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    Init,
    Begin,
    BeginLooped,
    Pause,
    Resume,
    Stop,
    CurrentTime,
    SetCurrentTime,
}

/// A call received by the host, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    Init(String),
    Begin(String),
    BeginLooped(String),
    Pause(String),
    Resume(String),
    Stop(String),
    SetCurrentTime(String, f64),
}

impl BridgeCall {
    /// Source path the call targeted.
    pub fn src(&self) -> &str {
        match self {
            BridgeCall::Init(src)
            | BridgeCall::Begin(src)
            | BridgeCall::BeginLooped(src)
            | BridgeCall::Pause(src)
            | BridgeCall::Resume(src)
            | BridgeCall::Stop(src)
            | BridgeCall::SetCurrentTime(src, _) => src,
        }
    }
}

/// Observable state of one host voice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceState {
    pub initialized: bool,
    pub playing: bool,
    pub paused: bool,
    pub looped: bool,
    /// Playhead in seconds.
    pub position: f64,
    /// Media length in seconds, when known. Seeks beyond it are rejected.
    pub duration: Option<f64>,
}

/// Audio host that keeps voices in memory and records every call.
#[derive(Debug, Default)]
pub struct InMemoryAudioHost {
    voices: Mutex<HashMap<String, VoiceState>>,
    calls: Mutex<Vec<BridgeCall>>,
    failing: Mutex<HashSet<BridgeOp>>,
    require_init: bool,
}

impl InMemoryAudioHost {
    /// Create a permissive host: sources need no `init` before playback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that rejects playback of sources never passed to `init`.
    pub fn strict() -> Self {
        Self {
            require_init: true,
            ..Self::default()
        }
    }

    /// Declare the media length of `src`, enabling out-of-range seek checks.
    pub fn with_duration(self, src: impl Into<String>, seconds: f64) -> Self {
        self.voices.lock().entry(src.into()).or_default().duration = Some(seconds);
        self
    }

    /// Make every subsequent call of `op` fail until [`Self::recover`].
    pub fn fail_on(&self, op: BridgeOp) {
        self.failing.lock().insert(op);
    }

    /// Clear all injected failures.
    pub fn recover(&self) {
        self.failing.lock().clear();
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls that targeted `src`.
    pub fn calls_for(&self, src: &str) -> Vec<BridgeCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.src() == src)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Current state of the voice for `src`, if the host has seen it.
    pub fn voice(&self, src: &str) -> Option<VoiceState> {
        self.voices.lock().get(src).cloned()
    }

    /// Move the playhead of a playing voice forward, as real playback would.
    pub fn advance(&self, src: &str, seconds: f64) {
        if let Some(voice) = self.voices.lock().get_mut(src) {
            if voice.playing && !voice.paused {
                voice.position += seconds;
                if let Some(duration) = voice.duration {
                    voice.position = voice.position.min(duration);
                }
            }
        }
    }

    fn check(&self, op: BridgeOp, src: &str) -> Result<()> {
        if self.failing.lock().contains(&op) {
            return Err(BridgeError::OperationFailed(format!(
                "{:?} rejected by host for {}",
                op, src
            )));
        }
        Ok(())
    }

    fn record(&self, call: BridgeCall) {
        debug!(call = ?call, "host call");
        self.calls.lock().push(call);
    }

    fn start(&self, src: &str, looped: bool) -> Result<()> {
        let mut voices = self.voices.lock();
        if self.require_init && !voices.get(src).is_some_and(|v| v.initialized) {
            return Err(BridgeError::NotAvailable(format!(
                "source was never initialized: {}",
                src
            )));
        }
        let voice = voices.entry(src.to_string()).or_default();
        voice.playing = true;
        voice.paused = false;
        voice.looped = looped;
        Ok(())
    }

    fn with_voice<T>(&self, src: &str, f: impl FnOnce(&mut VoiceState) -> Result<T>) -> Result<T> {
        let mut voices = self.voices.lock();
        let voice = voices
            .get_mut(src)
            .ok_or_else(|| BridgeError::NotAvailable(format!("unknown source: {}", src)))?;
        f(voice)
    }
}

impl AudioBridge for InMemoryAudioHost {
    fn init(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::Init, src)?;
        self.record(BridgeCall::Init(src.to_string()));
        self.voices.lock().entry(src.to_string()).or_default().initialized = true;
        Ok(())
    }

    fn begin(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::Begin, src)?;
        self.record(BridgeCall::Begin(src.to_string()));
        self.start(src, false)
    }

    fn begin_looped(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::BeginLooped, src)?;
        self.record(BridgeCall::BeginLooped(src.to_string()));
        self.start(src, true)
    }

    fn pause(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::Pause, src)?;
        self.record(BridgeCall::Pause(src.to_string()));
        self.with_voice(src, |voice| {
            voice.paused = true;
            Ok(())
        })
    }

    fn resume(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::Resume, src)?;
        self.record(BridgeCall::Resume(src.to_string()));
        self.with_voice(src, |voice| {
            voice.paused = false;
            Ok(())
        })
    }

    fn stop(&self, src: &str) -> Result<()> {
        self.check(BridgeOp::Stop, src)?;
        self.record(BridgeCall::Stop(src.to_string()));
        self.with_voice(src, |voice| {
            voice.playing = false;
            voice.paused = false;
            voice.looped = false;
            voice.position = 0.0;
            Ok(())
        })
    }

    fn current_time(&self, src: &str) -> Result<f64> {
        self.check(BridgeOp::CurrentTime, src)?;
        self.with_voice(src, |voice| Ok(voice.position))
    }

    fn set_current_time(&self, src: &str, seconds: f64) -> Result<()> {
        self.check(BridgeOp::SetCurrentTime, src)?;
        self.record(BridgeCall::SetCurrentTime(src.to_string(), seconds));
        let mut voices = self.voices.lock();
        let voice = voices.entry(src.to_string()).or_default();
        if seconds < 0.0 || voice.duration.is_some_and(|d| seconds > d) {
            return Err(BridgeError::OutOfRange(format!(
                "cannot seek {} to {}s",
                src, seconds
            )));
        }
        voice.position = seconds;
        Ok(())
    }
}
