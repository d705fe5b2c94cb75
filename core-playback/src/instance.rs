//! # Sound Instances
//!
//! One playback session of one source.
//!
//! ## State machine
//!
//! ```text
//! NotStarted ──play──▶ Playing ◀──resume── Paused
//!     │                  │  └────pause────────▲
//!     │                  ├──stop / host end──▶ Finished
//!     │                  └──interrupt────────▶ Interrupted
//!     └──start failure──────────────────────▶ Failed
//! ```
//!
//! `Finished`, `Interrupted` and `Failed` are terminal: every control on a
//! terminal instance returns [`SoundError::InstanceFinished`].
//!
//! A delayed `play` schedules its start on the async runtime behind a
//! [`CancellationToken`] held by the instance, so `stop()` during the delay
//! guarantees the start never reaches the host.

use crate::capabilities::CapabilitySet;
use crate::error::{Result, SoundError};
use crate::tracker::{ChannelGrant, InstanceTracker};
use bridge_traits::AudioBridge;
use core_async::sync::CancellationToken;
use core_async::time::{sleep_unless_cancelled, Duration};
use core_runtime::logging::strip_path;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Loop count that repeats until stopped.
pub const LOOP_FOREVER: i32 = -1;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

#[cfg(not(target_arch = "wasm32"))]
pub type SoundCallback = Arc<dyn Fn(&SoundInstance) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type SoundCallback = Arc<dyn Fn(&SoundInstance)>;

/// Lifecycle state of a [`SoundInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayState {
    NotStarted,
    Playing,
    Paused,
    Interrupted,
    Finished,
    Failed,
}

impl PlayState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlayState::Interrupted | PlayState::Finished | PlayState::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayState::NotStarted => "notStarted",
            PlayState::Playing => "playing",
            PlayState::Paused => "paused",
            PlayState::Interrupted => "interrupted",
            PlayState::Finished => "finished",
            PlayState::Failed => "failed",
        }
    }
}

/// How a new instance claims a channel when its source has none free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptMode {
    /// Never interrupt; the new instance fails.
    #[default]
    None,
    /// Interrupt any holder, paused ones first.
    Any,
    /// Interrupt the holder that started earliest.
    Early,
    /// Interrupt the holder that started most recently.
    Late,
}

impl FromStr for InterruptMode {
    type Err = SoundError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(InterruptMode::None),
            "any" => Ok(InterruptMode::Any),
            "early" => Ok(InterruptMode::Early),
            "late" => Ok(InterruptMode::Late),
            other => Err(SoundError::Config(format!(
                "unknown interrupt mode: {}",
                other
            ))),
        }
    }
}

/// Parameters of a single `play` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub interrupt: InterruptMode,
    /// Time to wait before the host starts the sound.
    pub delay: Duration,
    /// Playhead position to start from.
    pub offset: Duration,
    /// Extra iterations after the first; [`LOOP_FOREVER`] repeats forever.
    pub loops: i32,
    pub volume: f32,
    pub pan: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            interrupt: InterruptMode::None,
            delay: Duration::ZERO,
            offset: Duration::ZERO,
            loops: 0,
            volume: 1.0,
            pan: 0.0,
        }
    }
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interrupt(mut self, interrupt: InterruptMode) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_loops(mut self, loops: i32) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan;
        self
    }
}

#[derive(Default, Clone)]
struct Callbacks {
    on_complete: Option<SoundCallback>,
    on_loop: Option<SoundCallback>,
    on_ready: Option<SoundCallback>,
    on_play_failed: Option<SoundCallback>,
    on_play_interrupted: Option<SoundCallback>,
}

#[derive(Debug)]
struct InstanceState {
    play_state: PlayState,
    remaining_loops: i32,
    offset: Duration,
    volume: f32,
    pan: f32,
    muted: bool,
    interrupt: InterruptMode,
    /// The host voice has been started for this instance.
    native_bound: bool,
    pending_start: Option<CancellationToken>,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            play_state: PlayState::NotStarted,
            remaining_loops: 0,
            offset: Duration::ZERO,
            volume: 1.0,
            pan: 0.0,
            muted: false,
            interrupt: InterruptMode::None,
            native_bound: false,
            pending_start: None,
        }
    }
}

struct InstanceInner {
    id: u64,
    src: String,
    bridge: Arc<dyn AudioBridge>,
    tracker: Arc<InstanceTracker>,
    capabilities: CapabilitySet,
    channel_limit: Option<u32>,
    state: Mutex<InstanceState>,
    callbacks: Mutex<Callbacks>,
}

/// Handle to one playback session. Clones share the same session.
#[derive(Clone)]
pub struct SoundInstance {
    inner: Arc<InstanceInner>,
}

impl SoundInstance {
    pub(crate) fn new(
        src: impl Into<String>,
        bridge: Arc<dyn AudioBridge>,
        tracker: Arc<InstanceTracker>,
        capabilities: CapabilitySet,
        channel_limit: Option<u32>,
    ) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
                src: src.into(),
                bridge,
                tracker,
                capabilities,
                channel_limit,
                state: Mutex::new(InstanceState::default()),
                callbacks: Mutex::new(Callbacks::default()),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Process-wide unique id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn src(&self) -> &str {
        &self.inner.src
    }

    pub fn play_state(&self) -> PlayState {
        self.inner.state.lock().play_state
    }

    pub fn is_paused(&self) -> bool {
        self.play_state() == PlayState::Paused
    }

    pub fn remaining_loops(&self) -> i32 {
        self.inner.state.lock().remaining_loops
    }

    pub fn offset(&self) -> Duration {
        self.inner.state.lock().offset
    }

    pub fn interrupt_mode(&self) -> InterruptMode {
        self.inner.state.lock().interrupt
    }

    /// Whether the host voice has been started for this instance.
    pub fn has_native_handle(&self) -> bool {
        self.inner.state.lock().native_bound
    }

    /// Whether a delayed start is still waiting.
    pub fn has_pending_start(&self) -> bool {
        self.inner.state.lock().pending_start.is_some()
    }

    pub fn channel_limit(&self) -> Option<u32> {
        self.inner.channel_limit
    }

    // ------------------------------------------------------------------------
    // Playback control
    // ------------------------------------------------------------------------

    /// Starts playback, immediately or after `options.delay`.
    ///
    /// # Errors
    ///
    /// - [`SoundError::InvalidVolume`] / [`SoundError::InvalidPan`] for out-of-range values
    /// - [`SoundError::InstanceFinished`] on a terminal instance
    /// - [`SoundError::InvalidState`] when already played
    /// - [`SoundError::Internal`] for a delayed start with no async runtime
    /// - for an immediate start, anything [`begin_playing`](Self::begin_playing) reports
    pub fn play(&self, options: PlayOptions) -> Result<()> {
        validate_volume(options.volume)?;
        validate_pan(options.pan)?;
        if options.pan != 0.0 && !self.inner.capabilities.panning {
            return Err(SoundError::Unsupported("panning".to_string()));
        }

        {
            let mut state = self.inner.state.lock();
            if state.play_state.is_terminal() {
                return Err(SoundError::InstanceFinished(self.id()));
            }
            if state.play_state != PlayState::NotStarted || state.pending_start.is_some() {
                return Err(SoundError::InvalidState(format!(
                    "instance {} was already played",
                    self.id()
                )));
            }
            state.remaining_loops = options.loops;
            state.offset = options.offset;
            state.volume = options.volume;
            state.pan = options.pan;
            state.interrupt = options.interrupt;
        }

        self.inner.tracker.track(self);

        if options.delay.is_zero() {
            return self.begin_playing();
        }

        if !core_async::runtime::has_runtime() {
            self.inner.tracker.untrack(self.id());
            return Err(SoundError::Internal(
                "delayed start requires an async runtime".to_string(),
            ));
        }

        let token = CancellationToken::new();
        self.inner.state.lock().pending_start = Some(token.clone());

        debug!(
            instance = self.id(),
            src = %strip_path(self.src()),
            delay_ms = options.delay.as_millis() as u64,
            "start scheduled"
        );

        let instance = self.clone();
        let delay = options.delay;
        core_async::spawn_detached(async move {
            if sleep_unless_cancelled(delay, &token).await {
                if let Err(err) = instance.begin_playing() {
                    warn!(instance = instance.id(), error = %err, "deferred start failed");
                }
            }
        });

        Ok(())
    }

    /// Starts the host voice now: claim a channel, seek to the offset, then
    /// `begin` or `begin_looped`.
    ///
    /// Does nothing if the instance left `NotStarted` in the meantime.
    fn begin_playing(&self) -> Result<()> {
        let (offset, loops, interrupt) = {
            let mut state = self.inner.state.lock();
            state.pending_start = None;
            if state.play_state != PlayState::NotStarted {
                return Ok(());
            }
            (state.offset, state.remaining_loops, state.interrupt)
        };

        match self
            .inner
            .tracker
            .acquire_channel(self, self.inner.channel_limit, interrupt)
        {
            ChannelGrant::Granted => {}
            ChannelGrant::Replaced(victim) => {
                debug!(
                    instance = self.id(),
                    victim = victim.id(),
                    mode = ?interrupt,
                    "taking channel"
                );
                if let Err(err) = victim.interrupt() {
                    warn!(instance = victim.id(), error = %err, "interrupt failed");
                }
            }
            ChannelGrant::Exhausted { limit } => {
                let err = SoundError::ChannelsExhausted {
                    src: self.src().to_string(),
                    limit,
                };
                self.fail(&err);
                return Err(err);
            }
            ChannelGrant::Untracked => {
                debug!(instance = self.id(), "stopped before start");
                return Ok(());
            }
        }

        if let Err(err) = self.start_native(offset, loops) {
            let err = SoundError::from(err);
            self.fail(&err);
            return Err(err);
        }

        let stopped_meanwhile = {
            let mut state = self.inner.state.lock();
            if state.play_state == PlayState::NotStarted {
                state.play_state = PlayState::Playing;
                state.native_bound = true;
                false
            } else {
                true
            }
        };

        if stopped_meanwhile {
            if let Err(err) = self.inner.bridge.stop(self.src()) {
                warn!(instance = self.id(), error = %err, "stop after raced start failed");
            }
            self.cleanup();
            return Ok(());
        }

        debug!(
            instance = self.id(),
            src = %strip_path(self.src()),
            loops,
            "playing"
        );
        Ok(())
    }

    fn start_native(&self, offset: Duration, loops: i32) -> bridge_traits::error::Result<()> {
        let bridge = &self.inner.bridge;
        if !offset.is_zero() {
            bridge.set_current_time(self.src(), offset.as_secs_f64())?;
        }
        if loops != 0 {
            bridge.begin_looped(self.src())
        } else {
            bridge.begin(self.src())
        }
    }

    /// Pauses a playing instance. Pausing a paused instance is a no-op.
    pub fn pause(&self) -> Result<()> {
        match self.play_state() {
            PlayState::Playing => {}
            PlayState::Paused => return Ok(()),
            PlayState::NotStarted => {
                return Err(SoundError::InvalidState(format!(
                    "instance {} has not started",
                    self.id()
                )))
            }
            _ => return Err(SoundError::InstanceFinished(self.id())),
        }

        self.inner.bridge.pause(self.src())?;

        let mut state = self.inner.state.lock();
        if state.play_state == PlayState::Playing {
            state.play_state = PlayState::Paused;
        }
        debug!(instance = self.id(), "paused");
        Ok(())
    }

    /// Resumes a paused instance. Resuming a playing instance is a no-op.
    pub fn resume(&self) -> Result<()> {
        match self.play_state() {
            PlayState::Paused => {}
            PlayState::Playing => return Ok(()),
            PlayState::NotStarted => {
                return Err(SoundError::InvalidState(format!(
                    "instance {} has not started",
                    self.id()
                )))
            }
            _ => return Err(SoundError::InstanceFinished(self.id())),
        }

        self.inner.bridge.resume(self.src())?;

        let mut state = self.inner.state.lock();
        if state.play_state == PlayState::Paused {
            state.play_state = PlayState::Playing;
        }
        debug!(instance = self.id(), "resumed");
        Ok(())
    }

    /// Stops the instance and cancels any pending delayed start.
    ///
    /// The instance is `Finished` and untracked even when the host rejects
    /// the stop; the host error is still returned.
    ///
    /// The bridge is keyed by source, so a started instance stops the one
    /// host voice for its source. Other live instances of that source keep
    /// their own state (still `Playing`, still tracked) until they are
    /// stopped or the host reports an event for them.
    pub fn stop(&self) -> Result<()> {
        let (pending, bound) = {
            let mut state = self.inner.state.lock();
            if state.play_state.is_terminal() {
                return Err(SoundError::InstanceFinished(self.id()));
            }
            state.play_state = PlayState::Finished;
            let bound = std::mem::take(&mut state.native_bound);
            (state.pending_start.take(), bound)
        };

        if let Some(token) = pending {
            token.cancel();
            debug!(instance = self.id(), "pending start cancelled");
        }

        let result = if bound {
            self.inner.bridge.stop(self.src()).map_err(SoundError::from)
        } else {
            Ok(())
        };

        self.cleanup();
        debug!(instance = self.id(), src = %strip_path(self.src()), "stopped");
        result
    }

    /// Ends the instance because another one took its channel.
    pub fn interrupt(&self) -> Result<()> {
        let (pending, bound) = {
            let mut state = self.inner.state.lock();
            if state.play_state.is_terminal() {
                return Err(SoundError::InstanceFinished(self.id()));
            }
            state.play_state = PlayState::Interrupted;
            let bound = std::mem::take(&mut state.native_bound);
            (state.pending_start.take(), bound)
        };

        if let Some(token) = pending {
            token.cancel();
        }

        let result = if bound {
            self.inner.bridge.stop(self.src()).map_err(SoundError::from)
        } else {
            Ok(())
        };

        debug!(instance = self.id(), "interrupted");
        self.fire(|cb| cb.on_play_interrupted.clone());
        self.cleanup();
        result
    }

    /// Playhead position. Zero until the host voice exists.
    pub fn position(&self) -> Result<Duration> {
        if !self.has_native_handle() {
            return Ok(Duration::ZERO);
        }
        let seconds = self.inner.bridge.current_time(self.src())?;
        Ok(seconds_to_duration(seconds))
    }

    /// Moves the playhead.
    ///
    /// # Errors
    ///
    /// - [`SoundError::NoNativeHandle`] before the host voice exists
    /// - [`SoundError::NativeCallFailed`] when the host rejects the seek (e.g. out of range)
    pub fn set_position(&self, position: Duration) -> Result<()> {
        {
            let state = self.inner.state.lock();
            if state.play_state.is_terminal() {
                return Err(SoundError::InstanceFinished(self.id()));
            }
            if !state.native_bound {
                return Err(SoundError::NoNativeHandle(self.src().to_string()));
            }
        }

        self.inner
            .bridge
            .set_current_time(self.src(), position.as_secs_f64())?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Volume, pan, mute
    // ------------------------------------------------------------------------

    pub fn volume(&self) -> f32 {
        self.inner.state.lock().volume
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        validate_volume(volume)?;
        self.inner.state.lock().volume = volume;
        Ok(())
    }

    pub fn pan(&self) -> f32 {
        self.inner.state.lock().pan
    }

    /// Sets the stereo pan. Fails with [`SoundError::Unsupported`] on
    /// backends without panning.
    pub fn set_pan(&self, pan: f32) -> Result<()> {
        if !self.inner.capabilities.panning {
            return Err(SoundError::Unsupported("panning".to_string()));
        }
        validate_pan(pan)?;
        self.inner.state.lock().pan = pan;
        Ok(())
    }

    pub fn is_muted(&self) -> bool {
        self.inner.state.lock().muted
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.state.lock().muted = muted;
    }

    // ------------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------------

    /// Fires once, when the host reports the natural end of playback.
    pub fn set_on_complete(&self, callback: SoundCallback) {
        self.inner.callbacks.lock().on_complete = Some(callback);
    }

    /// Fires at the end of each iteration that still has loops remaining.
    pub fn set_on_loop(&self, callback: SoundCallback) {
        self.inner.callbacks.lock().on_loop = Some(callback);
    }

    pub fn set_on_ready(&self, callback: SoundCallback) {
        self.inner.callbacks.lock().on_ready = Some(callback);
    }

    pub fn set_on_play_failed(&self, callback: SoundCallback) {
        self.inner.callbacks.lock().on_play_failed = Some(callback);
    }

    pub fn set_on_play_interrupted(&self, callback: SoundCallback) {
        self.inner.callbacks.lock().on_play_interrupted = Some(callback);
    }

    // ------------------------------------------------------------------------
    // Host notifications
    // ------------------------------------------------------------------------

    /// Host reports the source ready to play.
    pub fn handle_ready(&self) {
        if !self.play_state().is_terminal() {
            self.fire(|cb| cb.on_ready.clone());
        }
    }

    /// Host reports one iteration finished. Returns whether `on_loop` fired.
    pub fn handle_loop(&self) -> bool {
        let fired = {
            let mut state = self.inner.state.lock();
            let live = matches!(state.play_state, PlayState::Playing | PlayState::Paused);
            if !live || state.remaining_loops == 0 {
                false
            } else {
                if state.remaining_loops > 0 {
                    state.remaining_loops -= 1;
                }
                true
            }
        };

        if fired {
            self.fire(|cb| cb.on_loop.clone());
        }
        fired
    }

    /// Host reports the natural end of playback. Returns whether the instance
    /// transitioned (and `on_complete` fired).
    pub fn handle_finished(&self) -> bool {
        let finished = {
            let mut state = self.inner.state.lock();
            if matches!(state.play_state, PlayState::Playing | PlayState::Paused) {
                state.play_state = PlayState::Finished;
                state.native_bound = false;
                true
            } else {
                false
            }
        };

        if finished {
            debug!(instance = self.id(), "completed");
            self.fire(|cb| cb.on_complete.clone());
            self.cleanup();
        }
        finished
    }

    /// Host reports the voice failed. Returns whether the instance transitioned.
    pub fn handle_failed(&self) -> bool {
        self.fail(&SoundError::NativeCallFailed(
            bridge_traits::BridgeError::OperationFailed("host reported failure".to_string()),
        ))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn fail(&self, reason: &SoundError) -> bool {
        let (failed, pending) = {
            let mut state = self.inner.state.lock();
            if state.play_state.is_terminal() {
                (false, None)
            } else {
                state.play_state = PlayState::Failed;
                state.native_bound = false;
                (true, state.pending_start.take())
            }
        };

        if let Some(token) = pending {
            token.cancel();
        }

        if failed {
            warn!(
                instance = self.id(),
                src = %strip_path(self.src()),
                error = %reason,
                "play failed"
            );
            self.fire(|cb| cb.on_play_failed.clone());
        }
        self.cleanup();
        failed
    }

    fn cleanup(&self) {
        self.inner.tracker.untrack(self.id());
    }

    fn fire(&self, pick: impl FnOnce(&Callbacks) -> Option<SoundCallback>) {
        let callback = pick(&self.inner.callbacks.lock());
        if let Some(callback) = callback {
            callback(self);
        }
    }
}

impl PartialEq for SoundInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SoundInstance {}

impl std::fmt::Debug for SoundInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SoundInstance")
            .field("id", &self.inner.id)
            .field("src", &self.inner.src)
            .field("play_state", &state.play_state)
            .field("remaining_loops", &state.remaining_loops)
            .field("native_bound", &state.native_bound)
            .finish()
    }
}

fn validate_volume(volume: f32) -> Result<()> {
    if (0.0..=1.0).contains(&volume) {
        Ok(())
    } else {
        Err(SoundError::InvalidVolume(volume))
    }
}

fn validate_pan(pan: f32) -> Result<()> {
    if (-1.0..=1.0).contains(&pan) {
        Ok(())
    } else {
        Err(SoundError::InvalidPan(pan))
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
