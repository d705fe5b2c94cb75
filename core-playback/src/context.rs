//! # Sound Context
//!
//! The dispatcher. A [`SoundContext`] owns the active backend, the id
//! registry and the preload handles; every playback call goes through it.
//!
//! ## Backend selection
//!
//! [`register_backends`](SoundContext::register_backends) tries kinds in
//! order and activates the first supported one. When nothing was ever
//! registered, the first call that needs a backend installs the Default
//! backend (see [`SoundConfig::auto_install_default`]). A failed explicit
//! registration disables that fallback so the context stays un-ready.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlayOptions, SoundConfig, SoundContext};
//! use core_runtime::config::CoreConfig;
//!
//! let context = SoundContext::new(CoreConfig::builder().build()?, SoundConfig::default())?;
//! context.register_preferred_backends()?;
//! context.register_for_preload("sfx/boom.ogg|sfx/boom.mp3", None, Some("boom"), None)?;
//!
//! let boom = context.play("boom", PlayOptions::default())?;
//! context.stop(Some("boom"))?;
//! ```

use crate::backend::{AudioBackend, Backend, BackendKind};
use crate::capabilities::{CapabilitySet, CapabilityValue};
use crate::config::SoundConfig;
use crate::error::{Result, SoundError};
use crate::instance::{PlayOptions, PlayState, SoundInstance};
use crate::preload::{PreloadHandle, PreloadHandlers};
use crate::registry::IdRegistry;
use crate::source::{resolve_source, SourceDescriptor};
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification from the host about a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum SoundEvent {
    /// Bytes of the source arrived.
    Progress { loaded: u64, total: u64 },
    /// The source can play.
    Ready,
    /// One iteration of a looped voice ended.
    Loop,
    /// Playback reached its natural end.
    Finished,
    /// The host could not load or play the source.
    Failed,
}

impl FromStr for SoundEvent {
    type Err = SoundError;

    /// Parses the event names hosts emit. `Progress` carries data and has no
    /// string form.
    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ready" | "loaded" | "canplaythrough" => Ok(SoundEvent::Ready),
            "loop" => Ok(SoundEvent::Loop),
            "finished" | "complete" | "ended" => Ok(SoundEvent::Finished),
            "failed" | "error" => Ok(SoundEvent::Failed),
            other => Err(SoundError::InvalidState(format!(
                "unknown sound event: {}",
                other
            ))),
        }
    }
}

/// Dispatcher over one active backend.
pub struct SoundContext {
    core: CoreConfig,
    config: SoundConfig,
    active: RwLock<Option<Arc<Backend>>>,
    registration_attempted: AtomicBool,
    ids: IdRegistry,
    preloads: RwLock<HashMap<String, PreloadHandle>>,
}

impl SoundContext {
    /// Creates a context. No backend is active yet.
    ///
    /// # Errors
    ///
    /// Returns [`SoundError::Config`] if `config` fails validation.
    pub fn new(core: CoreConfig, config: SoundConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            core,
            config,
            active: RwLock::new(None),
            registration_attempted: AtomicBool::new(false),
            ids: IdRegistry::new(),
            preloads: RwLock::new(HashMap::new()),
        })
    }

    /// Context over a default [`CoreConfig`] and [`SoundConfig`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(CoreConfig::builder().build()?, SoundConfig::default())
    }

    pub fn config(&self) -> &SoundConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Backend selection
    // ------------------------------------------------------------------------

    /// Activates the first supported backend among `kinds`.
    ///
    /// Replaces any backend that was active before. Instances created by the
    /// previous backend keep playing but drop out of bulk operations.
    ///
    /// # Errors
    ///
    /// Returns [`SoundError::NoSupportedBackend`] when none is supported; the
    /// previously active backend, if any, stays active.
    pub fn register_backends(&self, kinds: &[BackendKind]) -> Result<BackendKind> {
        self.registration_attempted.store(true, Ordering::SeqCst);

        for &kind in kinds {
            let backend = Backend::new(kind, &self.core, &self.config);
            if backend.is_supported() {
                let capabilities = backend.capabilities();
                *self.active.write() = Some(Arc::new(backend));
                info!(
                    backend = %kind,
                    channels = ?capabilities.channels,
                    panning = capabilities.panning,
                    "audio backend activated"
                );
                return Ok(kind);
            }
            debug!(backend = %kind, "backend not supported");
        }

        let tried = kinds
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ");
        warn!(tried = %tried, "no supported audio backend");
        Err(SoundError::NoSupportedBackend(tried))
    }

    /// [`register_backends`](Self::register_backends) over the configured
    /// priority list.
    pub fn register_preferred_backends(&self) -> Result<BackendKind> {
        self.register_backends(&self.config.backend_priority)
    }

    pub fn register_backend(&self, kind: BackendKind) -> Result<BackendKind> {
        self.register_backends(&[kind])
    }

    /// The active backend, installing the Default backend when nothing was
    /// ever registered.
    pub fn ensure_backend(&self) -> Result<Arc<Backend>> {
        if let Some(backend) = self.active_backend() {
            return Ok(backend);
        }

        if !self.config.auto_install_default || self.registration_attempted.load(Ordering::SeqCst) {
            return Err(SoundError::NoActiveBackend);
        }

        let mut active = self.active.write();
        if let Some(backend) = active.as_ref() {
            return Ok(backend.clone());
        }

        let backend = Backend::new(BackendKind::Default, &self.core, &self.config);
        if !backend.is_supported() {
            return Err(SoundError::NoActiveBackend);
        }

        let backend = Arc::new(backend);
        *active = Some(backend.clone());
        info!(backend = %BackendKind::Default, "audio backend installed on first use");
        Ok(backend)
    }

    fn active_backend(&self) -> Option<Arc<Backend>> {
        self.active.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.active.read().is_some()
    }

    pub fn active_backend_kind(&self) -> Option<BackendKind> {
        self.active.read().as_ref().map(|backend| backend.kind())
    }

    /// Capabilities of the active backend.
    pub fn capabilities(&self) -> Result<CapabilitySet> {
        Ok(self.ensure_backend()?.capabilities())
    }

    /// One capability of the active backend by key (`"mp3"`, `"channels"`, ...).
    pub fn capability(&self, key: &str) -> Result<Option<CapabilityValue>> {
        Ok(self.capabilities()?.get(key))
    }

    // ------------------------------------------------------------------------
    // Ids and sources
    // ------------------------------------------------------------------------

    /// The source registered under `value`, or `value` itself.
    pub fn resolve_id(&self, value: &str) -> String {
        self.ids.resolve(value)
    }

    /// Id lookup, then format negotiation when the result is still a list of
    /// alternatives.
    fn resolve_target(&self, value: &str, capabilities: &CapabilitySet) -> Result<String> {
        let resolved = self.ids.resolve(value);
        if !resolved.contains(self.config.delimiter) {
            return Ok(resolved);
        }
        let descriptor = resolve_source(
            &resolved,
            None,
            None,
            None,
            capabilities,
            self.config.delimiter,
        )?;
        Ok(descriptor.src)
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    /// Creates and plays an instance of `value` (an id or a path).
    ///
    /// Unregistered values are played as literal paths.
    ///
    /// # Errors
    ///
    /// - [`SoundError::NoActiveBackend`] if no backend can be activated
    /// - [`SoundError::UnsupportedFormat`] for a list with no playable alternative
    /// - any error of [`SoundInstance::play`]
    pub fn play(&self, value: &str, options: PlayOptions) -> Result<SoundInstance> {
        let backend = self.ensure_backend()?;
        let src = self.resolve_target(value, &backend.capabilities())?;

        let instance = backend.create(&src)?;
        debug!(
            instance = instance.id(),
            src = %strip_path(&src),
            requested = %value,
            "play"
        );
        instance.play(options)?;
        Ok(instance)
    }

    /// Pauses live instances, all of them or those of `id`. Returns how many
    /// paused.
    pub fn pause(&self, id: Option<&str>) -> Result<usize> {
        self.for_each_live(id, "pause", |instance| {
            if instance.play_state() == PlayState::Paused {
                return Ok(false);
            }
            instance.pause().map(|()| true)
        })
    }

    /// Resumes live instances, all of them or those of `id`.
    pub fn resume(&self, id: Option<&str>) -> Result<usize> {
        self.for_each_live(id, "resume", |instance| {
            if instance.play_state() == PlayState::Playing {
                return Ok(false);
            }
            instance.resume().map(|()| true)
        })
    }

    /// Stops live instances, all of them or those of `id`, including ones
    /// still waiting on a delayed start.
    pub fn stop(&self, id: Option<&str>) -> Result<usize> {
        self.for_each_live(id, "stop", |instance| instance.stop().map(|()| true))
    }

    fn for_each_live(
        &self,
        id: Option<&str>,
        operation: &'static str,
        apply: impl Fn(&SoundInstance) -> Result<bool>,
    ) -> Result<usize> {
        let backend = self.active_backend().ok_or(SoundError::NoActiveBackend)?;
        let src = match id {
            Some(id) => Some(self.resolve_target(id, &backend.capabilities())?),
            None => None,
        };

        let mut affected = 0;
        for instance in backend.tracker().snapshot().iter().rev() {
            if src.as_deref().is_some_and(|src| instance.src() != src) {
                continue;
            }
            match apply(instance) {
                Ok(true) => affected += 1,
                Ok(false) => {
                    debug!(instance = instance.id(), operation, "already in target state");
                }
                Err(err) if err.is_native_failure() => {
                    warn!(
                        instance = instance.id(),
                        operation,
                        transient = err.is_transient(),
                        error = %err,
                        "bulk operation failed"
                    );
                }
                Err(err) => {
                    debug!(instance = instance.id(), operation, error = %err, "bulk operation skipped");
                }
            }
        }

        debug!(operation, filter = ?id, affected, "bulk operation");
        Ok(affected)
    }

    /// Live instances of the active backend, oldest first.
    pub fn live_instances(&self) -> Vec<SoundInstance> {
        self.active_backend()
            .map(|backend| backend.tracker().snapshot())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Preloading
    // ------------------------------------------------------------------------

    /// Resolves `src` against the active backend, records `id`, and registers
    /// the chosen source with the backend.
    ///
    /// A numeric `data` value caps concurrent instances of the source.
    ///
    /// # Errors
    ///
    /// - [`SoundError::NoActiveBackend`] if no backend can be activated
    /// - [`SoundError::InvalidSource`] / [`SoundError::UnsupportedFormat`] from resolution
    /// - [`SoundError::NativeCallFailed`] when the host rejects registration
    pub fn register_for_preload(
        &self,
        src: &str,
        kind: Option<&str>,
        id: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> Result<SourceDescriptor> {
        let backend = self.ensure_backend()?;
        let capabilities = backend.capabilities();

        let channels_hint = data
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|count| u32::try_from(count).ok());

        let mut descriptor =
            resolve_source(src, kind, id, data, &capabilities, self.config.delimiter)?;

        if let Some(id) = id {
            self.ids.insert(id, descriptor.src.clone());
        }

        let handle = backend.register(&descriptor.src, channels_hint)?;
        if handle.src() != descriptor.src {
            descriptor.src = handle.src().to_string();
        }
        self.preloads
            .write()
            .insert(descriptor.src.clone(), handle);

        debug!(
            src = %strip_path(&descriptor.src),
            id = ?id,
            channels = ?channels_hint,
            "registered for preload"
        );
        Ok(descriptor)
    }

    /// Preload handle of a registered source, by id or path.
    pub fn preload_handle(&self, value: &str) -> Option<PreloadHandle> {
        let src = self.ids.resolve(value);
        self.preloads.read().get(&src).cloned()
    }

    /// Asset kinds and extensions a preloader should route here.
    pub fn preload_handlers(&self) -> PreloadHandlers {
        PreloadHandlers {
            types: self.config.preload_types.clone(),
            extensions: self.config.preload_extensions.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------------

    /// Routes a host notification about `src` (id or path) to its preload
    /// handle and to every live instance of it. Returns the number of
    /// instances the event changed.
    pub fn handle_sound_event(&self, src: &str, event: SoundEvent) -> Result<usize> {
        let backend = self.active_backend().ok_or(SoundError::NoActiveBackend)?;
        let src = self.ids.resolve(src);

        let handle = self.preloads.read().get(&src).cloned();
        if let Some(handle) = handle {
            match event {
                SoundEvent::Progress { loaded, total } => handle.handle_progress(loaded, total),
                SoundEvent::Ready => handle.handle_complete(),
                SoundEvent::Failed if !handle.is_loaded() => {
                    handle.handle_error("host reported a load failure")
                }
                _ => {}
            }
        }

        let mut affected = 0;
        for instance in backend.tracker().for_source(&src) {
            let changed = match event {
                SoundEvent::Progress { .. } => false,
                SoundEvent::Ready => {
                    instance.handle_ready();
                    true
                }
                SoundEvent::Loop => instance.handle_loop(),
                SoundEvent::Finished => instance.handle_finished(),
                SoundEvent::Failed => instance.handle_failed(),
            };
            if changed {
                affected += 1;
            }
        }

        debug!(src = %strip_path(&src), event = ?event, affected, "host event");
        Ok(affected)
    }
}

impl std::fmt::Debug for SoundContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundContext")
            .field("active", &self.active_backend_kind())
            .field("ids", &self.ids.len())
            .field("preloads", &self.preloads.read().len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_native::{InMemoryAudioHost, StaticEnvironment, StaticMediaProbe};

    fn context(config: SoundConfig) -> SoundContext {
        let core = CoreConfig::builder()
            .audio_bridge(Arc::new(InMemoryAudioHost::new()))
            .media_probe(Arc::new(StaticMediaProbe::all_common()))
            .environment(Arc::new(StaticEnvironment::plain()))
            .build()
            .unwrap();
        SoundContext::new(core, config).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let core = CoreConfig::builder().headless().build().unwrap();
        let config = SoundConfig {
            delimiter: '/',
            ..SoundConfig::default()
        };
        assert!(matches!(
            SoundContext::new(core, config),
            Err(SoundError::Config(_))
        ));
    }

    #[test]
    fn default_backend_installed_lazily() {
        let context = context(SoundConfig::default());
        assert!(!context.is_ready());

        context.capabilities().unwrap();

        assert_eq!(context.active_backend_kind(), Some(BackendKind::Default));
    }

    #[test]
    fn no_fallback_when_disabled() {
        let context = context(SoundConfig {
            auto_install_default: false,
            ..SoundConfig::default()
        });
        assert!(matches!(context.capabilities(), Err(SoundError::NoActiveBackend)));
        assert!(!context.is_ready());
    }

    #[test]
    fn failed_registration_leaves_context_unready() {
        let context = context(SoundConfig::default());

        let err = context.register_backend(BackendKind::External).unwrap_err();

        assert!(matches!(err, SoundError::NoSupportedBackend(ref tried) if tried == "external"));
        assert!(!context.is_ready());
        assert!(matches!(
            context.play("a.mp3", PlayOptions::default()),
            Err(SoundError::NoActiveBackend)
        ));
    }

    #[test]
    fn priority_order_picks_first_supported() {
        let context = context(SoundConfig::default());
        assert_eq!(context.register_preferred_backends().unwrap(), BackendKind::Html);
        assert_eq!(
            context.capability("channels").unwrap(),
            Some(CapabilityValue::Count(30))
        );
    }

    #[test]
    fn bulk_calls_need_active_backend() {
        let context = context(SoundConfig::default());
        assert!(matches!(context.stop(None), Err(SoundError::NoActiveBackend)));
        assert!(matches!(context.pause(Some("a")), Err(SoundError::NoActiveBackend)));
        assert!(context.live_instances().is_empty());
    }

    #[test]
    fn event_names() {
        assert_eq!("complete".parse::<SoundEvent>().unwrap(), SoundEvent::Finished);
        assert_eq!("Loop".parse::<SoundEvent>().unwrap(), SoundEvent::Loop);
        assert_eq!("error".parse::<SoundEvent>().unwrap(), SoundEvent::Failed);
        assert!("progress".parse::<SoundEvent>().is_err());
    }

    #[test]
    fn preload_handlers_follow_config() {
        let context = context(SoundConfig::default());
        let handlers = context.preload_handlers();
        assert_eq!(handlers.types, vec!["sound"]);
        assert_eq!(handlers.extensions, vec!["mp3", "ogg", "wav"]);
    }
}
