//! # Preload Handles
//!
//! Returned by backend registration so a preloading subsystem can follow a
//! source until the host reports it ready.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Progress notification passed to `on_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreloadProgress {
    pub loaded: u64,
    pub total: u64,
    /// `loaded / total`, clamped to `0.0..=1.0`.
    pub progress: f64,
}

/// What the dispatcher advertises to a preloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadHandlers {
    pub types: Vec<String>,
    pub extensions: Vec<String>,
}

#[cfg(not(target_arch = "wasm32"))]
pub type ProgressCallback = Arc<dyn Fn(&PreloadProgress) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type ProgressCallback = Arc<dyn Fn(&PreloadProgress)>;

#[cfg(not(target_arch = "wasm32"))]
pub type LoadCallback = Arc<dyn Fn(&PreloadHandle) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type LoadCallback = Arc<dyn Fn(&PreloadHandle)>;

#[cfg(not(target_arch = "wasm32"))]
pub type LoadErrorCallback = Arc<dyn Fn(&PreloadHandle, &str) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type LoadErrorCallback = Arc<dyn Fn(&PreloadHandle, &str)>;

#[derive(Debug, Default)]
struct PreloadState {
    progress: f64,
    loaded: bool,
    error: Option<String>,
}

#[derive(Default)]
struct PreloadCallbacks {
    on_progress: Option<ProgressCallback>,
    on_load: Option<LoadCallback>,
    on_error: Option<LoadErrorCallback>,
}

struct PreloadInner {
    src: String,
    preload_id: Option<String>,
    state: Mutex<PreloadState>,
    callbacks: Mutex<PreloadCallbacks>,
}

/// Shared handle to one registered source's load progress.
#[derive(Clone)]
pub struct PreloadHandle {
    inner: Arc<PreloadInner>,
}

impl PreloadHandle {
    /// A handle waiting for the host to report progress.
    pub fn pending(src: impl Into<String>, preload_id: Option<String>) -> Self {
        Self::with_state(src, preload_id, PreloadState::default())
    }

    /// A handle for a source the host loads on demand; it starts complete.
    pub fn loaded(src: impl Into<String>, preload_id: Option<String>) -> Self {
        Self::with_state(
            src,
            preload_id,
            PreloadState {
                progress: 1.0,
                loaded: true,
                error: None,
            },
        )
    }

    fn with_state(src: impl Into<String>, preload_id: Option<String>, state: PreloadState) -> Self {
        Self {
            inner: Arc::new(PreloadInner {
                src: src.into(),
                preload_id,
                state: Mutex::new(state),
                callbacks: Mutex::new(PreloadCallbacks::default()),
            }),
        }
    }

    pub fn src(&self) -> &str {
        &self.inner.src
    }

    pub fn preload_id(&self) -> Option<&str> {
        self.inner.preload_id.as_deref()
    }

    pub fn progress(&self) -> f64 {
        self.inner.state.lock().progress
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.state.lock().loaded
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    pub fn set_on_progress(&self, callback: ProgressCallback) {
        self.inner.callbacks.lock().on_progress = Some(callback);
    }

    pub fn set_on_load(&self, callback: LoadCallback) {
        self.inner.callbacks.lock().on_load = Some(callback);
    }

    pub fn set_on_error(&self, callback: LoadErrorCallback) {
        self.inner.callbacks.lock().on_error = Some(callback);
    }

    /// Host reported `loaded` of `total` bytes.
    pub fn handle_progress(&self, loaded: u64, total: u64) {
        let progress = if total == 0 {
            0.0
        } else {
            (loaded as f64 / total as f64).clamp(0.0, 1.0)
        };
        self.inner.state.lock().progress = progress;

        let callback = self.inner.callbacks.lock().on_progress.clone();
        if let Some(callback) = callback {
            callback(&PreloadProgress {
                loaded,
                total,
                progress,
            });
        }
    }

    /// Host reported the source ready. `on_load` fires on the first report only.
    pub fn handle_complete(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.loaded {
                return;
            }
            state.progress = 1.0;
            state.loaded = true;
        }

        let callback = self.inner.callbacks.lock().on_load.clone();
        if let Some(callback) = callback {
            callback(self);
        }
    }

    /// Host reported a load failure.
    pub fn handle_error(&self, message: &str) {
        self.inner.state.lock().error = Some(message.to_string());

        let callback = self.inner.callbacks.lock().on_error.clone();
        if let Some(callback) = callback {
            callback(self, message);
        }
    }
}

impl std::fmt::Debug for PreloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PreloadHandle")
            .field("src", &self.inner.src)
            .field("preload_id", &self.inner.preload_id)
            .field("progress", &state.progress)
            .field("loaded", &state.loaded)
            .field("error", &state.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn progress_is_clamped_and_reported() {
        let handle = PreloadHandle::pending("a.mp3", None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        handle.set_on_progress(Arc::new(move |p: &PreloadProgress| sink.lock().push(p.progress)));

        handle.handle_progress(50, 200);
        handle.handle_progress(300, 200);
        handle.handle_progress(1, 0);

        assert_eq!(*seen.lock(), vec![0.25, 1.0, 0.0]);
        assert!(!handle.is_loaded());
    }

    #[test]
    fn complete_fires_once() {
        let handle = PreloadHandle::pending("a.mp3", None);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        handle.set_on_load(Arc::new(move |_: &PreloadHandle| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        handle.handle_complete();
        handle.handle_complete();

        assert!(handle.is_loaded());
        assert_eq!(handle.progress(), 1.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loaded_handles_start_complete() {
        let handle = PreloadHandle::loaded("a.ogg", Some("p0".into()));
        assert!(handle.is_loaded());
        assert_eq!(handle.preload_id(), Some("p0"));
        assert_eq!(handle.progress(), 1.0);
    }

    #[test]
    fn error_is_recorded() {
        let handle = PreloadHandle::pending("a.wav", None);
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        handle.set_on_error(Arc::new(move |h: &PreloadHandle, msg: &str| {
            *sink.lock() = Some(format!("{}: {}", h.src(), msg));
        }));

        handle.handle_error("404");

        assert_eq!(handle.error().as_deref(), Some("404"));
        assert_eq!(seen.lock().as_deref(), Some("a.wav: 404"));
    }
}
