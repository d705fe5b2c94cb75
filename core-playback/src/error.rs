//! # Sound Error Types
//!
//! Error types for the sound dispatcher. Every failure the host or the
//! dispatcher can produce is surfaced here; nothing is reported through
//! sentinel values.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during sound operations.
#[derive(Error, Debug)]
pub enum SoundError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// None of the source alternatives has an extension the backend plays.
    #[error("No supported format among: {0}")]
    UnsupportedFormat(String),

    /// Source string is empty or carries no file extension.
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// No backend has been activated and none could be installed.
    #[error("No active audio backend")]
    NoActiveBackend,

    /// None of the requested backends is supported in this environment.
    #[error("No supported backend among: {0}")]
    NoSupportedBackend(String),

    /// The host rejected a bridge call.
    #[error("Native call failed: {0}")]
    NativeCallFailed(#[from] BridgeError),

    /// Operation needs a host voice that playback has not created yet.
    #[error("No native handle for {0} yet")]
    NoNativeHandle(String),

    /// The backend does not offer this feature (e.g. panning on HTML audio).
    #[error("Unsupported by the active backend: {0}")]
    Unsupported(String),

    // ========================================================================
    // Instance Errors
    // ========================================================================
    /// The instance already reached a terminal state.
    #[error("Sound instance {0} has already finished")]
    InstanceFinished(u64),

    /// The instance is not in a state that allows the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Every channel for the source is busy and the interrupt mode forbids
    /// taking one over.
    #[error("All {limit} channels for {src} are in use")]
    ChannelsExhausted { src: String, limit: u32 },

    /// Invalid volume value (must be in range [0.0, 1.0]).
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    /// Invalid pan value (must be in range [-1.0, 1.0]).
    #[error("Invalid pan: {0} (must be between -1.0 and 1.0)")]
    InvalidPan(f32),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Invalid dispatcher configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    NoActiveBackend,
    InvalidSource,
    NativeCallFailed,
    InvalidState,
    InvalidArgument,
    Internal,
}

impl SoundError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SoundError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            SoundError::NoActiveBackend | SoundError::NoSupportedBackend(_) => {
                ErrorKind::NoActiveBackend
            }
            SoundError::InvalidSource(_) => ErrorKind::InvalidSource,
            SoundError::NativeCallFailed(_) => ErrorKind::NativeCallFailed,
            SoundError::NoNativeHandle(_)
            | SoundError::InstanceFinished(_)
            | SoundError::InvalidState(_)
            | SoundError::ChannelsExhausted { .. } => ErrorKind::InvalidState,
            SoundError::InvalidVolume(_)
            | SoundError::InvalidPan(_)
            | SoundError::Unsupported(_)
            | SoundError::Config(_) => ErrorKind::InvalidArgument,
            SoundError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the host reported the failure.
    pub fn is_native_failure(&self) -> bool {
        matches!(self, SoundError::NativeCallFailed(_))
    }

    /// Returns `true` if the host might accept the same call later.
    pub fn is_transient(&self) -> bool {
        match self {
            SoundError::NativeCallFailed(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<core_runtime::Error> for SoundError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::Internal(msg) => SoundError::Internal(msg),
            other => SoundError::Config(other.to_string()),
        }
    }
}

/// Result type for sound operations.
pub type Result<T> = std::result::Result<T, SoundError>;
