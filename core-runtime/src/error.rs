//! Runtime error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value (e.g. a malformed log filter).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A host bridge the caller must inject is missing.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The global tracing subscriber could not be installed, usually because
    /// one already is.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
