//! Errors reported by host bridges.

use thiserror::Error;

/// Failure of a single host call.
///
/// The dispatcher wraps these in its own `NativeCallFailed` error and never
/// retries on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The host lacks the entry point or the source was never initialized.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// The host accepted the call and then reported an error.
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// A seek landed outside the media's duration.
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl BridgeError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::OperationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_operation_failures_are_transient() {
        assert!(BridgeError::OperationFailed("busy".into()).is_transient());
        assert!(!BridgeError::NotAvailable("init".into()).is_transient());
        assert!(!BridgeError::OutOfRange("12s".into()).is_transient());
    }
}
