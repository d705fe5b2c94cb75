//! Audio bridge trait.
//!
//! The host performs the actual mechanics of playback; the core only decides
//! *what* to play and *when*. Sounds are identified by their resolved source
//! path, so two instances of the same path share one host-side voice.

use crate::{error::Result, platform::PlatformSendSync};

/// Host-provided audio mechanics.
///
/// Every method is synchronous: the host is expected to either perform the
/// operation immediately or queue it internally. Times cross the bridge in
/// seconds (`f64`), matching media element conventions.
///
/// # Errors
///
/// Implementations report failures through
/// [`BridgeError`](crate::error::BridgeError):
/// - [`NotAvailable`](crate::error::BridgeError::NotAvailable) when the host
///   does not know the source
/// - [`OutOfRange`](crate::error::BridgeError::OutOfRange) for seeks past the
///   end of the media
/// - [`OperationFailed`](crate::error::BridgeError::OperationFailed) for
///   anything else
pub trait AudioBridge: PlatformSendSync {
    /// Prepare a source for future playback (preload).
    fn init(&self, src: &str) -> Result<()>;

    /// Start playback of `src` once.
    fn begin(&self, src: &str) -> Result<()>;

    /// Start playback of `src`, repeating until stopped.
    fn begin_looped(&self, src: &str) -> Result<()>;

    /// Pause playback without releasing the source.
    fn pause(&self, src: &str) -> Result<()>;

    /// Resume a paused source.
    fn resume(&self, src: &str) -> Result<()>;

    /// Stop playback of `src`.
    fn stop(&self, src: &str) -> Result<()>;

    /// Current playhead of `src`, in seconds.
    fn current_time(&self, src: &str) -> Result<f64>;

    /// Move the playhead of `src` to `seconds`.
    fn set_current_time(&self, src: &str, seconds: f64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        Host {}

        impl AudioBridge for Host {
            fn init(&self, src: &str) -> Result<()>;
            fn begin(&self, src: &str) -> Result<()>;
            fn begin_looped(&self, src: &str) -> Result<()>;
            fn pause(&self, src: &str) -> Result<()>;
            fn resume(&self, src: &str) -> Result<()>;
            fn stop(&self, src: &str) -> Result<()>;
            fn current_time(&self, src: &str) -> Result<f64>;
            fn set_current_time(&self, src: &str, seconds: f64) -> Result<()>;
        }
    }

    #[test]
    fn bridge_is_object_safe() {
        let mut host = MockHost::new();
        host.expect_begin()
            .withf(|src| src == "intro.mp3")
            .times(1)
            .returning(|_| Ok(()));

        let bridge: Arc<dyn AudioBridge> = Arc::new(host);
        assert!(bridge.begin("intro.mp3").is_ok());
    }

    #[test]
    fn bridge_errors_propagate() {
        let mut host = MockHost::new();
        host.expect_set_current_time()
            .returning(|_, secs| Err(BridgeError::OutOfRange(format!("{secs}s"))));

        let err = host.set_current_time("intro.mp3", 99.0).unwrap_err();
        assert!(matches!(err, BridgeError::OutOfRange(_)));
        assert_eq!(err.to_string(), "Value out of range: 99s");
    }
}
