//! Environment probing traits.
//!
//! Backends decide whether they can run by asking the host two questions:
//! which media types it can decode, and which runtime it is embedded in.

use crate::platform::PlatformSendSync;

/// Answer to a media-type playability query.
///
/// Mirrors the three-valued result of `HTMLMediaElement.canPlayType`, where
/// the empty string and `"no"` both mean unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTypeSupport {
    No,
    Maybe,
    Probably,
}

impl PlayTypeSupport {
    /// Parse the raw string answer returned by a media element.
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "probably" => Self::Probably,
            "maybe" => Self::Maybe,
            _ => Self::No,
        }
    }

    /// Returns `true` unless the host ruled the type out.
    pub fn is_playable(&self) -> bool {
        !matches!(self, Self::No)
    }
}

/// Media-type playability query (e.g. an `<audio>` element's `canPlayType`).
pub trait MediaProbe: PlatformSendSync {
    /// Ask whether the host can play the given MIME type (`audio/mpeg`, ...).
    fn can_play_type(&self, mime: &str) -> PlayTypeSupport;
}

/// Runtime detection for the embedding host.
pub trait HostEnvironment: PlatformSendSync {
    /// Running inside the Adobe AIR runtime.
    fn is_adobe_air(&self) -> bool;

    /// Running on Android.
    fn is_android(&self) -> bool;

    /// The AIR-on-Android combination is served by the external player bridge.
    fn is_air_on_android(&self) -> bool {
        self.is_adobe_air() && self.is_android()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool, bool);

    impl HostEnvironment for Fixed {
        fn is_adobe_air(&self) -> bool {
            self.0
        }

        fn is_android(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn parses_can_play_type_answers() {
        assert_eq!(PlayTypeSupport::from_answer("probably"), PlayTypeSupport::Probably);
        assert_eq!(PlayTypeSupport::from_answer("maybe"), PlayTypeSupport::Maybe);
        assert_eq!(PlayTypeSupport::from_answer(""), PlayTypeSupport::No);
        assert_eq!(PlayTypeSupport::from_answer("no"), PlayTypeSupport::No);
        assert!(PlayTypeSupport::Maybe.is_playable());
        assert!(!PlayTypeSupport::No.is_playable());
    }

    #[test]
    fn air_on_android_requires_both() {
        assert!(Fixed(true, true).is_air_on_android());
        assert!(!Fixed(true, false).is_air_on_android());
        assert!(!Fixed(false, true).is_air_on_android());
    }
}
