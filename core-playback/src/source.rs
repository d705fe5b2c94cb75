//! # Source Resolution
//!
//! Picks one concrete path out of a delimited list of format alternatives.
//!
//! A source such as `"sfx/boom.ogg|sfx/boom.mp3"` names the same sound in
//! several encodings. Resolution walks the list in order and keeps the first
//! path whose extension the active backend can play, so the caller controls
//! the preference order.

use crate::capabilities::CapabilitySet;
use crate::error::{Result, SoundError};
use serde::{Deserialize, Serialize};

/// Separator between alternatives in a source string.
pub const DEFAULT_DELIMITER: char = '|';

/// Asset kind reported when the caller gives none.
pub const SOUND_KIND: &str = "sound";

/// Outcome of resolving a source string, handed back to preloaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    pub data: Option<serde_json::Value>,
    /// File name without directory or extension.
    pub name: String,
    /// The chosen alternative.
    pub src: String,
    /// Lower-cased extension of `src`.
    pub extension: String,
}

/// Splits one alternative into `(name, extension)`.
///
/// Returns `None` when the path has no `.` or nothing after it.
pub fn split_path(path: &str) -> Option<(&str, String)> {
    let point = path.rfind('.')?;
    let extension = &path[point + 1..];
    if extension.is_empty() {
        return None;
    }

    let stem = &path[..point];
    let name = stem.rsplit('/').next().unwrap_or(stem);
    Some((name, extension.to_ascii_lowercase()))
}

/// Resolves `value` against `caps`.
///
/// # Errors
///
/// - [`SoundError::InvalidSource`] when `value` is empty or no alternative
///   has an extension at all
/// - [`SoundError::UnsupportedFormat`] when alternatives exist but none is
///   playable
pub fn resolve_source(
    value: &str,
    kind: Option<&str>,
    id: Option<&str>,
    data: Option<serde_json::Value>,
    caps: &CapabilitySet,
    delimiter: char,
) -> Result<SourceDescriptor> {
    if value.trim().is_empty() {
        return Err(SoundError::InvalidSource("empty source".to_string()));
    }

    let mut saw_extension = false;

    for alternative in value.split(delimiter) {
        let Some((name, extension)) = split_path(alternative) else {
            continue;
        };
        saw_extension = true;

        if caps.supports_extension(&extension) {
            return Ok(SourceDescriptor {
                kind: kind.unwrap_or(SOUND_KIND).to_string(),
                id: id.map(str::to_string),
                data,
                name: name.to_string(),
                src: alternative.to_string(),
                extension,
            });
        }
    }

    if saw_extension {
        Err(SoundError::UnsupportedFormat(value.to_string()))
    } else {
        Err(SoundError::InvalidSource(format!(
            "no file extension in {}",
            value
        )))
    }
}
