//! Symbolic id → source path table filled during preload registration.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps ids given at preload time to the resolved source path.
///
/// Entries are never removed. Values that were never registered resolve to
/// themselves, so a path can always be used where an id is expected.
#[derive(Debug, Default)]
pub struct IdRegistry {
    entries: RwLock<HashMap<String, String>>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id → src`, replacing any previous mapping for `id`.
    pub fn insert(&self, id: impl Into<String>, src: impl Into<String>) {
        self.entries.write().insert(id.into(), src.into());
    }

    /// The registered source for `value`, or `value` itself.
    pub fn resolve(&self, value: &str) -> String {
        self.entries
            .read()
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.entries.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn unregistered_values_fall_through() {
        let registry = IdRegistry::new();
        registry.insert("boom", "sfx/boom.ogg");

        assert_eq!(registry.resolve("boom"), "sfx/boom.ogg");
        assert_eq!(registry.resolve("missingId"), "missingId");
        assert_eq!(registry.get("missingId"), None);
        assert!(registry.contains("boom"));
    }

    #[test]
    fn later_registration_replaces() {
        let registry = IdRegistry::new();
        registry.insert("theme", "a.mp3");
        registry.insert("theme", "b.mp3");

        assert_eq!(registry.resolve("theme"), "b.mp3");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_inserts() {
        let registry = Arc::new(IdRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || registry.insert(format!("id{i}"), format!("s{i}.wav")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.resolve("id3"), "s3.wav");
    }
}
