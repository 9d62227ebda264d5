//! Per-target-language translation cache.
//!
//! Maps `target language → encoded segment → translated segment`.  Keys are
//! the exact encoded segments (case-sensitive, placeholders included) and
//! entries are never evicted.  A single mutex guards the whole map; every
//! operation is a short critical section with no I/O.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct TranslationCache {
    by_language: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str, segment: &str) -> Option<String> {
        let map = self.by_language.lock().unwrap_or_else(|e| e.into_inner());
        map.get(language).and_then(|m| m.get(segment)).cloned()
    }

    /// Look up every segment under one lock; `None` marks a miss.
    pub fn get_many(&self, language: &str, segments: &[String]) -> Vec<Option<String>> {
        let map = self.by_language.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(language) {
            Some(entries) => segments.iter().map(|s| entries.get(s).cloned()).collect(),
            None => vec![None; segments.len()],
        }
    }

    pub fn insert(&self, language: &str, segment: String, translation: String) {
        let mut map = self.by_language.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(language.to_string())
            .or_default()
            .insert(segment, translation);
    }

    /// Number of entries cached for `language`.
    pub fn len(&self, language: &str) -> usize {
        let map = self.by_language.lock().unwrap_or_else(|e| e.into_inner());
        map.get(language).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        let map = self.by_language.lock().unwrap_or_else(|e| e.into_inner());
        map.values().all(HashMap::is_empty)
    }
}
