// src/core/storage/string_store.rs

//! The string container: values with an optional absolute-time expiry,
//! lazily reaped on access.

use crate::core::storage::key_type::{KeyType, KeyTypeMap};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;
use wildmatch::WildMatch;

/// `(value, expires_at)`. `expires_at` is an absolute monotonic instant so
/// expiry checks never depend on wall-clock adjustments.
#[derive(Debug, Clone)]
pub struct StringEntry {
    pub value: Bytes,
    pub expires_at: Option<Instant>,
}

impl StringEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
pub struct StringStore {
    entries: RwLock<HashMap<Bytes, StringEntry>>,
}

impl StringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally replaces the value and expiry for `key`, tagging it
    /// as STRING in `key_type`.
    pub fn set(
        &self,
        key_type: &KeyTypeMap,
        key: Bytes,
        value: Bytes,
        expires_at: Option<Instant>,
    ) {
        key_type.set(key.clone(), KeyType::String);
        self.entries
            .write()
            .insert(key, StringEntry { value, expires_at });
    }

    /// Returns `(value, present)`. A key whose expiry has passed is removed
    /// and reported absent.
    pub fn get(&self, key_type: &KeyTypeMap, key: &Bytes) -> Option<Bytes> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                key_type.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Peeks at an entry without removing it even if expired; used by
    /// callers (e.g. `SET ... GET`) that need the pre-expiry-check value in
    /// the same step as a WRONGTYPE check.
    pub fn peek(&self, key: &Bytes) -> Option<StringEntry> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|e| !e.is_expired(now))
            .cloned()
    }

    /// Removes `key` and its type tag. Returns whether it existed.
    pub fn delete(&self, key_type: &KeyTypeMap, key: &Bytes) -> bool {
        let existed = self.entries.write().remove(key).is_some();
        if existed {
            key_type.remove(key);
        }
        existed
    }

    /// Returns every present key matching `pattern` (`*`-style glob).
    /// Expired entries encountered during the scan are removed (two-phase:
    /// collect under the read lock, then delete under the write lock).
    pub fn keys(&self, key_type: &KeyTypeMap, pattern: &str) -> Vec<Bytes> {
        let matcher = WildMatch::new(pattern);
        let now = Instant::now();
        let mut expired = Vec::new();
        let mut matched = Vec::new();
        {
            let entries = self.entries.read();
            for (key, entry) in entries.iter() {
                if entry.is_expired(now) {
                    expired.push(key.clone());
                    continue;
                }
                if matcher.matches(&String::from_utf8_lossy(key)) {
                    matched.push(key.clone());
                }
            }
        }
        if !expired.is_empty() {
            let mut entries = self.entries.write();
            for key in &expired {
                entries.remove(key);
                key_type.remove(key);
            }
        }
        matched
    }
}
