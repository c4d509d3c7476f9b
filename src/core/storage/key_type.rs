// src/core/storage/key_type.rs

//! The per-database key-type map: the single source of truth for which
//! data-type container a key's value lives in.

use crate::core::errors::StoreError;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// The type tag attached to a key. `None` is not stored explicitly; it is
/// simply the absence of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    String,
    Stream,
}

impl KeyType {
    /// The lowercase name reported by the `TYPE` command.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::String => "string",
            KeyType::Stream => "stream",
        }
    }
}

/// Maps key -> type tag for one database. Every storage proxy consults this
/// map before exposing a value, so it is never possible to read a key's data
/// through the wrong container.
#[derive(Debug, Default)]
pub struct KeyTypeMap {
    tags: RwLock<HashMap<Bytes, KeyType>>,
}

impl KeyTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag for `key`, or `None` if the key is untagged.
    pub fn get(&self, key: &Bytes) -> Option<KeyType> {
        self.tags.read().get(key).copied()
    }

    /// Tags `key` as `ty`, overwriting any previous tag.
    pub fn set(&self, key: Bytes, ty: KeyType) {
        self.tags.write().insert(key, ty);
    }

    /// Removes the tag for `key`, if any.
    pub fn remove(&self, key: &Bytes) {
        self.tags.write().remove(key);
    }

    /// Confirms that `key` is either untagged or tagged `expected`, failing
    /// with `WrongType` otherwise. Used by every proxy before it touches its
    /// own container.
    pub fn assert_type_or_none(&self, key: &Bytes, expected: KeyType) -> Result<(), StoreError> {
        match self.get(key) {
            None => Ok(()),
            Some(ty) if ty == expected => Ok(()),
            Some(_) => Err(StoreError::WrongType),
        }
    }
}
