// src/core/storage/database.rs

//! A single numbered database: the key-type map plus one container per
//! data type, and a registry of all databases the process holds open.

use crate::core::storage::key_type::KeyTypeMap;
use crate::core::storage::stream_store::StreamStore;
use crate::core::storage::string_store::StringStore;

/// One logical database, addressed by index via `SELECT`.
#[derive(Default)]
pub struct Database {
    pub key_types: KeyTypeMap,
    pub strings: StringStore,
    pub streams: StreamStore,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `key` from whichever container currently holds it. Returns
    /// whether the key existed in either.
    pub fn remove_key(&self, key: &bytes::Bytes) -> bool {
        use crate::core::storage::key_type::KeyType;
        match self.key_types.get(key) {
            Some(KeyType::String) => self.strings.delete(&self.key_types, key),
            Some(KeyType::Stream) => self.streams.delete(&self.key_types, key),
            None => false,
        }
    }
}

/// The fixed-size set of databases a running process exposes, indexed
/// exactly as `SELECT` addresses them.
pub struct DatabaseRegistry {
    databases: Vec<Database>,
}

impl DatabaseRegistry {
    pub fn new(count: usize) -> Self {
        let mut databases = Vec::with_capacity(count.max(1));
        for _ in 0..count.max(1) {
            databases.push(Database::new());
        }
        Self { databases }
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Database> {
        self.databases.get(index)
    }
}
