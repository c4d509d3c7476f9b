// src/core/storage/mod.rs

//! Typed key-value storage: the key-type map and the per-type containers it
//! guards, bundled per database.

pub mod database;
pub mod key_type;
pub mod stream_store;
pub mod string_store;

pub use database::{Database, DatabaseRegistry};
pub use key_type::{KeyType, KeyTypeMap};
pub use stream_store::{IdSpec, StreamEntry, StreamId, StreamStore};
pub use string_store::{StringEntry, StringStore};
