// src/core/storage/stream_store.rs

//! The stream container: an ordered map keyed by `(ms, seq)` entry IDs,
//! with range scans and blocking-read subscriptions.

use crate::core::errors::StoreError;
use crate::core::storage::key_type::{KeyType, KeyTypeMap};
use bytes::Bytes;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Error text for a malformed `*`/`<ms>-*`/`<ms>-<seq>` ID spec.
pub const ERR_MUST_BE_GREATER_THAN_ZERO: &str =
    "ERR The ID specified in XADD must be greater than 0-0";
pub const ERR_EQUAL_OR_SMALLER: &str =
    "ERR The ID specified in XADD is equal or smaller than the target stream top item";

/// An entry ID: a pairwise-numeric `(ms, seq)` pair, rendered `<ms>-<seq>`.
/// Ordering is derived, so it compares `ms` before `seq` — *not*
/// byte-lexicographic on the decimal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for StreamId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ms_part, seq_part) = match s.split_once('-') {
            Some(parts) => parts,
            None => (s, "0"),
        };
        let ms = ms_part
            .parse()
            .map_err(|_| StoreError::InvalidState("ERR Invalid stream ID specified as stream command argument".into()))?;
        let seq = seq_part
            .parse()
            .map_err(|_| StoreError::InvalidState("ERR Invalid stream ID specified as stream command argument".into()))?;
        Ok(StreamId::new(ms, seq))
    }
}

/// How the client specified the ID half of an XADD call.
pub enum IdSpec {
    /// `*` — both components server-assigned.
    Auto,
    /// `<ms>-*` — ms given, seq server-assigned.
    AutoSeq(u64),
    /// `<ms>-<seq>` — both given.
    Exact(StreamId),
}

impl IdSpec {
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        if s == "*" {
            return Ok(IdSpec::Auto);
        }
        if let Some(ms_part) = s.strip_suffix("-*") {
            let ms = ms_part.parse().map_err(|_| {
                StoreError::InvalidState(
                    "ERR Invalid stream ID specified as stream command argument".into(),
                )
            })?;
            return Ok(IdSpec::AutoSeq(ms));
        }
        Ok(IdSpec::Exact(s.parse()?))
    }
}

#[derive(Debug, Clone)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: IndexMap<Bytes, Bytes>,
}

/// A single stream's data plus the set of live subscribers waiting on it.
#[derive(Default)]
struct Stream {
    entries: BTreeMap<StreamId, StreamEntry>,
    last_id: StreamId,
    subscribers: Vec<(u64, mpsc::Sender<StreamEntry>)>,
}

impl Stream {
    fn resolve_id(&self, spec: IdSpec) -> Result<StreamId, StoreError> {
        let id = match spec {
            IdSpec::Exact(id) => {
                if id == StreamId::MIN {
                    return Err(StoreError::InvalidState(
                        ERR_MUST_BE_GREATER_THAN_ZERO.to_string(),
                    ));
                }
                id
            }
            IdSpec::AutoSeq(ms) => {
                if !self.entries.is_empty() && ms == self.last_id.ms {
                    StreamId::new(ms, self.last_id.seq + 1)
                } else if ms == 0 {
                    StreamId::new(0, 1)
                } else {
                    StreamId::new(ms, 0)
                }
            }
            IdSpec::Auto => {
                let now_ms = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                if now_ms == self.last_id.ms {
                    StreamId::new(now_ms, self.last_id.seq + 1)
                } else {
                    StreamId::new(now_ms, 0)
                }
            }
        };
        if id <= self.last_id {
            return Err(StoreError::InvalidState(ERR_EQUAL_OR_SMALLER.to_string()));
        }
        Ok(id)
    }
}

#[derive(Default)]
pub struct StreamStore {
    streams: RwLock<std::collections::HashMap<Bytes, Stream>>,
    next_sub_handle: AtomicU64,
}

impl StreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, creating the stream lazily, and notifies any live
    /// subscriptions. Tags `key` as STREAM on first use.
    pub fn add(
        &self,
        key_type: &KeyTypeMap,
        key: &Bytes,
        id_spec: IdSpec,
        fields: IndexMap<Bytes, Bytes>,
    ) -> Result<StreamId, StoreError> {
        key_type.assert_type_or_none(key, KeyType::Stream)?;
        let mut streams = self.streams.write();
        let stream = streams.entry(key.clone()).or_default();
        let id = stream.resolve_id(id_spec)?;
        let entry = StreamEntry {
            id,
            fields: fields.clone(),
        };
        stream.entries.insert(id, entry.clone());
        stream.last_id = id;
        key_type.set(key.clone(), KeyType::Stream);

        stream
            .subscribers
            .retain(|(_, tx)| tx.try_send(entry.clone()).is_ok() || tx.is_closed());
        Ok(id)
    }

    /// Inclusive range scan from `start` to `end`.
    pub fn range(
        &self,
        key: &Bytes,
        start: StreamId,
        end: StreamId,
    ) -> Vec<StreamEntry> {
        let streams = self.streams.read();
        let Some(stream) = streams.get(key) else {
            return Vec::new();
        };
        stream
            .entries
            .range(start..=end)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Entries strictly greater than `after`, up to `count` (XREAD semantics).
    pub fn read_after(&self, key: &Bytes, after: StreamId, count: Option<usize>) -> Vec<StreamEntry> {
        let streams = self.streams.read();
        let Some(stream) = streams.get(key) else {
            return Vec::new();
        };
        let iter = stream
            .entries
            .range((std::ops::Bound::Excluded(after), std::ops::Bound::Unbounded))
            .map(|(_, e)| e.clone());
        match count {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn last_id(&self, key: &Bytes) -> StreamId {
        self.streams
            .read()
            .get(key)
            .map(|s| s.last_id)
            .unwrap_or_default()
    }

    /// Registers a bounded-channel subscription for new entries on `key`.
    /// Returns the handle and the receiving half.
    pub fn subscribe(&self, key: &Bytes) -> (u64, mpsc::Receiver<StreamEntry>) {
        let handle = self.next_sub_handle.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(64);
        let mut streams = self.streams.write();
        streams.entry(key.clone()).or_default().subscribers.push((handle, tx));
        (handle, rx)
    }

    /// Releases a subscription, dropping its sender.
    pub fn unsubscribe(&self, key: &Bytes, handle: u64) {
        if let Some(stream) = self.streams.write().get_mut(key) {
            stream.subscribers.retain(|(h, _)| *h != handle);
        }
    }

    /// Drops a stream entirely. Returns whether it existed.
    pub fn delete(&self, key_type: &KeyTypeMap, key: &Bytes) -> bool {
        let existed = self.streams.write().remove(key).is_some();
        if existed {
            key_type.remove(key);
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(store: &StreamStore, kt: &KeyTypeMap, key: &str, id: &str) -> Result<StreamId, StoreError> {
        let mut fields = IndexMap::new();
        fields.insert(Bytes::from_static(b"f"), Bytes::from_static(b"v"));
        store.add(kt, &Bytes::copy_from_slice(key.as_bytes()), IdSpec::parse(id).unwrap(), fields)
    }

    #[test]
    fn auto_seq_resolution_matches_scenario() {
        let store = StreamStore::new();
        let kt = KeyTypeMap::new();
        assert_eq!(add(&store, &kt, "s", "0-*").unwrap(), StreamId::new(0, 1));
        assert_eq!(add(&store, &kt, "s", "1-*").unwrap(), StreamId::new(1, 0));
        assert_eq!(add(&store, &kt, "s", "1-*").unwrap(), StreamId::new(1, 1));
        assert_eq!(add(&store, &kt, "s", "2-1").unwrap(), StreamId::new(2, 1));
        assert_eq!(add(&store, &kt, "s", "2-*").unwrap(), StreamId::new(2, 2));
        let err = add(&store, &kt, "s", "1-2").unwrap_err();
        assert_eq!(err.to_string(), ERR_EQUAL_OR_SMALLER);
        let err = add(&store, &kt, "s", "0-0").unwrap_err();
        assert_eq!(err.to_string(), ERR_MUST_BE_GREATER_THAN_ZERO);
    }

    #[test]
    fn range_is_inclusive() {
        let store = StreamStore::new();
        let kt = KeyTypeMap::new();
        add(&store, &kt, "s", "0-1").unwrap();
        add(&store, &kt, "s", "1-1").unwrap();
        let key = Bytes::from_static(b"s");
        let entries = store.range(&key, StreamId::MIN, StreamId::MAX);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, StreamId::new(0, 1));
        assert_eq!(entries[1].id, StreamId::new(1, 1));
    }
}
