// src/core/replication/snapshot.rs

//! The bootstrap snapshot payload carried inside the raw snapshot frame
//! sent immediately after `FULLRESYNC`. The on-disk/on-wire byte layout is
//! intentionally minimal: a magic header, a version byte, an entry count,
//! a flat run of length-prefixed key/value pairs, and a trailing checksum.
//! Only string entries are represented.

use crate::core::storage::database::Database;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc::{CRC_64_REDIS, Crc};

const MAGIC: &[u8; 8] = b"KVFORGE1";
const VERSION: u8 = 1;
const CHECKSUM_ALGO: Crc<u64> = Crc::<u64>::new(&CRC_64_REDIS);

/// Encodes every string key currently in `db` into a snapshot payload.
/// Stream entries are not represented; the bootstrap loader only needs to
/// round-trip strings.
pub fn encode_snapshot(db: &Database) -> Bytes {
    let keys = db.strings.keys(&db.key_types, "*");
    let mut entries = Vec::with_capacity(keys.len());
    for key in &keys {
        if let Some(value) = db.strings.get(&db.key_types, key) {
            entries.push((key.clone(), value));
        }
    }
    encode_body(&entries)
}

/// Lays out the header, entries, and trailing checksum shared by both the
/// empty baseline and a populated snapshot.
fn encode_body(entries: &[(Bytes, Bytes)]) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u32(entries.len() as u32);
    for (key, value) in entries {
        body.put_u32(key.len() as u32);
        body.put_slice(key);
        body.put_u32(value.len() as u32);
        body.put_slice(value);
    }

    let mut buf = BytesMut::with_capacity(MAGIC.len() + 1 + body.len() + 8);
    buf.put_slice(MAGIC);
    buf.put_u8(VERSION);
    buf.put_slice(&body);
    buf.put_u64(CHECKSUM_ALGO.checksum(&body));
    buf.freeze()
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot header too short")]
    Truncated,
    #[error("snapshot magic mismatch")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    BadVersion(u8),
    #[error("snapshot checksum mismatch")]
    BadChecksum,
}

/// Validates the magic/version header and trailing checksum, then applies
/// every string entry to `db` (database zero, per the bootstrap-loader
/// scope).
pub fn apply_snapshot(payload: &[u8], db: &Database) -> Result<(), SnapshotError> {
    if payload.len() < MAGIC.len() + 1 + 8 {
        return Err(SnapshotError::Truncated);
    }
    let (magic, rest) = payload.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let (&version, rest) = rest.split_first().expect("checked length above");
    if version != VERSION {
        return Err(SnapshotError::BadVersion(version));
    }
    let (body, checksum_bytes) = rest.split_at(rest.len() - 8);
    let expected = u64::from_be_bytes(checksum_bytes.try_into().expect("exactly 8 bytes"));
    if CHECKSUM_ALGO.checksum(body) != expected {
        return Err(SnapshotError::BadChecksum);
    }

    let mut buf = body;
    if buf.len() < 4 {
        return Err(SnapshotError::Truncated);
    }
    let count = buf.get_u32();
    for _ in 0..count {
        if buf.len() < 4 {
            return Err(SnapshotError::Truncated);
        }
        let key_len = buf.get_u32() as usize;
        if buf.len() < key_len {
            return Err(SnapshotError::Truncated);
        }
        let key = Bytes::copy_from_slice(&buf[..key_len]);
        buf.advance(key_len);

        if buf.len() < 4 {
            return Err(SnapshotError::Truncated);
        }
        let value_len = buf.get_u32() as usize;
        if buf.len() < value_len {
            return Err(SnapshotError::Truncated);
        }
        let value = Bytes::copy_from_slice(&buf[..value_len]);
        buf.advance(value_len);

        db.strings.set(&db.key_types, key, value, None);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_baseline_round_trips() {
        let baseline = encode_snapshot(&Database::new());
        let db = Database::new();
        apply_snapshot(&baseline, &db).unwrap();
        assert!(db.strings.keys(&db.key_types, "*").is_empty());
    }

    #[test]
    fn snapshot_round_trips_string_entries() {
        let db = Database::new();
        db.strings.set(
            &db.key_types,
            Bytes::from_static(b"foo"),
            Bytes::from_static(b"bar"),
            None,
        );
        let payload = encode_snapshot(&db);

        let target = Database::new();
        apply_snapshot(&payload, &target).unwrap();
        assert_eq!(
            target.strings.get(&target.key_types, &Bytes::from_static(b"foo")),
            Some(Bytes::from_static(b"bar"))
        );
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_snapshot(&Database::new()).to_vec();
        bytes[0] = b'X';
        assert!(matches!(apply_snapshot(&bytes, &Database::new()), Err(SnapshotError::BadMagic)));
    }
}
