// src/core/replication/slave.rs

//! Master-side bookkeeping for a connected slave: the outbound byte
//! stream, a lock serializing writes to it, and the last acknowledged
//! offset. A disconnect is discovered lazily, the next time someone tries
//! to write to or GETACK it.

use crate::core::protocol::{RespCodec, RespFrame};
use dashmap::DashMap;
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};

/// The write half is shared with the connection task that owns the socket:
/// a slave record exists from `REPLCONF listening-port` onward, but the
/// connection still writes ordinary replies (e.g. the `capa` ack) to the
/// same stream until `PSYNC` hands it over for propagation exclusively.
pub struct SlaveRecord {
    writer: Arc<Mutex<OwnedWriteHalf>>,
    ack_offset: AtomicI64,
}

impl SlaveRecord {
    pub fn new(writer: Arc<Mutex<OwnedWriteHalf>>) -> Self {
        Self {
            writer,
            ack_offset: AtomicI64::new(0),
        }
    }

    pub fn ack_offset(&self) -> i64 {
        self.ack_offset.load(Ordering::SeqCst)
    }

    pub fn record_ack(&self, offset: i64) {
        self.ack_offset.store(offset, Ordering::SeqCst);
    }

    /// Writes a propagated frame's encoded bytes to this slave under its
    /// write lock. Returns `Err` on a broken pipe so the caller can drop the
    /// record from the registry.
    pub async fn write_all(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(bytes).await
    }
}

/// The set of slaves currently attached to this master, keyed by peer
/// address.
#[derive(Default)]
pub struct SlaveRegistry {
    slaves: DashMap<SocketAddr, std::sync::Arc<SlaveRecord>>,
}

impl SlaveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, addr: SocketAddr, record: std::sync::Arc<SlaveRecord>) {
        self.slaves.insert(addr, record);
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<std::sync::Arc<SlaveRecord>> {
        self.slaves.get(addr).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, addr: &SocketAddr) {
        self.slaves.remove(addr);
    }

    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(SocketAddr, std::sync::Arc<SlaveRecord>)> {
        self.slaves
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

/// Consumes `REPLCONF ACK <offset>` replies coming back from a slave over
/// the connection it was promoted on. Runs for the lifetime of the slave
/// link; removes the slave from the registry when the connection drops so a
/// dead slave stops being counted by `WAIT` or propagated to.
pub async fn spawn_ack_reader(
    state: Arc<crate::core::state::ServerState>,
    addr: SocketAddr,
    read_half: OwnedReadHalf,
    record: Arc<SlaveRecord>,
) {
    let mut framed = FramedRead::new(read_half, RespCodec);
    loop {
        let frame = match framed.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!(%addr, error = %e, "malformed frame on replica ack channel, closing");
                break;
            }
            None => {
                debug!(%addr, "replica ack channel closed");
                break;
            }
        };
        let Ok((name, args)) = frame.as_command_parts() else {
            continue;
        };
        if name != "replconf" || args.len() != 2 {
            continue;
        }
        if let (RespFrame::BulkString(Some(sub)), RespFrame::BulkString(Some(offset))) =
            (&args[0], &args[1])
        {
            if sub.eq_ignore_ascii_case(b"ack") {
                if let Ok(offset_str) = std::str::from_utf8(offset) {
                    if let Ok(offset) = offset_str.parse::<i64>() {
                        record.record_ack(offset);
                    }
                }
            }
        }
    }
    state.slaves.remove(&addr);
    state.replication.slave_disconnected();
}
