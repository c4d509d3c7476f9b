// src/core/state/replication.rs

//! Process-wide replication role and offset bookkeeping.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Which side of a master/replica pair this process is playing.
#[derive(Debug, Clone)]
pub enum ReplicationRole {
    Master,
    Replica { host: String, port: u16 },
}

/// Runtime info about this process's role as a replica. `None` once the
/// process is a master (the default).
#[derive(Debug, Default, Clone)]
pub struct ReplicaLinkInfo {
    pub master_replid: String,
    pub processed_offset: u64,
}

/// Process-wide replication state: role, 40-character replid, and two
/// monotonic offsets. The master offset advances by the
/// serialized byte length of every propagated write (master role) or every
/// consumed command (replica role); the second offset is a free-running
/// secondary counter kept for parity with the wire's `INFO replication`
/// field and is never read by command logic.
#[derive(Debug)]
pub struct ReplicationState {
    pub role: Mutex<ReplicationRole>,
    pub replid: String,
    pub master_repl_offset: AtomicI64,
    pub second_repl_offset: AtomicI64,
    pub replica_link: Mutex<Option<ReplicaLinkInfo>>,
    connected_slaves: AtomicU64,
}

impl ReplicationState {
    pub fn new(replid: String, role: ReplicationRole) -> Self {
        Self {
            role: Mutex::new(role),
            replid,
            master_repl_offset: AtomicI64::new(0),
            second_repl_offset: AtomicI64::new(-1),
            replica_link: Mutex::new(None),
            connected_slaves: AtomicU64::new(0),
        }
    }

    pub fn offset(&self) -> i64 {
        self.master_repl_offset.load(Ordering::SeqCst)
    }

    pub fn advance_offset(&self, by: i64) -> i64 {
        self.master_repl_offset.fetch_add(by, Ordering::SeqCst) + by
    }

    pub fn connected_slaves(&self) -> u64 {
        self.connected_slaves.load(Ordering::SeqCst)
    }

    pub fn slave_connected(&self) {
        self.connected_slaves.fetch_add(1, Ordering::SeqCst);
    }

    pub fn slave_disconnected(&self) {
        self.connected_slaves.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Generates a 40-character hex replication ID the way a master does at
/// startup: 20 random bytes, hex-encoded.
pub fn generate_replid() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; 20];
    getrandom::fill(&mut bytes)?;
    Ok(hex::encode(bytes))
}
