// src/core/replication/mod.rs

//! Master/replica replication: slave bookkeeping and propagation on the
//! master side, the outbound handshake and consume loop on the replica
//! side, and the snapshot payload both sides exchange at PSYNC time.

pub mod propagate;
pub mod replica;
pub mod slave;
pub mod snapshot;

use crate::core::state::ServerState;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Spawns the replica-side link task if this process was started with
/// `--replicaof`. A master has nothing to spawn here; slaves are registered
/// reactively as connections send `REPLCONF listening-port`.
pub fn spawn_replica_link_if_configured(
    state: Arc<ServerState>,
    shutdown: broadcast::Receiver<()>,
) -> Option<tokio::task::JoinHandle<()>> {
    let config = &state.config;
    let Some((host, port)) = config.replicaof.clone() else {
        return None;
    };
    info!("starting as a replica of {host}:{port}");
    Some(tokio::spawn(replica::run(state, host, port, shutdown)))
}
