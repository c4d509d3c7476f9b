// src/core/state/mod.rs

//! Process-wide shared state: one `Arc<ServerState>` handed to every
//! connection task and background worker.

pub mod replication;

use crate::config::Config;
use crate::core::errors::StoreError;
use crate::core::replication::slave::SlaveRegistry;
use crate::core::storage::DatabaseRegistry;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub use replication::{ReplicaLinkInfo, ReplicationRole, ReplicationState, generate_replid};

/// Introspection-only record of a currently connected client, used by
/// `CLIENT`-adjacent diagnostics; nothing in the command set mutates this
/// beyond insertion/removal at connect/disconnect.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub addr: SocketAddr,
    pub connected_at: Instant,
}

/// The central struct holding all shared, server-wide state: the database
/// registry, the replication state, the slave registry, and the resolved
/// configuration. Everything this crate's ambient concerns exclude (ACL
/// config, cluster state, scripting, pub/sub registry) simply has no field
/// here.
pub struct ServerState {
    pub config: Config,
    pub databases: DatabaseRegistry,
    pub replication: ReplicationState,
    pub slaves: SlaveRegistry,
    pub clients: DashMap<SocketAddr, ClientInfo>,
}

impl ServerState {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let role = match &config.replicaof {
            Some((host, port)) => ReplicationRole::Replica {
                host: host.clone(),
                port: *port,
            },
            None => ReplicationRole::Master,
        };
        let replid =
            generate_replid().map_err(|e| StoreError::Internal(format!("replid generation failed: {e}")))?;
        let databases = DatabaseRegistry::new(config.databases);

        Ok(Arc::new(Self {
            databases,
            replication: ReplicationState::new(replid, role),
            slaves: SlaveRegistry::new(),
            clients: DashMap::new(),
            config,
        }))
    }

    /// Renders the `INFO replication` section body.
    pub async fn info_replication_section(&self) -> String {
        let role = self.replication.role.lock().await;
        let mut lines = vec![match &*role {
            ReplicationRole::Master => "role:master".to_string(),
            ReplicationRole::Replica { host, port } => {
                format!("role:slave\r\nmaster_host:{host}\r\nmaster_port:{port}")
            }
        }];
        lines.push(format!("connected_slaves:{}", self.replication.connected_slaves()));
        lines.push(format!("master_replid:{}", self.replication.replid));
        lines.push(format!("master_repl_offset:{}", self.replication.offset()));
        lines.join("\r\n")
    }
}
