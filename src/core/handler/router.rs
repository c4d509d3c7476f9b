// src/core/handler/router.rs

//! Routes one decoded command to its handler. `SELECT`, `REPLCONF`, and
//! `PSYNC` are recognized here before generic dispatch because each
//! needs something `ExecutionContext` doesn't carry: connection-local
//! session state, or the raw socket itself.

use crate::connection::SessionState;
use crate::core::commands::Command;
use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::generic::psync::Psync;
use crate::core::commands::generic::replconf::ReplConf;
use crate::core::commands::generic::select::Select;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::replication::propagate::propagate;
use crate::core::replication::slave::SlaveRecord;
use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tracing::warn;

/// What the connection loop should do after routing one request.
pub enum RouteOutcome {
    /// Encode and send this reply, then keep reading requests as normal.
    Reply(RespValue),
    /// `PSYNC` was accepted: the caller must reply with `FULLRESYNC`, write
    /// the snapshot frame, and hand the socket off to the replication
    /// subsystem instead of returning to the request loop.
    PromoteToReplica,
}

/// Routes a command issued by a regular client connection. `addr` and
/// `writer` identify the connection itself: `REPLCONF listening-port`
/// registers a `SlaveRecord` against them immediately, ahead of the later
/// `PSYNC` that actually hands the connection off to the replication
/// subsystem, since a connected slave is master-side bookkeeping from the
/// moment it announces itself, not from the moment it finishes the
/// handshake.
pub async fn dispatch_client(
    state: &Arc<ServerState>,
    session: &mut SessionState,
    addr: SocketAddr,
    writer: &Arc<Mutex<OwnedWriteHalf>>,
    name: &str,
    args: &[RespFrame],
    original_frame: &RespFrame,
) -> Result<RouteOutcome, StoreError> {
    match name {
        "select" => {
            let cmd = Select::parse(args)?;
            if state.databases.get(cmd.db_index).is_none() {
                return Err(StoreError::InvalidArgument(
                    "DB index is out of range".to_string(),
                ));
            }
            session.current_db_index = cmd.db_index;
            Ok(RouteOutcome::Reply(RespValue::Simple("OK".to_string())))
        }
        "replconf" => {
            let cmd = ReplConf::parse(args)?;
            match cmd {
                ReplConf::ListeningPort(port) => {
                    session.replica_listening_port = Some(port);
                    if state.slaves.get(&addr).is_none() {
                        let record = Arc::new(SlaveRecord::new(writer.clone()));
                        state.slaves.insert(addr, record);
                        state.replication.slave_connected();
                    }
                }
                ReplConf::Capa | ReplConf::GetAck | ReplConf::Ack(_) => {}
            }
            Ok(RouteOutcome::Reply(RespValue::Simple("OK".to_string())))
        }
        "psync" => {
            Psync::parse(args)?;
            Ok(RouteOutcome::PromoteToReplica)
        }
        _ => {
            let command = Command::parse(name, args)?;
            let db = state.databases.get(session.current_db_index).ok_or_else(|| {
                StoreError::Internal("current database index out of range".to_string())
            })?;
            let mut ctx = ExecutionContext { state, db };
            let result = command.execute(&mut ctx).await?;

            let flags = command.flags();
            if flags.contains(CommandFlags::WRITE) && !flags.contains(CommandFlags::NO_PROPAGATE) {
                let rewritten = command.rewrite_for_propagation(&result);
                let propagated_frame = rewritten.as_ref().unwrap_or(original_frame);
                propagate(&state.slaves, &state.replication, propagated_frame).await;
            }

            Ok(RouteOutcome::Reply(result))
        }
    }
}

/// Replays one command from the master's propagated stream.
/// Always applies to database zero, since only string state is captured in
/// the initial snapshot and `SELECT` is never itself propagated. Errors are
/// logged and swallowed: a replica stays attached and keeps consuming the
/// stream rather than tearing down the link over one bad command, per the
/// recorded decision to log-and-continue on replay failures.
pub async fn dispatch_propagated(state: &Arc<ServerState>, name: &str, args: &[RespFrame]) {
    let command = match Command::parse(name, args) {
        Ok(command) => command,
        Err(e) => {
            warn!(%name, error = %e, "master propagated an unrecognized command, skipping");
            return;
        }
    };
    let Some(db) = state.databases.get(0) else {
        return;
    };
    let mut ctx = ExecutionContext { state, db };
    if let Err(e) = command.execute(&mut ctx).await {
        warn!(%name, error = %e, "error applying propagated command, continuing");
    }
}
