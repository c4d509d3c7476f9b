// src/connection/handler.rs

//! The per-connection request loop: decode one RESP array, route it,
//! encode the reply, repeat. `PSYNC` diverts the connection permanently into
//! a replication link instead of returning to this loop.
//!
//! The write half is held behind a shared `Arc<Mutex<..>>` rather than a
//! plain `FramedWrite` for the whole connection lifetime, since a
//! `REPLCONF listening-port` can register this connection as a slave record
//! (see `router::dispatch_client`) well before `PSYNC` hands it off —
//! ordinary replies (e.g. the `capa` ack) and, later, propagated writes both
//! need to land on the same stream.

use crate::connection::session::SessionState;
use crate::core::handler::router::{self, RouteOutcome};
use crate::core::protocol::{RespCodec, RespFrame, RespValue, write_raw_snapshot};
use crate::core::replication::slave::{SlaveRecord, spawn_ack_reader};
use crate::core::replication::snapshot::encode_snapshot;
use crate::core::state::{ClientInfo, ServerState};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

/// The read/write deadline applied to ordinary RESP traffic; cleared
/// permanently once a connection is promoted to a replication link.
const REQUEST_DEADLINE: Duration = Duration::from_secs(2);

/// Runs one client connection to completion: registers it, serves requests
/// until EOF or an unrecoverable decode error, then deregisters it.
pub async fn run(socket: TcpStream, addr: SocketAddr, state: Arc<ServerState>) {
    state.clients.insert(
        addr,
        ClientInfo {
            addr,
            connected_at: Instant::now(),
        },
    );

    if let Err(e) = socket.set_nodelay(true) {
        warn!(%addr, error = %e, "failed to set TCP_NODELAY");
    }

    match serve(socket, addr, state.clone()).await {
        Ok(()) => debug!(%addr, "connection closed"),
        Err(e) => warn!(%addr, error = %e, "connection terminated with an error"),
    }

    state.clients.remove(&addr);
}

/// Encodes `frame` and writes it to `writer` under its lock.
async fn write_reply(writer: &Arc<Mutex<OwnedWriteHalf>>, frame: RespFrame) -> std::io::Result<()> {
    let bytes = frame.encode_to_vec().map_err(std::io::Error::other)?;
    let mut guard = writer.lock().await;
    guard.write_all(&bytes).await
}

async fn serve(
    socket: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> std::io::Result<()> {
    let (read_half, write_half) = socket.into_split();
    let mut reader = FramedRead::new(read_half, RespCodec);
    let writer = Arc::new(Mutex::new(write_half));
    let mut session = SessionState::new();

    loop {
        let frame = match tokio::time::timeout(REQUEST_DEADLINE, reader.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                let value: RespValue = e.into();
                let _ = write_reply(&writer, value.into()).await;
                return Ok(());
            }
            Ok(None) => return Ok(()),
            Err(_) => return Ok(()),
        };

        let (name, args) = match frame.as_command_parts() {
            Ok(parts) => parts,
            Err(e) => {
                let value: RespValue = e.into();
                let _ = write_reply(&writer, value.into()).await;
                continue;
            }
        };

        match router::dispatch_client(&state, &mut session, addr, &writer, &name, args, &frame).await {
            Ok(RouteOutcome::Reply(value)) => {
                write_reply(&writer, value.into()).await?;
            }
            Ok(RouteOutcome::PromoteToReplica) => {
                return promote_to_replica(reader, writer, addr, state).await;
            }
            Err(e) => {
                write_reply(&writer, e.into()).await?;
            }
        }
    }
}

/// Completes the `PSYNC` handoff: sends `FULLRESYNC` and the raw snapshot
/// frame, then spawns a background ack reader off the read half; never
/// returns to the request loop. The `SlaveRecord` itself was already
/// created (and counted) at `REPLCONF listening-port` time; this just looks
/// it up. A client that somehow reaches `PSYNC` without that handshake step
/// is registered here as a fallback so propagation still reaches it.
async fn promote_to_replica(
    reader: FramedRead<tokio::net::tcp::OwnedReadHalf, RespCodec>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> std::io::Result<()> {
    let replid = state.replication.replid.clone();
    let offset = state.replication.offset();

    let record = match state.slaves.get(&addr) {
        Some(record) => record,
        None => {
            let record = Arc::new(SlaveRecord::new(writer.clone()));
            state.slaves.insert(addr, record.clone());
            state.replication.slave_connected();
            record
        }
    };

    {
        let mut guard = writer.lock().await;
        guard
            .write_all(format!("+FULLRESYNC {replid} {offset}\r\n").as_bytes())
            .await?;

        let db = state
            .databases
            .get(0)
            .expect("database registry always has at least one database");
        let payload = encode_snapshot(db);
        write_raw_snapshot(&mut *guard, &payload)
            .await
            .map_err(std::io::Error::other)?;
    }

    let read_half = reader.into_inner();
    info!(%addr, "promoted connection to replica link");

    spawn_ack_reader(state, addr, read_half, record).await;
    Ok(())
}
