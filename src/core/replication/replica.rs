// src/core/replication/replica.rs

//! The replica-side outbound handshake and consume loop: this process
//! connects out to a master, negotiates `PSYNC`, loads the initial snapshot
//! into database zero, then replays the propagated command stream while
//! tracking bytes consumed.

use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, read_raw_snapshot};
use crate::core::replication::snapshot::apply_snapshot;
use crate::core::state::ServerState;
use crate::core::state::replication::{ReplicaLinkInfo, ReplicationRole};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::{info, warn};

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Runs forever, reconnecting with backoff whenever the link to the master
/// drops. Only returns when `shutdown` fires.
pub async fn run(state: Arc<ServerState>, host: String, port: u16, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
    *state.replication.role.lock().await = ReplicationRole::Replica {
        host: host.clone(),
        port,
    };
    let mut delay = INITIAL_RECONNECT_DELAY;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                info!("replica link shutting down");
                return;
            }
            result = run_one_cycle(&state, &host, port) => {
                match result {
                    Ok(()) => {
                        info!("connection to master at {host}:{port} closed");
                        delay = INITIAL_RECONNECT_DELAY;
                    }
                    Err(e) => {
                        warn!("replication cycle with {host}:{port} failed: {e}");
                    }
                }
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.recv() => { return; }
        }
        delay = (delay * 2).min(MAX_RECONNECT_DELAY);
    }
}

async fn run_one_cycle(state: &Arc<ServerState>, host: &str, port: u16) -> Result<(), StoreError> {
    let addr = format!("{host}:{port}");
    info!("connecting to master at {addr}");
    let mut stream = TcpStream::connect(&addr).await?;

    perform_handshake(state, &mut stream).await?;

    let master_replid = state
        .replication
        .replica_link
        .lock()
        .await
        .as_ref()
        .map(|l| l.master_replid.clone())
        .unwrap_or_default();

    let (read_half, mut write_half) = stream.into_split();
    let mut framed = FramedRead::new(read_half, crate::core::protocol::RespCodec);

    loop {
        use futures::StreamExt;
        let Some(frame) = framed.next().await else {
            return Ok(());
        };
        let frame = frame?;
        let frame_len = frame.encode_to_vec()?.len() as u64;

        let (name, args) = frame.as_command_parts()?;
        if name == "replconf" && args.len() == 2 {
            if let (RespFrame::BulkString(Some(sub)), RespFrame::BulkString(Some(_star))) =
                (&args[0], &args[1])
            {
                if sub.eq_ignore_ascii_case(b"getack") {
                    let offset_before = {
                        let mut link = state.replication.replica_link.lock().await;
                        let processed = link.as_ref().map(|l| l.processed_offset).unwrap_or(0);
                        if let Some(l) = link.as_mut() {
                            l.processed_offset += frame_len;
                        }
                        processed
                    };
                    let ack = RespFrame::array(vec![
                        RespFrame::bulk("REPLCONF"),
                        RespFrame::bulk("ACK"),
                        RespFrame::bulk(offset_before.to_string()),
                    ]);
                    write_half.write_all(&ack.encode_to_vec()?).await?;
                    continue;
                }
            }
        }

        crate::core::handler::router::dispatch_propagated(state, &name, args).await;
        let mut link = state.replication.replica_link.lock().await;
        if let Some(l) = link.as_mut() {
            l.processed_offset += frame_len;
        } else {
            *link = Some(ReplicaLinkInfo {
                master_replid: master_replid.clone(),
                processed_offset: frame_len,
            });
        }
    }
}

async fn perform_handshake(state: &Arc<ServerState>, stream: &mut TcpStream) -> Result<(), StoreError> {
    send_command(stream, &["PING"]).await?;
    expect_simple_reply(stream).await?;

    let own_port = state.config.port.to_string();
    send_command(stream, &["REPLCONF", "listening-port", &own_port]).await?;
    expect_simple_reply(stream).await?;

    send_command(stream, &["REPLCONF", "capa", "psync2"]).await?;
    expect_simple_reply(stream).await?;

    send_command(stream, &["PSYNC", "?", "-1"]).await?;
    let reply = read_line_reply(stream).await?;
    if !reply.starts_with("+FULLRESYNC ") {
        return Err(StoreError::Replication(format!(
            "unexpected PSYNC reply: {reply}"
        )));
    }
    let mut parts = reply.trim_start_matches('+').split_whitespace();
    let _keyword = parts.next();
    let master_replid = parts.next().unwrap_or_default().to_string();
    let start_offset: u64 = parts.next().unwrap_or("0").parse().unwrap_or(0);

    let payload = read_raw_snapshot(stream).await?;
    if let Some(db) = state.databases.get(0) {
        apply_snapshot(&payload, db).map_err(|e| StoreError::Replication(e.to_string()))?;
    }

    *state.replication.replica_link.lock().await = Some(ReplicaLinkInfo {
        master_replid,
        processed_offset: start_offset,
    });
    info!("initial sync with master complete, starting at offset {start_offset}");
    Ok(())
}

async fn send_command(stream: &mut TcpStream, parts: &[&str]) -> Result<(), StoreError> {
    let frame = RespFrame::array(parts.iter().map(|p| RespFrame::bulk(*p)).collect());
    stream.write_all(&frame.encode_to_vec()?).await?;
    Ok(())
}

async fn expect_simple_reply(stream: &mut TcpStream) -> Result<String, StoreError> {
    read_line_reply(stream).await
}

async fn read_line_reply(stream: &mut TcpStream) -> Result<String, StoreError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        stream.read_exact(&mut byte).await?;
        if byte[0] == b'\r' {
            stream.read_exact(&mut byte).await?;
            break;
        }
        line.push(byte[0]);
    }
    String::from_utf8(line).map_err(|e| StoreError::Malformed(e.to_string()))
}
