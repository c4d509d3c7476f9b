// src/core/replication/propagate.rs

//! The propagation decorator: fans a successfully applied write out to
//! every attached slave and advances the master's replication offset by
//! the serialized length of what was sent.

use crate::core::protocol::RespFrame;
use crate::core::replication::slave::SlaveRegistry;
use crate::core::state::replication::ReplicationState;

/// Encodes `frame` (the client's original request, byte-for-byte) and
/// writes it to every slave, dropping any whose connection has gone away.
/// Advances `repl_state`'s master offset by the encoded length exactly
/// once, regardless of slave count.
pub async fn propagate(
    registry: &SlaveRegistry,
    repl_state: &ReplicationState,
    frame: &RespFrame,
) {
    let Ok(bytes) = frame.encode_to_vec() else {
        return;
    };
    repl_state.advance_offset(bytes.len() as i64);

    for (addr, slave) in registry.snapshot() {
        if slave.write_all(&bytes).await.is_err() {
            tracing::warn!(%addr, "dropping slave after failed write during propagation");
            registry.remove(&addr);
            repl_state.slave_disconnected();
        }
    }
}

/// Builds the `REPLCONF GETACK *` request frame sent to refresh a slave's
/// acknowledged offset.
pub fn getack_frame() -> RespFrame {
    RespFrame::array(vec![
        RespFrame::bulk("REPLCONF"),
        RespFrame::bulk("GETACK"),
        RespFrame::bulk("*"),
    ])
}

/// Implements the `WAIT` barrier: returns as soon as
/// the number of slaves whose acknowledged offset has reached `target`
/// equals or exceeds `num_replicas`, or once `timeout` elapses, whichever
/// comes first. The reply is always the best count observed, never an
/// error for falling short. Slaves already caught up at the start count
/// immediately; a background refresh GETACK is still issued to them so
/// their cached offset doesn't go stale, but its reply does not change the
/// count already credited for this call.
pub async fn wait_for_acks(
    registry: &SlaveRegistry,
    num_replicas: i64,
    target: i64,
    timeout: std::time::Duration,
) -> i64 {
    let getack = getack_frame();
    let Ok(getack_bytes) = getack.encode_to_vec() else {
        return 0;
    };

    let slaves = registry.snapshot();
    let mut already_caught_up = 0i64;
    let mut stale = Vec::new();
    for (addr, slave) in &slaves {
        if slave.ack_offset() >= target {
            already_caught_up += 1;
        } else {
            stale.push((*addr, slave.clone()));
        }
    }

    // Refresh everyone, including the already-caught-up set, per the
    // documented compatibility quirk -- but only count the initially-stale
    // set's replies toward the threshold.
    for (_, slave) in &slaves {
        let _ = slave.write_all(&getack_bytes).await;
    }

    if already_caught_up >= num_replicas || stale.is_empty() {
        return already_caught_up;
    }

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let caught_up = stale.iter().filter(|(_, s)| s.ack_offset() >= target).count() as i64;
        if already_caught_up + caught_up >= num_replicas || tokio::time::Instant::now() >= deadline {
            return already_caught_up + caught_up;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}
