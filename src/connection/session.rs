// src/connection/session.rs

//! Per-connection state: everything that belongs to one client socket
//! rather than to the process as a whole.

/// State private to a single connection, reset when the connection closes.
#[derive(Debug)]
pub struct SessionState {
    /// The database `SELECT` last pointed this connection at.
    pub current_db_index: usize,
    /// Set once `REPLCONF listening-port` has been seen, ahead of a
    /// subsequent `PSYNC` promoting this connection to a slave link.
    pub replica_listening_port: Option<u16>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_db_index: 0,
            replica_listening_port: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
