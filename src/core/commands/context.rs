// src/core/commands/context.rs

//! The execution context handed to every command: the database it runs
//! against and a handle to process-wide state (replication, slaves, config).

use crate::core::state::ServerState;
use crate::core::storage::Database;
use std::sync::Arc;

pub struct ExecutionContext<'a> {
    pub state: &'a Arc<ServerState>,
    pub db: &'a Database,
}
