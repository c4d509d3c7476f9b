// src/core/commands/generic/select.rs

//! `SELECT` changes connection-local state (the active database index) and
//! is therefore handled specially by the router, not through the generic
//! `ExecutableCommand` path.

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_string, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct Select {
    pub db_index: usize,
}

impl ParseCommand for Select {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 1, "SELECT")?;
        let db_index = extract_string(&args[0])?
            .parse::<usize>()
            .map_err(|_| StoreError::InvalidArgument("invalid DB index".to_string()))?;
        Ok(Select { db_index })
    }
}

#[async_trait]
impl ExecutableCommand for Select {
    async fn execute(&self, _ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        Err(StoreError::Internal(
            "SELECT must be handled by the router, not executed directly".to_string(),
        ))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN | CommandFlags::NO_PROPAGATE
    }
}
