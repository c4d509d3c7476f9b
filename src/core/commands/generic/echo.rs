// src/core/commands/generic/echo.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct Echo {
    pub message: Bytes,
}

impl ParseCommand for Echo {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 1, "ECHO")?;
        Ok(Echo {
            message: extract_bytes(&args[0])?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for Echo {
    async fn execute(&self, _ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        Ok(RespValue::BulkString(self.message.clone()))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN
    }
}
