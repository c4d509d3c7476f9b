// src/core/commands/generic/ping.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::extract_bytes;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct Ping {
    pub message: Option<Bytes>,
}

impl ParseCommand for Ping {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        match args.len() {
            0 => Ok(Ping { message: None }),
            1 => Ok(Ping {
                message: Some(extract_bytes(&args[0])?),
            }),
            _ => Err(StoreError::WrongArgumentCount("PING".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Ping {
    async fn execute(&self, _ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        Ok(match &self.message {
            Some(msg) => RespValue::BulkString(msg.clone()),
            None => RespValue::Simple("PONG".to_string()),
        })
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN
    }
}
