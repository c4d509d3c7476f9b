// src/core/commands/generic/del.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, validate_min_args};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct Del {
    pub keys: Vec<Bytes>,
}

impl ParseCommand for Del {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_min_args(args, 1, "DEL")?;
        let keys = args.iter().map(extract_bytes).collect::<Result<_, _>>()?;
        Ok(Del { keys })
    }
}

#[async_trait]
impl ExecutableCommand for Del {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let mut count = 0i64;
        for key in &self.keys {
            if ctx.db.remove_key(key) {
                count += 1;
            }
        }
        Ok(RespValue::Integer(count))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::WRITE
    }
}
