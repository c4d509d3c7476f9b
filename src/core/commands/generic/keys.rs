// src/core/commands/generic/keys.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_string, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct Keys {
    pub pattern: String,
}

impl ParseCommand for Keys {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 1, "KEYS")?;
        Ok(Keys {
            pattern: extract_string(&args[0])?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for Keys {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let keys = ctx.db.strings.keys(&ctx.db.key_types, &self.pattern);
        Ok(RespValue::Array(
            keys.into_iter().map(RespValue::BulkString).collect(),
        ))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
