// src/core/commands/string/get.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::storage::key_type::KeyType;
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct Get {
    pub key: Bytes,
}

impl ParseCommand for Get {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 1, "GET")?;
        Ok(Get {
            key: extract_bytes(&args[0])?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for Get {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        ctx.db.key_types.assert_type_or_none(&self.key, KeyType::String)?;
        Ok(match ctx.db.strings.get(&ctx.db.key_types, &self.key) {
            Some(value) => RespValue::BulkString(value),
            None => RespValue::Null,
        })
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
