// src/core/commands/generic/config_cmd.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_string, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct ConfigGet {
    pub key: String,
}

impl ParseCommand for ConfigGet {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 2, "CONFIG")?;
        let subcommand = extract_string(&args[0])?;
        if !subcommand.eq_ignore_ascii_case("get") {
            return Err(StoreError::InvalidArgument(format!(
                "unsupported CONFIG subcommand: {subcommand}"
            )));
        }
        Ok(ConfigGet {
            key: extract_string(&args[1])?.to_ascii_lowercase(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for ConfigGet {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let value = match self.key.as_str() {
            "dir" => Some(ctx.state.config.dir.clone()),
            "dbfilename" => Some(ctx.state.config.dbfilename.clone()),
            _ => None,
        };
        Ok(match value {
            Some(v) => RespValue::Array(vec![
                RespValue::BulkString(self.key.clone().into()),
                RespValue::BulkString(v.into()),
            ]),
            None => RespValue::Array(vec![]),
        })
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN
    }
}
