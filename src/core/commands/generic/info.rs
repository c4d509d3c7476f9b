// src/core/commands/generic/info.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::extract_string;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct Info {
    pub section: Option<String>,
}

impl ParseCommand for Info {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        match args.len() {
            0 => Ok(Info { section: None }),
            1 => Ok(Info {
                section: Some(extract_string(&args[0])?.to_ascii_lowercase()),
            }),
            _ => Err(StoreError::WrongArgumentCount("INFO".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Info {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let body = match self.section.as_deref() {
            None | Some("replication") | Some("all") | Some("default") => {
                format!(
                    "# Replication\r\n{}\r\n",
                    ctx.state.info_replication_section().await
                )
            }
            Some(_) => String::new(),
        };
        Ok(RespValue::BulkString(body.into()))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY | CommandFlags::ADMIN
    }
}
