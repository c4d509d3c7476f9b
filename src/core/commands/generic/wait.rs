// src/core/commands/generic/wait.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_string, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::replication::propagate::wait_for_acks;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Wait {
    pub num_replicas: i64,
    pub timeout_ms: i64,
}

impl ParseCommand for Wait {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 2, "WAIT")?;
        let num_replicas = extract_string(&args[0])?.parse().map_err(|_| StoreError::NotAnInteger)?;
        let timeout_ms = extract_string(&args[1])?.parse().map_err(|_| StoreError::NotAnInteger)?;
        Ok(Wait {
            num_replicas,
            timeout_ms,
        })
    }
}

#[async_trait]
impl ExecutableCommand for Wait {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let target = ctx.state.replication.offset();
        let timeout = if self.timeout_ms <= 0 {
            Duration::from_secs(10)
        } else {
            Duration::from_millis(self.timeout_ms as u64)
        };
        let achieved = wait_for_acks(&ctx.state.slaves, self.num_replicas, target, timeout).await;
        Ok(RespValue::Integer(achieved))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN | CommandFlags::NO_PROPAGATE
    }
}
