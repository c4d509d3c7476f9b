// src/core/commands/mod.rs

//! Every command this server understands, parsed into a typed representation
//! and dispatched through `ExecutableCommand`. Grouped into category modules
//! the way the reference command tree is, even though this crate's surface
//! is a small fraction of it.

pub mod command_trait;
pub mod context;
pub mod generic;
pub mod helpers;
pub mod streams;
pub mod string;

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;

/// A parsed, ready-to-execute command. `Select`, `ReplConf`, and `Psync` are
/// listed for completeness but the router never reaches `Command::parse` for
/// them — it recognizes those names first and handles them itself, since
/// they mutate connection state or take over the socket outright.
#[derive(Debug, Clone)]
pub enum Command {
    Ping(generic::ping::Ping),
    Echo(generic::echo::Echo),
    Set(string::set::Set),
    Get(string::get::Get),
    Keys(generic::keys::Keys),
    Type(generic::type_cmd::TypeInfo),
    Del(generic::del::Del),
    XAdd(streams::xadd::XAdd),
    XRange(streams::xrange::XRange),
    XRead(streams::xread::XRead),
    Info(generic::info::Info),
    Wait(generic::wait::Wait),
    ConfigGet(generic::config_cmd::ConfigGet),
}

impl Command {
    /// Parses `name` (already lowercased by the caller) and `args` (the
    /// command name already stripped) into a `Command`. Returns
    /// `UnknownCommand` for anything this server doesn't implement,
    /// including the connection-handoff commands the router special-cases
    /// before ever calling this.
    pub fn parse(name: &str, args: &[RespFrame]) -> Result<Self, StoreError> {
        Ok(match name {
            "ping" => Command::Ping(generic::ping::Ping::parse(args)?),
            "echo" => Command::Echo(generic::echo::Echo::parse(args)?),
            "set" => Command::Set(string::set::Set::parse(args)?),
            "get" => Command::Get(string::get::Get::parse(args)?),
            "keys" => Command::Keys(generic::keys::Keys::parse(args)?),
            "type" => Command::Type(generic::type_cmd::TypeInfo::parse(args)?),
            "del" => Command::Del(generic::del::Del::parse(args)?),
            "xadd" => Command::XAdd(streams::xadd::XAdd::parse(args)?),
            "xrange" => Command::XRange(streams::xrange::XRange::parse(args)?),
            "xread" => Command::XRead(streams::xread::XRead::parse(args)?),
            "info" => Command::Info(generic::info::Info::parse(args)?),
            "wait" => Command::Wait(generic::wait::Wait::parse(args)?),
            "config" => Command::ConfigGet(generic::config_cmd::ConfigGet::parse(args)?),
            other => return Err(StoreError::UnknownCommand(other.to_string())),
        })
    }
}

#[async_trait]
impl ExecutableCommand for Command {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        match self {
            Command::Ping(c) => c.execute(ctx).await,
            Command::Echo(c) => c.execute(ctx).await,
            Command::Set(c) => c.execute(ctx).await,
            Command::Get(c) => c.execute(ctx).await,
            Command::Keys(c) => c.execute(ctx).await,
            Command::Type(c) => c.execute(ctx).await,
            Command::Del(c) => c.execute(ctx).await,
            Command::XAdd(c) => c.execute(ctx).await,
            Command::XRange(c) => c.execute(ctx).await,
            Command::XRead(c) => c.execute(ctx).await,
            Command::Info(c) => c.execute(ctx).await,
            Command::Wait(c) => c.execute(ctx).await,
            Command::ConfigGet(c) => c.execute(ctx).await,
        }
    }

    fn flags(&self) -> CommandFlags {
        match self {
            Command::Ping(c) => c.flags(),
            Command::Echo(c) => c.flags(),
            Command::Set(c) => c.flags(),
            Command::Get(c) => c.flags(),
            Command::Keys(c) => c.flags(),
            Command::Type(c) => c.flags(),
            Command::Del(c) => c.flags(),
            Command::XAdd(c) => c.flags(),
            Command::XRange(c) => c.flags(),
            Command::XRead(c) => c.flags(),
            Command::Info(c) => c.flags(),
            Command::Wait(c) => c.flags(),
            Command::ConfigGet(c) => c.flags(),
        }
    }

    fn rewrite_for_propagation(&self, reply: &RespValue) -> Option<RespFrame> {
        match self {
            Command::Ping(c) => c.rewrite_for_propagation(reply),
            Command::Echo(c) => c.rewrite_for_propagation(reply),
            Command::Set(c) => c.rewrite_for_propagation(reply),
            Command::Get(c) => c.rewrite_for_propagation(reply),
            Command::Keys(c) => c.rewrite_for_propagation(reply),
            Command::Type(c) => c.rewrite_for_propagation(reply),
            Command::Del(c) => c.rewrite_for_propagation(reply),
            Command::XAdd(c) => c.rewrite_for_propagation(reply),
            Command::XRange(c) => c.rewrite_for_propagation(reply),
            Command::XRead(c) => c.rewrite_for_propagation(reply),
            Command::Info(c) => c.rewrite_for_propagation(reply),
            Command::Wait(c) => c.rewrite_for_propagation(reply),
            Command::ConfigGet(c) => c.rewrite_for_propagation(reply),
        }
    }
}
