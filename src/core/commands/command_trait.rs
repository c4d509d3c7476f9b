// src/core/commands/command_trait.rs

//! The traits every command struct implements: argument parsing and
//! execution against a database, plus the flags the router consults to
//! decide whether to propagate a successful write.

use crate::core::commands::context::ExecutionContext;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use async_trait::async_trait;
use bitflags::bitflags;

bitflags! {
    /// Properties the router consults before and after executing a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u32 {
        /// The command mutates storage and is a propagation candidate.
        const WRITE        = 1 << 0;
        /// The command only reads data.
        const READONLY      = 1 << 1;
        /// An administrative or connection-state command.
        const ADMIN         = 1 << 2;
        /// Never forwarded to slaves even if it mutates state (e.g. SELECT,
        /// which is connection-local).
        const NO_PROPAGATE  = 1 << 3;
    }
}

/// Parses a command's arguments (the array with the command name already
/// stripped) into its typed representation.
pub trait ParseCommand: Sized {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError>;
}

/// Executes a parsed command against a database.
#[async_trait]
pub trait ExecutableCommand {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError>;

    /// Flags describing this command; used by the router to decide
    /// propagation eligibility. Default: read-only, not propagated.
    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }

    /// Overridden by commands whose wire form resolves something
    /// nondeterministic at execution time (e.g. `XADD`'s auto-assigned ID)
    /// that every slave must replay identically rather than re-resolve on
    /// its own. `reply` is this command's own successful result. Returning
    /// `None` (the default) propagates the client's original request bytes
    /// unchanged.
    fn rewrite_for_propagation(&self, _reply: &RespValue) -> Option<RespFrame> {
        None
    }
}
