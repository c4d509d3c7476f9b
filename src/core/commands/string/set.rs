// src/core/commands/string/set.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_min_args};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::storage::key_type::KeyType;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The mutual-exclusion condition requested via `NX`/`XX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Condition {
    #[default]
    None,
    NotExists,
    Exists,
}

#[derive(Debug, Clone, Default)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    condition: Condition,
    expires_at: Option<Instant>,
    return_old: bool,
}

impl ParseCommand for Set {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_min_args(args, 2, "SET")?;
        let key = extract_bytes(&args[0])?;
        let value = extract_bytes(&args[1])?;

        let mut condition = Condition::None;
        let mut expires_at = None;
        let mut return_old = false;
        let mut saw_expiry = false;

        let mut i = 2;
        while i < args.len() {
            let opt = extract_string(&args[i])?.to_ascii_uppercase();
            match opt.as_str() {
                "NX" => {
                    if condition != Condition::None {
                        return Err(StoreError::SyntaxError);
                    }
                    condition = Condition::NotExists;
                }
                "XX" => {
                    if condition != Condition::None {
                        return Err(StoreError::SyntaxError);
                    }
                    condition = Condition::Exists;
                }
                "GET" => return_old = true,
                "EX" | "PX" | "EXAT" | "PXAT" => {
                    if saw_expiry {
                        return Err(StoreError::SyntaxError);
                    }
                    i += 1;
                    let raw = args.get(i).ok_or(StoreError::SyntaxError)?;
                    let amount: i64 = extract_string(raw)?
                        .parse()
                        .map_err(|_| StoreError::NotAnInteger)?;
                    expires_at = Some(resolve_expiry(&opt, amount)?);
                    saw_expiry = true;
                }
                _ => return Err(StoreError::SyntaxError),
            }
            i += 1;
        }

        Ok(Set {
            key,
            value,
            condition,
            expires_at,
            return_old,
        })
    }
}

fn resolve_expiry(opt: &str, amount: i64) -> Result<Instant, StoreError> {
    let now_instant = Instant::now();
    let now_system = SystemTime::now();
    match opt {
        "EX" => Ok(now_instant + Duration::from_secs(amount.max(0) as u64)),
        "PX" => Ok(now_instant + Duration::from_millis(amount.max(0) as u64)),
        "EXAT" => {
            let target = UNIX_EPOCH + Duration::from_secs(amount.max(0) as u64);
            Ok(instant_from_system(now_instant, now_system, target))
        }
        "PXAT" => {
            let target = UNIX_EPOCH + Duration::from_millis(amount.max(0) as u64);
            Ok(instant_from_system(now_instant, now_system, target))
        }
        _ => unreachable!(),
    }
}

/// Converts an absolute wall-clock deadline into the monotonic `Instant`
/// domain the string store's expiry checks use, anchored off the current
/// simultaneous `(Instant, SystemTime)` pair.
fn instant_from_system(now_instant: Instant, now_system: SystemTime, target: SystemTime) -> Instant {
    match target.duration_since(now_system) {
        Ok(remaining) => now_instant + remaining,
        Err(_) => now_instant,
    }
}

#[async_trait]
impl ExecutableCommand for Set {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        ctx.db.key_types.assert_type_or_none(&self.key, KeyType::String)?;
        let existing = ctx.db.strings.peek(&self.key);

        match self.condition {
            Condition::NotExists if existing.is_some() => {
                return Ok(if self.return_old {
                    RespValue::BulkString(existing.unwrap().value)
                } else {
                    RespValue::Null
                });
            }
            Condition::Exists if existing.is_none() => {
                return Ok(RespValue::Null);
            }
            _ => {}
        }

        ctx.db
            .strings
            .set(&ctx.db.key_types, self.key.clone(), self.value.clone(), self.expires_at);

        if self.return_old {
            Ok(match existing {
                Some(entry) => RespValue::BulkString(entry.value),
                None => RespValue::Null,
            })
        } else {
            Ok(RespValue::Simple("OK".to_string()))
        }
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::WRITE
    }
}
