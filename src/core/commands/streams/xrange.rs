// src/core/commands/streams/xrange.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_arg_count};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::storage::key_type::KeyType;
use crate::core::storage::stream_store::{StreamEntry, StreamId};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct XRange {
    pub stream: Bytes,
    start: StreamId,
    end: StreamId,
}

fn parse_start(s: &str) -> Result<StreamId, StoreError> {
    if s == "-" {
        return Ok(StreamId::MIN);
    }
    parse_bound(s, 0)
}

fn parse_end(s: &str) -> Result<StreamId, StoreError> {
    if s == "+" {
        return Ok(StreamId::MAX);
    }
    parse_bound(s, u64::MAX)
}

fn parse_bound(s: &str, default_seq: u64) -> Result<StreamId, StoreError> {
    if let Some((ms, seq)) = s.split_once('-') {
        Ok(StreamId::new(
            ms.parse().map_err(|_| StoreError::NotAnInteger)?,
            seq.parse().map_err(|_| StoreError::NotAnInteger)?,
        ))
    } else {
        Ok(StreamId::new(
            s.parse().map_err(|_| StoreError::NotAnInteger)?,
            default_seq,
        ))
    }
}

impl ParseCommand for XRange {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_arg_count(args, 3, "XRANGE")?;
        let stream = extract_bytes(&args[0])?;
        let start = parse_start(&extract_string(&args[1])?)?;
        let end = parse_end(&extract_string(&args[2])?)?;
        Ok(XRange { stream, start, end })
    }
}

pub fn entry_to_resp(entry: &StreamEntry) -> RespValue {
    let mut fields = Vec::with_capacity(entry.fields.len() * 2);
    for (field, value) in &entry.fields {
        fields.push(RespValue::BulkString(field.clone()));
        fields.push(RespValue::BulkString(value.clone()));
    }
    RespValue::Array(vec![
        RespValue::BulkString(entry.id.to_string().into()),
        RespValue::Array(fields),
    ])
}

#[async_trait]
impl ExecutableCommand for XRange {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        ctx.db.key_types.assert_type_or_none(&self.stream, KeyType::Stream)?;
        let entries = ctx.db.streams.range(&self.stream, self.start, self.end);
        Ok(RespValue::Array(entries.iter().map(entry_to_resp).collect()))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
