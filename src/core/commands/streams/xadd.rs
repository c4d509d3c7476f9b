// src/core/commands/streams/xadd.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_min_args};
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::storage::stream_store::IdSpec;
use async_trait::async_trait;
use bytes::Bytes;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct XAdd {
    pub stream: Bytes,
    id_raw: String,
    pub fields: IndexMap<Bytes, Bytes>,
}

impl ParseCommand for XAdd {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        validate_min_args(args, 4, "XADD")?;
        if (args.len() - 2) % 2 != 0 {
            return Err(StoreError::WrongArgumentCount("XADD".to_string()));
        }
        let stream = extract_bytes(&args[0])?;
        let id_raw = extract_string(&args[1])?;
        let mut fields = IndexMap::new();
        let mut i = 2;
        while i < args.len() {
            let field = extract_bytes(&args[i])?;
            let value = extract_bytes(&args[i + 1])?;
            fields.insert(field, value);
            i += 2;
        }
        Ok(XAdd {
            stream,
            id_raw,
            fields,
        })
    }
}

#[async_trait]
impl ExecutableCommand for XAdd {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let id_spec = IdSpec::parse(&self.id_raw)?;
        let id = ctx
            .db
            .streams
            .add(&ctx.db.key_types, &self.stream, id_spec, self.fields.clone())?;
        Ok(RespValue::BulkString(id.to_string().into()))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::WRITE
    }

    /// `*`/`<ms>-*` are resolved against this node's wall clock and the
    /// stream's current tail, so the raw request can't be forwarded as-is:
    /// every slave would independently re-resolve its own ID and diverge
    /// from the master's stream contents. Rewrites the propagated frame to
    /// carry the already-assigned ID, so replay is a pure `Exact` insert
    /// everywhere downstream.
    fn rewrite_for_propagation(&self, reply: &RespValue) -> Option<RespFrame> {
        let RespValue::BulkString(id) = reply else {
            return None;
        };
        let mut items = vec![
            RespFrame::bulk("XADD"),
            RespFrame::bulk(self.stream.clone()),
            RespFrame::bulk(id.clone()),
        ];
        for (field, value) in &self.fields {
            items.push(RespFrame::bulk(field.clone()));
            items.push(RespFrame::bulk(value.clone()));
        }
        Some(RespFrame::array(items))
    }
}
