// src/core/commands/streams/xread.rs

use crate::core::commands::command_trait::{CommandFlags, ExecutableCommand, ParseCommand};
use crate::core::commands::context::ExecutionContext;
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::commands::streams::xrange::entry_to_resp;
use crate::core::errors::StoreError;
use crate::core::protocol::{RespFrame, RespValue};
use crate::core::storage::stream_store::StreamId;
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::select_all;
use std::time::Duration;

/// `XREAD BLOCK 0` is documented as "wait indefinitely"; this implementation
/// substitutes a large finite cap instead, so a stalled reader doesn't
/// hold a task open forever.
const INDEFINITE_BLOCK_CAP: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Default)]
pub struct XRead {
    block_ms: Option<u64>,
    count: Option<usize>,
    streams: Vec<Bytes>,
    ids: Vec<StreamId>,
}

impl ParseCommand for XRead {
    fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        let mut i = 0;
        let mut block_ms = None;
        let mut count = None;
        let mut found_streams_kw = false;

        while i < args.len() {
            let token = extract_string(&args[i])?;
            if token.eq_ignore_ascii_case("streams") {
                found_streams_kw = true;
                i += 1;
                break;
            }
            match token.to_ascii_uppercase().as_str() {
                "BLOCK" => {
                    i += 1;
                    let raw = args.get(i).ok_or(StoreError::SyntaxError)?;
                    block_ms = Some(
                        extract_string(raw)?
                            .parse::<u64>()
                            .map_err(|_| StoreError::NotAnInteger)?,
                    );
                }
                "COUNT" => {
                    i += 1;
                    let raw = args.get(i).ok_or(StoreError::SyntaxError)?;
                    count = Some(
                        extract_string(raw)?
                            .parse::<usize>()
                            .map_err(|_| StoreError::NotAnInteger)?,
                    );
                }
                _ => return Err(StoreError::SyntaxError),
            }
            i += 1;
        }

        if !found_streams_kw {
            return Err(StoreError::SyntaxError);
        }

        let rest = &args[i..];
        if rest.is_empty() || rest.len() % 2 != 0 {
            return Err(StoreError::SyntaxError);
        }
        let n = rest.len() / 2;
        let streams = rest[..n]
            .iter()
            .map(extract_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        let ids = rest[n..]
            .iter()
            .map(|f| extract_string(f)?.parse::<StreamId>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(XRead {
            block_ms,
            count,
            streams,
            ids,
        })
    }
}

impl XRead {
    /// One pass over every requested stream, returning entries newer than
    /// the requested id. Streams with nothing new are omitted.
    fn poll(&self, ctx: &ExecutionContext<'_>) -> Vec<(Bytes, Vec<RespValue>)> {
        let mut results = Vec::new();
        for (stream, id) in self.streams.iter().zip(self.ids.iter()) {
            let entries = ctx.db.streams.read_after(stream, *id, self.count);
            if !entries.is_empty() {
                results.push((stream.clone(), entries.iter().map(entry_to_resp).collect()));
            }
        }
        results
    }
}

fn render(results: Vec<(Bytes, Vec<RespValue>)>) -> RespValue {
    if results.is_empty() {
        return RespValue::Null;
    }
    RespValue::Array(
        results
            .into_iter()
            .map(|(stream, entries)| {
                RespValue::Array(vec![RespValue::BulkString(stream), RespValue::Array(entries)])
            })
            .collect(),
    )
}

#[async_trait]
impl ExecutableCommand for XRead {
    async fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<RespValue, StoreError> {
        let immediate = self.poll(ctx);
        if !immediate.is_empty() || self.block_ms.is_none() {
            return Ok(render(immediate));
        }

        let mut subscriptions: Vec<(Bytes, u64, tokio::sync::mpsc::Receiver<_>)> = self
            .streams
            .iter()
            .map(|s| {
                let (handle, rx) = ctx.db.streams.subscribe(s);
                (s.clone(), handle, rx)
            })
            .collect();

        // Re-check after subscribing: an entry may have landed in the gap
        // between the first poll and registering the subscription.
        let immediate = self.poll(ctx);
        if !immediate.is_empty() {
            for (stream, handle, _) in &subscriptions {
                ctx.db.streams.unsubscribe(stream, *handle);
            }
            return Ok(render(immediate));
        }

        let timeout = match self.block_ms {
            Some(0) => INDEFINITE_BLOCK_CAP,
            Some(ms) => Duration::from_millis(ms),
            None => unreachable!("returned above when block_ms is None"),
        };

        let wait = async {
            loop {
                let futs: Vec<_> = subscriptions
                    .iter_mut()
                    .map(|(_, _, rx)| Box::pin(rx.recv()))
                    .collect();
                let (result, _idx, _remaining) = select_all(futs).await;
                if result.is_some() {
                    return;
                }
            }
        };

        let woke = tokio::time::timeout(timeout, wait).await.is_ok();

        for (stream, handle, _) in &subscriptions {
            ctx.db.streams.unsubscribe(stream, *handle);
        }

        if !woke {
            return Ok(RespValue::Null);
        }
        Ok(render(self.poll(ctx)))
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY | CommandFlags::NO_PROPAGATE
    }
}
