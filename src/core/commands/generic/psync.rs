// src/core/commands/generic/psync.rs

//! `PSYNC` hands the connection off to the replication subsystem: the router
//! replies with `+FULLRESYNC <replid> <offset>`, writes the raw snapshot
//! frame, and converts the connection into a standing replica link. None of
//! that fits `ExecutionContext`, so only parsing lives here.

use crate::core::commands::helpers::extract_string;
use crate::core::errors::StoreError;
use crate::core::protocol::RespFrame;

#[derive(Debug, Clone)]
pub struct Psync {
    pub replid: String,
    pub offset: i64,
}

impl Psync {
    pub fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        if args.len() != 2 {
            return Err(StoreError::WrongArgumentCount("PSYNC".to_string()));
        }
        let replid = extract_string(&args[0])?;
        let offset_str = extract_string(&args[1])?;
        if replid != "?" || offset_str != "-1" {
            return Err(StoreError::InvalidArgument(
                "PSYNC only supports initial sync (? -1)".to_string(),
            ));
        }
        Ok(Psync {
            replid,
            offset: -1,
        })
    }
}
