// src/core/commands/generic/replconf.rs

//! `REPLCONF` never reaches generic dispatch: `listening-port` mutates the
//! session, `getack` demands an immediate reply carrying the offset observed
//! before the frame was consumed, and `ack` is only ever sent by a replica
//! back to its master over the replication link. The router recognizes the
//! subcommand and branches accordingly; this module only knows how to parse.

use crate::core::commands::helpers::extract_string;
use crate::core::errors::StoreError;
use crate::core::protocol::RespFrame;

#[derive(Debug, Clone)]
pub enum ReplConf {
    ListeningPort(u16),
    Capa,
    GetAck,
    Ack(i64),
}

impl ReplConf {
    pub fn parse(args: &[RespFrame]) -> Result<Self, StoreError> {
        if args.is_empty() {
            return Err(StoreError::WrongArgumentCount("REPLCONF".to_string()));
        }
        let subcommand = extract_string(&args[0])?.to_ascii_lowercase();
        match subcommand.as_str() {
            "listening-port" => {
                if args.len() != 2 {
                    return Err(StoreError::WrongArgumentCount("REPLCONF".to_string()));
                }
                let port = extract_string(&args[1])?
                    .parse::<u16>()
                    .map_err(|_| StoreError::NotAnInteger)?;
                Ok(ReplConf::ListeningPort(port))
            }
            "capa" => Ok(ReplConf::Capa),
            "getack" => Ok(ReplConf::GetAck),
            "ack" => {
                if args.len() != 2 {
                    return Err(StoreError::WrongArgumentCount("REPLCONF".to_string()));
                }
                let offset = extract_string(&args[1])?
                    .parse::<i64>()
                    .map_err(|_| StoreError::NotAnInteger)?;
                Ok(ReplConf::Ack(offset))
            }
            other => Err(StoreError::InvalidArgument(format!(
                "unsupported REPLCONF subcommand: {other}"
            ))),
        }
    }
}
