// src/core/protocol/mod.rs

//! The RESP wire protocol: frame types, the codec, and the raw snapshot
//! frame used immediately after `FULLRESYNC`.

mod resp;

pub use resp::{RespCodec, RespFrame, RespValue, read_raw_snapshot, write_raw_snapshot};
