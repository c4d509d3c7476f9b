// src/core/commands/helpers.rs

//! Small parsing helpers shared by every command's `ParseCommand` impl.

use crate::core::errors::StoreError;
use crate::core::protocol::RespFrame;
use bytes::Bytes;

/// Extracts the raw bytes of a simple or bulk string argument frame.
pub fn extract_bytes(frame: &RespFrame) -> Result<Bytes, StoreError> {
    match frame {
        RespFrame::BulkString(Some(b)) => Ok(b.clone()),
        RespFrame::SimpleString(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
        _ => Err(StoreError::SyntaxError),
    }
}

/// Extracts a UTF-8 string argument.
pub fn extract_string(frame: &RespFrame) -> Result<String, StoreError> {
    let bytes = extract_bytes(frame)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| StoreError::SyntaxError)
}

/// Fails with the command's standard wrong-arity error unless `args` has
/// exactly `expected` elements.
pub fn validate_arg_count(
    args: &[RespFrame],
    expected: usize,
    name: &str,
) -> Result<(), StoreError> {
    if args.len() != expected {
        return Err(StoreError::WrongArgumentCount(name.to_string()));
    }
    Ok(())
}

/// Fails unless `args` has at least `min` elements.
pub fn validate_min_args(args: &[RespFrame], min: usize, name: &str) -> Result<(), StoreError> {
    if args.len() < min {
        return Err(StoreError::WrongArgumentCount(name.to_string()));
    }
    Ok(())
}
