// src/core/errors.rs

//! The single error type produced anywhere in the command pipeline, storage
//! layer, or replication machinery.

use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;
use std::sync::Arc;
use thiserror::Error;

/// Every error this crate can produce, rendered to the wire as either a
/// simple-error frame (`-ERR ...`) or handled internally (connection close,
/// process abort for the two fatal startup conditions).
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("{0}")]
    Io(Arc<std::io::Error>),

    #[error("Protocol error: {0}")]
    Malformed(String),

    #[error("ERR unknown command: {0}")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("ERR syntax error")]
    SyntaxError,

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR value is not a valid float")]
    NotAFloat,

    /// Used for the literal stream-ID domain errors and other replies whose
    /// wording must match exactly.
    #[error("{0}")]
    InvalidState(String),

    #[error("ERR replication error: {0}")]
    Replication(String),

    #[error("ERR {0}")]
    InvalidArgument(String),

    /// Indicates a storage invariant violation (key-type map disagreeing
    /// with a container). The connection loop converts this to a connection
    /// close and logs at `error!`; it never silently succeeds.
    #[error("ERR internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(Arc::new(e))
    }
}

impl From<ParseIntError> for StoreError {
    fn from(_: ParseIntError) -> Self {
        StoreError::NotAnInteger
    }
}

impl From<ParseFloatError> for StoreError {
    fn from(_: ParseFloatError) -> Self {
        StoreError::NotAFloat
    }
}

impl From<Utf8Error> for StoreError {
    fn from(_: Utf8Error) -> Self {
        StoreError::Malformed("invalid utf-8 in argument".to_string())
    }
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
