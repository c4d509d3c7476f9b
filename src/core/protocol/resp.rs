// src/core/protocol/resp.rs

//! The RESP wire codec: the five primitive frame types plus the raw
//! snapshot frame used immediately after `FULLRESYNC`.

use crate::core::errors::StoreError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

/// Guards against a hostile peer claiming an absurd array length or bulk
/// string size before any bytes have actually arrived.
const MAX_BULK_STRING_SIZE: i64 = 512 * 1024 * 1024;
const MAX_ARRAY_ELEMENTS: i64 = 1024 * 1024;

/// A decoded RESP frame, exactly as it appeared on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    SimpleString(String),
    Error(String),
    Integer(i64),
    /// `None` is the null bulk string (`$-1\r\n`).
    BulkString(Option<Bytes>),
    /// `None` is the null array (`*-1\r\n`).
    Array(Option<Vec<RespFrame>>),
}

impl RespFrame {
    pub fn array(items: Vec<RespFrame>) -> Self {
        RespFrame::Array(Some(items))
    }

    pub fn bulk(bytes: impl Into<Bytes>) -> Self {
        RespFrame::BulkString(Some(bytes.into()))
    }

    pub fn null_bulk() -> Self {
        RespFrame::BulkString(None)
    }

    /// Renders this frame to its exact wire bytes. Used to measure and
    /// capture the serialized length for replication offsets, and to build
    /// the bytes forwarded verbatim to slaves.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = BytesMut::new();
        let mut codec = RespCodec;
        codec
            .encode(self.clone(), &mut buf)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(buf.to_vec())
    }

    /// Interprets a command-array frame as its lowercased name plus the
    /// remaining argument frames.
    pub fn as_command_parts(&self) -> Result<(String, &[RespFrame]), StoreError> {
        let Self::Array(Some(items)) = self else {
            return Err(StoreError::Malformed(
                "expected a command array".to_string(),
            ));
        };
        let Some(first) = items.first() else {
            return Err(StoreError::Malformed("empty command array".to_string()));
        };
        let name = match first {
            RespFrame::SimpleString(s) => s.clone(),
            RespFrame::BulkString(Some(b)) => {
                String::from_utf8(b.to_vec()).map_err(|_| StoreError::Malformed(
                    "command name is not valid utf-8".to_string(),
                ))?
            }
            _ => {
                return Err(StoreError::Malformed(
                    "command name must be a simple or bulk string".to_string(),
                ));
            }
        };
        Ok((name.to_ascii_lowercase(), &items[1..]))
    }
}

/// The type handlers build and the router encodes back to the wire. Keeping
/// this distinct from `RespFrame` means a handler never has to think about
/// null-array vs. null-bulk-string distinctions it doesn't care about.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    Simple(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    Null,
    Array(Vec<RespValue>),
}

impl From<RespValue> for RespFrame {
    fn from(v: RespValue) -> Self {
        match v {
            RespValue::Simple(s) => RespFrame::SimpleString(s),
            RespValue::Error(s) => RespFrame::Error(s),
            RespValue::Integer(i) => RespFrame::Integer(i),
            RespValue::BulkString(b) => RespFrame::BulkString(Some(b)),
            RespValue::Null => RespFrame::BulkString(None),
            RespValue::Array(items) => {
                RespFrame::Array(Some(items.into_iter().map(RespFrame::from).collect()))
            }
        }
    }
}

impl From<StoreError> for RespValue {
    fn from(e: StoreError) -> Self {
        RespValue::Error(e.to_string())
    }
}

impl From<&str> for RespValue {
    fn from(s: &str) -> Self {
        RespValue::BulkString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for RespValue {
    fn from(s: String) -> Self {
        RespValue::BulkString(Bytes::from(s))
    }
}

impl From<Bytes> for RespValue {
    fn from(b: Bytes) -> Self {
        RespValue::BulkString(b)
    }
}

impl From<i64> for RespValue {
    fn from(i: i64) -> Self {
        RespValue::Integer(i)
    }
}

/// `tokio_util::codec` implementation for `RespFrame`, used for every
/// regular client/master/replica connection. The raw snapshot frame is
/// handled separately (see `write_raw_snapshot`/`read_raw_snapshot`) because
/// it is only ever exchanged once, right after `FULLRESYNC`, outside the
/// normal per-message loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct RespCodec;

impl Decoder for RespCodec {
    type Item = RespFrame;
    type Error = StoreError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut pos = 0usize;
        match parse_frame(src, &mut pos)? {
            Some(frame) => {
                src.advance(pos);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<RespFrame> for RespCodec {
    type Error = StoreError;

    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}

fn encode_frame(frame: &RespFrame, dst: &mut BytesMut) {
    match frame {
        RespFrame::SimpleString(s) => {
            dst.put_u8(b'+');
            dst.put_slice(s.as_bytes());
            dst.put_slice(b"\r\n");
        }
        RespFrame::Error(s) => {
            dst.put_u8(b'-');
            dst.put_slice(s.as_bytes());
            dst.put_slice(b"\r\n");
        }
        RespFrame::Integer(i) => {
            dst.put_u8(b':');
            let mut buf = itoa::Buffer::new();
            dst.put_slice(buf.format(*i).as_bytes());
            dst.put_slice(b"\r\n");
        }
        RespFrame::BulkString(None) => {
            dst.put_slice(b"$-1\r\n");
        }
        RespFrame::BulkString(Some(b)) => {
            dst.put_u8(b'$');
            let mut buf = itoa::Buffer::new();
            dst.put_slice(buf.format(b.len() as i64).as_bytes());
            dst.put_slice(b"\r\n");
            dst.put_slice(b);
            dst.put_slice(b"\r\n");
        }
        RespFrame::Array(None) => {
            dst.put_slice(b"*-1\r\n");
        }
        RespFrame::Array(Some(items)) => {
            dst.put_u8(b'*');
            let mut buf = itoa::Buffer::new();
            dst.put_slice(buf.format(items.len() as i64).as_bytes());
            dst.put_slice(b"\r\n");
            for item in items {
                encode_frame(item, dst);
            }
        }
    }
}

/// Finds the offset of the first `\r\n` at or after `start`, if any.
fn find_crlf(buf: &[u8], start: usize) -> Option<usize> {
    buf[start..]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|p| start + p)
}

/// Reads one CRLF-terminated line starting at `*pos`, advancing `*pos` past
/// it. Returns `None` if the line hasn't fully arrived yet.
fn parse_line<'a>(src: &'a BytesMut, pos: &mut usize) -> Result<Option<&'a [u8]>, StoreError> {
    match find_crlf(src, *pos) {
        Some(end) => {
            let line = &src[*pos..end];
            *pos = end + 2;
            Ok(Some(line))
        }
        None => Ok(None),
    }
}

fn parse_i64(line: &[u8]) -> Result<i64, StoreError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| StoreError::Malformed("invalid integer field".to_string()))
}

fn parse_frame(src: &BytesMut, pos: &mut usize) -> Result<Option<RespFrame>, StoreError> {
    if *pos >= src.len() {
        return Ok(None);
    }
    let prefix = src[*pos];
    let mut cursor = *pos + 1;
    match prefix {
        b'+' => {
            let Some(line) = parse_line(src, &mut cursor)? else {
                return Ok(None);
            };
            let s = std::str::from_utf8(line)
                .map_err(|_| StoreError::Malformed("invalid utf-8 in simple string".to_string()))?
                .to_string();
            *pos = cursor;
            Ok(Some(RespFrame::SimpleString(s)))
        }
        b'-' => {
            let Some(line) = parse_line(src, &mut cursor)? else {
                return Ok(None);
            };
            let s = std::str::from_utf8(line)
                .map_err(|_| StoreError::Malformed("invalid utf-8 in error string".to_string()))?
                .to_string();
            *pos = cursor;
            Ok(Some(RespFrame::Error(s)))
        }
        b':' => {
            let Some(line) = parse_line(src, &mut cursor)? else {
                return Ok(None);
            };
            let i = parse_i64(line)?;
            *pos = cursor;
            Ok(Some(RespFrame::Integer(i)))
        }
        b'$' => {
            let Some(line) = parse_line(src, &mut cursor)? else {
                return Ok(None);
            };
            let len = parse_i64(line)?;
            if len == -1 {
                *pos = cursor;
                return Ok(Some(RespFrame::BulkString(None)));
            }
            if len < -1 || len > MAX_BULK_STRING_SIZE {
                return Err(StoreError::Malformed(
                    "invalid bulk string length".to_string(),
                ));
            }
            let len = len as usize;
            if src.len() < cursor + len + 2 {
                return Ok(None);
            }
            let data = Bytes::copy_from_slice(&src[cursor..cursor + len]);
            if &src[cursor + len..cursor + len + 2] != b"\r\n" {
                return Err(StoreError::Malformed(
                    "bulk string missing trailing CRLF".to_string(),
                ));
            }
            cursor += len + 2;
            *pos = cursor;
            Ok(Some(RespFrame::BulkString(Some(data))))
        }
        b'*' => {
            let Some(line) = parse_line(src, &mut cursor)? else {
                return Ok(None);
            };
            let len = parse_i64(line)?;
            if len == -1 {
                *pos = cursor;
                return Ok(Some(RespFrame::Array(None)));
            }
            if len < -1 || len > MAX_ARRAY_ELEMENTS {
                return Err(StoreError::Malformed("invalid array length".to_string()));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                match parse_frame(src, &mut cursor)? {
                    Some(item) => items.push(item),
                    None => return Ok(None),
                }
            }
            *pos = cursor;
            Ok(Some(RespFrame::Array(Some(items))))
        }
        other => Err(StoreError::Malformed(format!(
            "unknown RESP type prefix: {:?}",
            other as char
        ))),
    }
}

/// Writes the raw snapshot frame: `$<n>\r\n<n bytes>` with *no* trailing
/// CRLF. Used exactly once, immediately after a `+FULLRESYNC` reply.
pub async fn write_raw_snapshot<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), StoreError> {
    let header = format!("${}\r\n", payload.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads the raw snapshot frame from a stream that has just received the
/// `FULLRESYNC` simple-string reply.
pub async fn read_raw_snapshot<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Bytes, StoreError> {
    let mut len_buf = Vec::new();
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).await?;
    if byte[0] != b'$' {
        return Err(StoreError::Malformed(
            "expected '$' prefix for snapshot frame".to_string(),
        ));
    }
    loop {
        reader.read_exact(&mut byte).await?;
        if byte[0] == b'\r' {
            reader.read_exact(&mut byte).await?;
            if byte[0] != b'\n' {
                return Err(StoreError::Malformed(
                    "malformed snapshot frame length line".to_string(),
                ));
            }
            break;
        }
        len_buf.push(byte[0]);
    }
    let len: usize = std::str::from_utf8(&len_buf)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::Malformed("invalid snapshot frame length".to_string()))?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Bytes::from(payload))
}
