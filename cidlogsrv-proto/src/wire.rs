//! Length-prefixed CBOR framing shared by both endpoints: a `u32`
//! little-endian byte count followed by that many bytes of
//! `serde_cbor`-encoded payload. Independent of transport — works the
//! same over a `TcpStream` or an in-memory buffer, which is what the
//! dispatch tests below exercise.

use std::io::{self, Read, Write};

use serde::{de::DeserializeOwned, Serialize};

/// Calls carrying a payload larger than this are rejected before any
/// allocation happens, so a malformed length prefix can't be used to
/// make the server allocate unbounded memory.
const MAX_FRAME_BYTES: u32 = 4 * 1024 * 1024;

pub fn write_frame<T: Serialize>(w: &mut impl Write, value: &T) -> io::Result<()> {
  let bytes = serde_cbor::to_vec(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
  let len = bytes.len() as u32;
  w.write_all(&len.to_le_bytes())?;
  w.write_all(&bytes)?;
  w.flush()
}

pub fn read_frame<T: DeserializeOwned>(r: &mut impl Read) -> io::Result<T> {
  let mut len_buf = [0u8; 4];
  r.read_exact(&mut len_buf)?;
  let len = u32::from_le_bytes(len_buf);
  if len > MAX_FRAME_BYTES {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "frame exceeds maximum size"));
  }
  let mut buf = vec![0u8; len as usize];
  r.read_exact(&mut buf)?;
  serde_cbor::from_slice(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::message::{Reply, Request};

  #[test]
  fn round_trips_a_request() {
    let mut buf = Vec::new();
    let req = Request::QueryByCount { max_return: 10 };
    write_frame(&mut buf, &req).unwrap();
    let mut cursor = &buf[..];
    let back: Request = read_frame(&mut cursor).unwrap();
    matches!(back, Request::QueryByCount { max_return: 10 });
  }

  #[test]
  fn rejects_oversized_length_prefix() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_le_bytes());
    let mut cursor = &buf[..];
    let result: io::Result<Reply> = read_frame(&mut cursor);
    assert!(result.is_err());
  }
}
