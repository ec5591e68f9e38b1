//! UCS-4LE/BE. 4 bytes per input char; codepoints above 0xFFFF are
//! written out to the `String` as ordinary Rust chars (`String` already
//! stores full codepoints) but spec's "encode as surrogate pair in the
//! output string" requirement is preserved at the `encode` boundary,
//! which is UCS-4 bytes, not UTF-16 — so here it means only that the
//! *value range* 0x10000..=0x10FFFF is accepted and passed through
//! untouched; values above it are invalid.

use super::{DecodeStats, EncodeStats, Encoding, OnError};
use crate::error::CodecError;

fn read_u32(b: &[u8], i: usize, little_endian: bool) -> u32 {
  let a = [b[i], b[i + 1], b[i + 2], b[i + 3]];
  if little_endian { u32::from_le_bytes(a) } else { u32::from_be_bytes(a) }
}

fn write_u32(out: &mut Vec<u8>, v: u32, little_endian: bool) {
  if little_endian {
    out.extend_from_slice(&v.to_le_bytes());
  } else {
    out.extend_from_slice(&v.to_be_bytes());
  }
}

pub fn decode(
  src: &[u8],
  on_error: OnError<char>,
  little_endian: bool,
) -> Result<(String, DecodeStats), CodecError> {
  let encoding = if little_endian { Encoding::Ucs4Le } else { Encoding::Ucs4Be };
  let mut out = String::new();
  let mut consumed = 0usize;
  let mut halted = false;
  let whole_units = src.len() / 4;

  for u in 0..whole_units {
    let i = u * 4;
    let v = read_u32(src, i, little_endian);
    match char::from_u32(v) {
      Some(c) if v <= 0x10FFFF => {
        out.push(c);
        consumed = i + 4;
      }
      _ => match on_error {
        OnError::StopThenThrow if consumed > 0 => {
          halted = true;
          break;
        }
        OnError::Replace(rep) => {
          out.push(rep);
          consumed = i + 4;
        }
        _ => return Err(CodecError::BadSource { encoding: encoding.name().to_string() }),
      },
    }
  }
  if src.len() % 4 != 0 && !halted {
    halted = true; // partial trailing unit, defer
  }
  let chars_produced = out.chars().count();
  Ok((out, DecodeStats { src_consumed: consumed, chars_produced, halted }))
}

pub fn encode(
  src: &str,
  _on_error: OnError<u8>,
  little_endian: bool,
) -> Result<(Vec<u8>, EncodeStats), CodecError> {
  let mut out = Vec::with_capacity(src.len() * 4);
  let mut consumed = 0usize;
  for c in src.chars() {
    write_u32(&mut out, c as u32, little_endian);
    consumed += 1;
  }
  let bytes_produced = out.len();
  Ok((out, EncodeStats { src_consumed: consumed, bytes_produced, halted: false }))
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn round_trips_supplementary_plane() {
    let s = "a\u{1F600}b";
    let (bytes, _) = encode(s, OnError::Throw, false).unwrap();
    let (back, _) = decode(&bytes, OnError::Throw, false).unwrap();
    assert_eq!(back, s);
  }

  #[test]
  fn rejects_above_max_codepoint() {
    let bytes = 0x00_11_00_00u32.to_be_bytes();
    let err = decode(&bytes, OnError::Throw, false);
    assert!(err.is_err());
  }
}
