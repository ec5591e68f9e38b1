//! UTF-16LE/BE. Surrogate pairs decode to one supplementary char; lone
//! surrogates are invalid. An odd trailing byte defers to the next call
//! rather than erroring.

use super::{DecodeStats, EncodeStats, Encoding, OnError};
use crate::error::CodecError;

fn read_u16(b: &[u8], i: usize, little_endian: bool) -> u16 {
  if little_endian {
    u16::from_le_bytes([b[i], b[i + 1]])
  } else {
    u16::from_be_bytes([b[i], b[i + 1]])
  }
}

fn write_u16(out: &mut Vec<u8>, v: u16, little_endian: bool) {
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
  let encoding = if little_endian { Encoding::Utf16Le } else { Encoding::Utf16Be };
  let mut out = String::new();
  let mut i = 0usize;
  let mut consumed = 0usize;
  let mut halted = false;

  while i + 1 < src.len() {
    let unit = read_u16(src, i, little_endian);
    if (0xD800..=0xDBFF).contains(&unit) {
      if i + 3 < src.len() {
        let low = read_u16(src, i + 2, little_endian);
        if (0xDC00..=0xDFFF).contains(&low) {
          let c = 0x10000
            + ((unit as u32 - 0xD800) << 10)
            + (low as u32 - 0xDC00);
          out.push(char::from_u32(c).unwrap());
          i += 4;
          consumed = i;
          continue;
        }
      } else {
        // Not enough bytes yet to know if this is a valid pair.
        halted = true;
        break;
      }
    }
    if (0xDC00..=0xDFFF).contains(&unit) || (0xD800..=0xDBFF).contains(&unit) {
      match on_error {
        OnError::StopThenThrow if consumed > 0 => {
          halted = true;
          break;
        }
        OnError::Replace(rep) => {
          out.push(rep);
          i += 2;
          consumed = i;
          continue;
        }
        _ => return Err(CodecError::BadSource { encoding: encoding.name().to_string() }),
      }
    }
    out.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
    i += 2;
    consumed = i;
  }
  if i < src.len() {
    halted = true; // odd trailing byte, defer
  }
  let chars_produced = out.chars().count();
  Ok((out, DecodeStats { src_consumed: consumed, chars_produced, halted }))
}

pub fn encode(
  src: &str,
  _on_error: OnError<u8>,
  little_endian: bool,
) -> Result<(Vec<u8>, EncodeStats), CodecError> {
  let mut out = Vec::with_capacity(src.len() * 2);
  let mut consumed = 0usize;
  for c in src.chars() {
    let cp = c as u32;
    if cp <= 0xFFFF {
      write_u16(&mut out, cp as u16, little_endian);
    } else {
      let v = cp - 0x10000;
      let high = 0xD800 + (v >> 10) as u16;
      let low = 0xDC00 + (v & 0x3FF) as u16;
      write_u16(&mut out, high, little_endian);
      write_u16(&mut out, low, little_endian);
    }
    consumed += 1;
  }
  let bytes_produced = out.len();
  Ok((out, EncodeStats { src_consumed: consumed, bytes_produced, halted: false }))
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn decodes_surrogate_pair() {
    // U+1F600 GRINNING FACE, LE
    let bytes = [0x3D, 0xD8, 0x00, 0xDE];
    let (s, stats) = decode(&bytes, OnError::Throw, true).unwrap();
    assert_eq!(s.chars().next(), Some('\u{1F600}'));
    assert_eq!(stats.src_consumed, 4);
  }

  #[test]
  fn round_trips_bmp_and_supplementary() {
    let s = "a\u{1F600}b";
    let (bytes, _) = encode(s, OnError::Throw, false).unwrap();
    let (back, _) = decode(&bytes, OnError::Throw, false).unwrap();
    assert_eq!(back, s);
  }

  #[test]
  fn odd_trailing_byte_defers() {
    let bytes = [0x61, 0x00, 0x62];
    let (s, stats) = decode(&bytes, OnError::Throw, true).unwrap();
    assert_eq!(s, "a");
    assert_eq!(stats.src_consumed, 2);
    assert!(stats.halted);
  }
}
