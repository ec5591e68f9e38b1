//! Shared machinery for every single-byte ("mode 1") table codec,
//! including plain US-ASCII, which needs no table at all.

use super::tables;
use super::{DecodeStats, Encoding, EncodeStats, OnError};
use crate::error::CodecError;

/// A byte<->char table built once per `Converter::new` call. `from_wide`
/// is derived from `to_wide` by sorting, which makes the round-trip
/// property (spec's table-codec test-harness requirement) hold by
/// construction rather than by separately authoring two tables that
/// could drift apart.
pub struct SingleByteTable {
  to_wide: [u16; 256],
  from_wide: Vec<(u16, u8)>,
}

impl SingleByteTable {
  fn new(to_wide: [u16; 256]) -> Self {
    let mut from_wide: Vec<(u16, u8)> = to_wide
      .iter()
      .enumerate()
      .filter(|(_, &c)| c != tables::INVALID)
      .map(|(b, &c)| (c, b as u8))
      .collect();
    from_wide.sort_unstable_by_key(|&(c, _)| c);
    Self { to_wide, from_wide }
  }

  fn decode_byte(&self, b: u8) -> Option<char> {
    let w = self.to_wide[b as usize];
    if w == tables::INVALID {
      None
    } else {
      char::from_u32(w as u32)
    }
  }

  fn encode_char(&self, c: char) -> Option<u8> {
    if (c as u32) > 0xFFFF {
      return None;
    }
    let target = c as u16;
    self
      .from_wide
      .binary_search_by_key(&target, |&(w, _)| w)
      .ok()
      .map(|idx| self.from_wide[idx].1)
  }

  /// Verifies, for every byte, that it is either unused (and absent from
  /// the reverse table) or that it round-trips through decode/encode.
  /// Mirrors `TMode1EncodingBase::bDoTests`.
  pub fn verify_round_trip(&self) -> Result<(), String> {
    for ext in 0u16..256 {
      let w = self.to_wide[ext as usize];
      if w == tables::INVALID {
        if self.from_wide.iter().any(|&(_, byte)| byte == ext as u8) {
          return Err(format!("byte {ext:#04X} marked unused but present in reverse table"));
        }
        continue;
      }
      match self.from_wide.binary_search_by_key(&w, |&(cw, _)| cw) {
        Err(_) => return Err(format!("char for byte {ext:#04X} missing from reverse table")),
        Ok(idx) => {
          if self.from_wide[idx].1 != ext as u8 {
            return Err(format!("byte {ext:#04X} did not round trip"));
          }
        }
      }
    }
    Ok(())
  }
}

pub fn table_for(encoding: Encoding) -> Option<SingleByteTable> {
  let raw = match encoding {
    Encoding::Iso88591 => tables::iso_8859_1(),
    Encoding::Iso88592 => tables::iso_8859_2(),
    Encoding::Iso88593 => tables::iso_8859_3(),
    Encoding::Iso88594 => tables::iso_8859_4(),
    Encoding::Iso88595 => tables::iso_8859_5(),
    Encoding::Iso88596 => tables::iso_8859_6(),
    Encoding::Cp437 => tables::cp437(),
    Encoding::Cp850 => tables::cp850(),
    Encoding::Cp1251 => tables::cp1251(),
    Encoding::Cp1252 => tables::cp1252(),
    Encoding::Ibm037 => tables::ibm037(),
    Encoding::Ibm1140 => tables::ibm1140(),
    Encoding::Utf8 | Encoding::UsAscii | Encoding::Utf16Le | Encoding::Utf16Be
    | Encoding::Ucs4Le | Encoding::Ucs4Be => return None,
  };
  Some(SingleByteTable::new(raw))
}

pub fn decode_table(
  table: &SingleByteTable,
  encoding: Encoding,
  src: &[u8],
  on_error: OnError<char>,
) -> Result<(String, DecodeStats), CodecError> {
  let mut out = String::with_capacity(src.len());
  let mut consumed = 0usize;
  let mut halted = false;
  for (i, &b) in src.iter().enumerate() {
    match table.decode_byte(b) {
      Some(c) => {
        out.push(c);
        consumed = i + 1;
      }
      None => match on_error {
        OnError::StopThenThrow if i > 0 => {
          halted = true;
          break;
        }
        OnError::Replace(rep) => {
          out.push(rep);
          consumed = i + 1;
        }
        _ => {
          return Err(CodecError::BadSource { encoding: encoding.name().to_string() });
        }
      },
    }
  }
  let chars_produced = out.chars().count();
  Ok((out, DecodeStats { src_consumed: consumed, chars_produced, halted }))
}

pub fn encode_table(
  table: &SingleByteTable,
  encoding: Encoding,
  src: &str,
  on_error: OnError<u8>,
) -> Result<(Vec<u8>, EncodeStats), CodecError> {
  let mut out = Vec::with_capacity(src.len());
  let mut consumed = 0usize;
  let mut halted = false;
  for (i, c) in src.chars().enumerate() {
    match table.encode_char(c) {
      Some(b) => {
        out.push(b);
        consumed = i + 1;
      }
      None => match on_error {
        OnError::StopThenThrow if i > 0 => {
          halted = true;
          break;
        }
        OnError::Replace(rep) => {
          out.push(rep);
          consumed = i + 1;
        }
        _ => {
          return Err(CodecError::Unrepresentable {
            codepoint: c as u32,
            encoding: encoding.name().to_string(),
          });
        }
      },
    }
  }
  let bytes_produced = out.len();
  Ok((out, EncodeStats { src_consumed: consumed, bytes_produced, halted }))
}

pub fn decode_ascii(src: &[u8], on_error: OnError<char>) -> Result<(String, DecodeStats), CodecError> {
  let mut out = String::with_capacity(src.len());
  let mut consumed = 0usize;
  let mut halted = false;
  for (i, &b) in src.iter().enumerate() {
    if b < 0x80 {
      out.push(b as char);
      consumed = i + 1;
      continue;
    }
    match on_error {
      OnError::StopThenThrow if i > 0 => {
        halted = true;
        break;
      }
      OnError::Replace(rep) => {
        out.push(rep);
        consumed = i + 1;
      }
      _ => return Err(CodecError::BadSource { encoding: Encoding::UsAscii.name().to_string() }),
    }
  }
  let chars_produced = out.chars().count();
  Ok((out, DecodeStats { src_consumed: consumed, chars_produced, halted }))
}

pub fn encode_ascii(src: &str, on_error: OnError<u8>) -> Result<(Vec<u8>, EncodeStats), CodecError> {
  let mut out = Vec::with_capacity(src.len());
  let mut consumed = 0usize;
  let mut halted = false;
  for (i, c) in src.chars().enumerate() {
    if (c as u32) < 0x80 {
      out.push(c as u8);
      consumed = i + 1;
      continue;
    }
    match on_error {
      OnError::StopThenThrow if i > 0 => {
        halted = true;
        break;
      }
      OnError::Replace(rep) => {
        out.push(rep);
        consumed = i + 1;
      }
      _ => {
        return Err(CodecError::Unrepresentable {
          codepoint: c as u32,
          encoding: Encoding::UsAscii.name().to_string(),
        })
      }
    }
  }
  let bytes_produced = out.len();
  Ok((out, EncodeStats { src_consumed: consumed, bytes_produced, halted }))
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn latin1_round_trips_every_valid_byte() {
    let table = table_for(Encoding::Iso88591).unwrap();
    table.verify_round_trip().unwrap();
  }

  #[test]
  fn cp1252_round_trips_every_valid_byte() {
    let table = table_for(Encoding::Cp1252).unwrap();
    table.verify_round_trip().unwrap();
  }

  #[test]
  fn ibm037_round_trips_every_valid_byte() {
    let table = table_for(Encoding::Ibm037).unwrap();
    table.verify_round_trip().unwrap();
  }

  #[test]
  fn all_tables_round_trip() {
    for enc in [
      Encoding::Iso88591, Encoding::Iso88592, Encoding::Iso88593, Encoding::Iso88594,
      Encoding::Iso88595, Encoding::Iso88596, Encoding::Cp437, Encoding::Cp850,
      Encoding::Cp1251, Encoding::Cp1252, Encoding::Ibm037, Encoding::Ibm1140,
    ] {
      let table = table_for(enc).unwrap();
      table.verify_round_trip().unwrap_or_else(|e| panic!("{:?}: {e}", enc));
    }
  }

  #[test]
  fn latin1_rejects_c1_controls() {
    let table = table_for(Encoding::Iso88591).unwrap();
    assert!(table.decode_byte(0x81).is_none());
    assert_eq!(table.decode_byte(b'A'), Some('A'));
  }
}
