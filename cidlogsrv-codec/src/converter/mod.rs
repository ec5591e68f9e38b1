//! Byte <-> Unicode transcoding.
//!
//! `Converter` is a closed family (spec calls for a sealed sum type here
//! rather than a trait object, so the registry can audit exactly what
//! encodings exist). Each variant knows how to decode a byte slice into
//! a `String` and encode a `&str` back into bytes, under one shared
//! error-action contract.

mod single_byte;
mod tables;
mod ucs4;
mod utf16;
mod utf8;

use crate::error::CodecError;

/// What to do when a decode/encode step hits invalid input.
///
/// `Replace` carries the caller-chosen stand-in: a `char` for decode,
/// a raw byte for encode, since the two directions substitute into
/// different alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError<T> {
  Throw,
  StopThenThrow,
  Replace(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeStats {
  pub src_consumed: usize,
  pub chars_produced: usize,
  pub halted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeStats {
  pub src_consumed: usize,
  pub bytes_produced: usize,
  pub halted: bool,
}

/// Every alias in the registry resolves to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
  Utf8,
  UsAscii,
  Utf16Le,
  Utf16Be,
  Ucs4Le,
  Ucs4Be,
  Iso88591,
  Iso88592,
  Iso88593,
  Iso88594,
  Iso88595,
  Iso88596,
  Cp437,
  Cp850,
  Cp1251,
  Cp1252,
  Ibm037,
  Ibm1140,
}

impl Encoding {
  pub fn name(self) -> &'static str {
    match self {
      Encoding::Utf8 => "UTF-8",
      Encoding::UsAscii => "US-ASCII",
      Encoding::Utf16Le => "UTF-16LE",
      Encoding::Utf16Be => "UTF-16BE",
      Encoding::Ucs4Le => "UCS-4LE",
      Encoding::Ucs4Be => "UCS-4BE",
      Encoding::Iso88591 => "ISO-8859-1",
      Encoding::Iso88592 => "ISO-8859-2",
      Encoding::Iso88593 => "ISO-8859-3",
      Encoding::Iso88594 => "ISO-8859-4",
      Encoding::Iso88595 => "ISO-8859-5",
      Encoding::Iso88596 => "ISO-8859-6",
      Encoding::Cp437 => "CP437",
      Encoding::Cp850 => "CP850",
      Encoding::Cp1251 => "CP1251",
      Encoding::Cp1252 => "CP1252",
      Encoding::Ibm037 => "IBM037",
      Encoding::Ibm1140 => "IBM1140",
    }
  }
}

/// A bound converter instance for one encoding. Cheap to construct;
/// single-byte variants build their reverse lookup once, in `new`.
/// `on_error` is supplied per `decode`/`encode` call rather than fixed
/// at construction, matching §4.B's literal operation signatures.
pub struct Converter {
  encoding: Encoding,
  table: Option<single_byte::SingleByteTable>,
}

impl Converter {
  pub fn new(encoding: Encoding) -> Self {
    let table = single_byte::table_for(encoding);
    Self { encoding, table }
  }

  pub fn encoding(&self) -> Encoding {
    self.encoding
  }

  pub fn decode(
    &self,
    src: &[u8],
    on_error: OnError<char>,
  ) -> Result<(String, DecodeStats), CodecError> {
    match self.encoding {
      Encoding::Utf8 => utf8::decode(src, on_error),
      Encoding::UsAscii => single_byte::decode_ascii(src, on_error),
      Encoding::Utf16Le => utf16::decode(src, on_error, true),
      Encoding::Utf16Be => utf16::decode(src, on_error, false),
      Encoding::Ucs4Le => ucs4::decode(src, on_error, true),
      Encoding::Ucs4Be => ucs4::decode(src, on_error, false),
      _ => single_byte::decode_table(self.table.as_ref().unwrap(), self.encoding, src, on_error),
    }
  }

  pub fn encode(
    &self,
    src: &str,
    on_error: OnError<u8>,
  ) -> Result<(Vec<u8>, EncodeStats), CodecError> {
    match self.encoding {
      Encoding::Utf8 => utf8::encode(src, on_error),
      Encoding::UsAscii => single_byte::encode_ascii(src, on_error),
      Encoding::Utf16Le => utf16::encode(src, on_error, true),
      Encoding::Utf16Be => utf16::encode(src, on_error, false),
      Encoding::Ucs4Le => ucs4::encode(src, on_error, true),
      Encoding::Ucs4Be => ucs4::encode(src, on_error, false),
      _ => single_byte::encode_table(self.table.as_ref().unwrap(), self.encoding, src, on_error),
    }
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn ascii_stop_then_throw_boundary() {
    let conv = Converter::new(Encoding::UsAscii);
    let (s, stats) = conv
      .decode(&[0x61, 0x62, 0xCD, 0x63, 0x64], OnError::StopThenThrow)
      .unwrap();
    assert_eq!(s, "ab");
    assert_eq!(stats.src_consumed, 2);
    assert!(stats.halted);

    let err = conv.decode(&[0xCD, 0x63, 0x64], OnError::StopThenThrow);
    assert!(err.is_err());
  }

  #[test]
  fn utf8_round_trip() {
    let conv = Converter::new(Encoding::Utf8);
    let (decoded, _) = conv.decode("héllo wörld".as_bytes(), OnError::Throw).unwrap();
    assert_eq!(decoded, "héllo wörld");
    let (encoded, _) = conv.encode(&decoded, OnError::Throw).unwrap();
    assert_eq!(encoded, "héllo wörld".as_bytes());
  }
}
