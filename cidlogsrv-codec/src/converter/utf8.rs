//! RFC 3629 UTF-8. Delegates the heavy lifting to `str::from_utf8`,
//! re-driving byte-by-byte only on the error path so we can honor
//! `on_error` and report a precise `src_consumed`.

use super::{DecodeStats, EncodeStats, Encoding, OnError};
use crate::error::CodecError;

pub fn decode(src: &[u8], on_error: OnError<char>) -> Result<(String, DecodeStats), CodecError> {
  match std::str::from_utf8(src) {
    Ok(s) => Ok((
      s.to_string(),
      DecodeStats { src_consumed: src.len(), chars_produced: s.chars().count(), halted: false },
    )),
    Err(e) => decode_with_errors(src, on_error, e),
  }
}

fn decode_with_errors(
  src: &[u8],
  on_error: OnError<char>,
  first_err: std::str::Utf8Error,
) -> Result<(String, DecodeStats), CodecError> {
  let valid_up_to = first_err.valid_up_to();
  let good = std::str::from_utf8(&src[..valid_up_to]).unwrap();

  // An incomplete (not invalid) trailing sequence at buffer end just
  // defers those bytes to the next call, per spec.
  if first_err.error_len().is_none() {
    return Ok((
      good.to_string(),
      DecodeStats { src_consumed: valid_up_to, chars_produced: good.chars().count(), halted: true },
    ));
  }

  match on_error {
    OnError::StopThenThrow if valid_up_to > 0 => Ok((
      good.to_string(),
      DecodeStats { src_consumed: valid_up_to, chars_produced: good.chars().count(), halted: true },
    )),
    OnError::Replace(rep) => {
      let mut out = good.to_string();
      out.push(rep);
      let bad_len = first_err.error_len().unwrap_or(1);
      let consumed_here = valid_up_to + bad_len;
      let (tail, mut stats) = match decode(&src[consumed_here..], on_error) {
        Ok(r) => r,
        Err(_) => (String::new(), DecodeStats::default()),
      };
      out.push_str(&tail);
      stats.src_consumed += consumed_here;
      stats.chars_produced = out.chars().count();
      Ok((out, stats))
    }
    _ => Err(CodecError::BadSource { encoding: Encoding::Utf8.name().to_string() }),
  }
}

pub fn encode(src: &str, _on_error: OnError<u8>) -> Result<(Vec<u8>, EncodeStats), CodecError> {
  let bytes = src.as_bytes().to_vec();
  let stats = EncodeStats {
    src_consumed: src.chars().count(),
    bytes_produced: bytes.len(),
    halted: false,
  };
  Ok((bytes, stats))
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn rejects_lone_continuation_byte() {
    let err = decode(&[0x61, 0x80], OnError::Throw);
    assert!(err.is_err());
  }

  #[test]
  fn incomplete_trailing_sequence_defers() {
    let (s, stats) = decode(&[b'h', b'i', 0xE2, 0x82], OnError::Throw).unwrap();
    assert_eq!(s, "hi");
    assert_eq!(stats.src_consumed, 2);
    assert!(stats.halted);
  }
}
