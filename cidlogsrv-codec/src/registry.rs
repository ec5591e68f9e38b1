//! Process-wide, case-insensitive alias -> converter registry.
//!
//! Maps to a constructor tag (`Encoding`), not a trait object, per the
//! spec's design note that the converter family should stay a closed,
//! auditable set rather than open dynamic dispatch.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::converter::{Converter, Encoding, OnError};
use crate::error::CodecError;

fn builtin_aliases() -> &'static [(&'static str, Encoding)] {
  use Encoding::*;
  &[
    ("UTF-8", Utf8), ("UTF8", Utf8), ("UTF_8", Utf8),
    ("US-ASCII", UsAscii), ("USASCII", UsAscii), ("US_ASCII", UsAscii), ("ASCII", UsAscii),
    ("UTF-16LE", Utf16Le), ("UTF16LE", Utf16Le), ("UTF16-LE", Utf16Le),
    ("UTF16_LE", Utf16Le), ("UTF16L", Utf16Le), ("UTF16-L", Utf16Le),
    ("UTF-16BE", Utf16Be), ("UTF16BE", Utf16Be), ("UTF16-BE", Utf16Be),
    ("UTF16_BE", Utf16Be), ("UTF16B", Utf16Be), ("UTF16-B", Utf16Be),
    // Unsuffixed / endian-unspecified aliases resolve to this host's
    // native endianness, which for every target this crate ships on is
    // little-endian.
    ("UTF-16", Utf16Le), ("UCS-2", Utf16Le),
    ("UCS-4LE", Ucs4Le), ("UCS4LE", Ucs4Le), ("UCS4-LE", Ucs4Le), ("UCS-4L", Ucs4Le),
    ("UCS-4BE", Ucs4Be), ("UCS4BE", Ucs4Be), ("UCS4-BE", Ucs4Be), ("UCS-4B", Ucs4Be),
    ("UCS-4", Ucs4Le),
    ("ISO-8859-1", Iso88591), ("8859-1", Iso88591), ("LATIN1", Iso88591),
    ("LATIN-1", Iso88591), ("CP819", Iso88591),
    ("ISO-8859-2", Iso88592), ("8859-2", Iso88592), ("LATIN2", Iso88592), ("LATIN-2", Iso88592),
    ("ISO-8859-3", Iso88593), ("8859-3", Iso88593), ("LATIN3", Iso88593), ("LATIN-3", Iso88593),
    ("ISO-8859-4", Iso88594), ("8859-4", Iso88594), ("LATIN4", Iso88594), ("LATIN-4", Iso88594),
    ("ISO-8859-5", Iso88595), ("8859-5", Iso88595), ("LATIN5", Iso88595),
    ("LATIN-5", Iso88595), ("CYRILLIC", Iso88595),
    ("ISO-8859-6", Iso88596), ("8859-6", Iso88596), ("LATIN6", Iso88596),
    ("LATIN-6", Iso88596), ("ARABIC", Iso88596),
    ("CP437", Cp437), ("IBM437", Cp437),
    ("CP850", Cp850), ("IBM850", Cp850),
    ("CP1251", Cp1251), ("WINDOWS-1251", Cp1251),
    ("CP1252", Cp1252), ("WINDOWS-1252", Cp1252), ("CP1004", Cp1252),
    ("EBCDIC-CP-US", Ibm037), ("CP037", Ibm037), ("IBM037", Ibm037),
    ("IBM1140", Ibm1140), ("CP1140", Ibm1140),
  ]
}

struct Inner {
  aliases: HashMap<String, Encoding>,
}

/// Guards the alias map with a short-critical-section lock, separate
/// from the store's lock (spec §5: "RegistryLock").
pub struct Registry {
  inner: Mutex<Inner>,
}

fn global() -> &'static Registry {
  static REGISTRY: OnceLock<Registry> = OnceLock::new();
  REGISTRY.get_or_init(Registry::new)
}

impl Registry {
  fn new() -> Self {
    let mut aliases = HashMap::new();
    for &(alias, enc) in builtin_aliases() {
      aliases.insert(alias.to_ascii_uppercase(), enc);
    }
    Self { inner: Mutex::new(Inner { aliases }) }
  }

  pub fn global() -> &'static Registry {
    global()
  }

  pub fn add_mapping(&self, alias: &str, encoding: Encoding) {
    let mut inner = self.inner.lock().unwrap();
    inner.aliases.insert(alias.to_ascii_uppercase(), encoding);
  }

  pub fn supports(&self, alias: &str) -> bool {
    let inner = self.inner.lock().unwrap();
    inner.aliases.contains_key(&alias.to_ascii_uppercase())
  }

  /// §4.A `Make`. `on_error` is accepted here for interface parity with
  /// the original facility's factory call but isn't bound into the
  /// returned `Converter` — this crate's `decode`/`encode` take
  /// `on_error` per call instead (§4.B's literal signatures).
  pub fn make(&self, alias: &str, _on_error: OnError<char>) -> Result<Converter, CodecError> {
    let inner = self.inner.lock().unwrap();
    let encoding = *inner
      .aliases
      .get(&alias.to_ascii_uppercase())
      .ok_or_else(|| CodecError::UnknownEncoding(alias.to_string()))?;
    Ok(Converter::new(encoding))
  }

  pub fn list_all(&self) -> Vec<String> {
    let inner = self.inner.lock().unwrap();
    let mut v: Vec<String> = inner.aliases.keys().cloned().collect();
    v.sort();
    v
  }

  /// Returns `UTF-8`/`UTF-16LE`/`UTF-16BE` for a recognized BOM, else
  /// `None`. Mirrors §4.A's `ProbeForEncoding`.
  pub fn probe_for_encoding(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
      Some("UTF-8")
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
      Some("UTF-16LE")
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
      Some("UTF-16BE")
    } else {
      None
    }
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn aliases_are_case_insensitive() {
    let reg = Registry::global();
    assert!(reg.supports("utf-8"));
    assert!(reg.supports("Utf-8"));
    assert!(reg.supports("UTF-8"));
  }

  #[test]
  fn make_unknown_alias_errors() {
    let reg = Registry::global();
    assert!(reg.make("not-a-real-encoding", OnError::Throw).is_err());
  }

  #[test]
  fn probe_detects_utf8_bom() {
    let bytes = [0xEF, 0xBB, 0xBF, 0x3C, 0x3F, 0x78, 0x6D, 0x6C];
    assert_eq!(Registry::probe_for_encoding(&bytes), Some("UTF-8"));
  }

  #[test]
  fn add_mapping_overwrites() {
    let reg = Registry::global();
    reg.add_mapping("MY-ALIAS", Encoding::Iso88591);
    assert!(reg.supports("my-alias"));
  }
}
