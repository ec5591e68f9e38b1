//! Entity spooler: a byte-stream reader that self-senses an encoding
//! from a handful of prefix bytes, decodes just enough of an XML
//! declaration to discover a caller-declared encoding, then hands off
//! to a full `Converter` for everything after. Client-side consumer of
//! the registry/converter layer; not part of the store's write path.

use crate::converter::{Converter, Encoding, OnError};
use crate::registry::Registry;

/// Base encoding sensed from the first few bytes of a stream, before
/// any declaration has been read. Distinct from `Encoding` because
/// `EbcdicUs` has no general-purpose `Converter` of its own here (it
/// reuses `Ibm037`, which *is* what the XML declaration would declare).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensedEncoding {
  Ucs4Be,
  Utf16Be,
  Ucs4Le,
  Utf16Le,
  Utf8,
  EbcdicUs,
}

impl SensedEncoding {
  fn as_encoding(self) -> Encoding {
    match self {
      SensedEncoding::Ucs4Be => Encoding::Ucs4Be,
      SensedEncoding::Utf16Be => Encoding::Utf16Be,
      SensedEncoding::Ucs4Le => Encoding::Ucs4Le,
      SensedEncoding::Utf16Le => Encoding::Utf16Le,
      SensedEncoding::Utf8 => Encoding::Utf8,
      SensedEncoding::EbcdicUs => Encoding::Ibm037,
    }
  }
}

/// Signature table from the original facility's self-bootstrap, in
/// priority order (longer/more specific signatures first).
const SIGNATURES: &[(&[u8], SensedEncoding)] = &[
  (&[0x00, 0x00, 0x00, 0x3C], SensedEncoding::Ucs4Be),
  (&[0x00, 0x3C, 0x00, 0x3F], SensedEncoding::Utf16Be),
  (&[0x3C, 0x00, 0x00, 0x00], SensedEncoding::Ucs4Le),
  (&[0x3C, 0x00, 0x3F, 0x00], SensedEncoding::Utf16Le),
  (&[0x3C, 0x3F, 0x78, 0x6D], SensedEncoding::Utf8),
  (&[0x4C, 0x6F, 0xA7, 0x94], SensedEncoding::EbcdicUs),
  (&[0xEF, 0xBB, 0xBF], SensedEncoding::Utf8),
  (&[0xFE, 0xFF], SensedEncoding::Utf16Be),
  (&[0xFF, 0xFE], SensedEncoding::Utf16Le),
];

/// Looks at up to the first 6 bytes of a stream and returns the sensed
/// base encoding, falling back to UTF-8 if nothing matches.
pub fn sense(prefix: &[u8]) -> SensedEncoding {
  for &(sig, enc) in SIGNATURES {
    if prefix.len() >= sig.len() && &prefix[..sig.len()] == sig {
      return enc;
    }
  }
  SensedEncoding::Utf8
}

/// Pull-style character source over a decoded byte stream, with
/// pushback, line/column tracking, and CR/LF normalization.
pub struct EntitySpooler {
  chars: Vec<char>,
  pos: usize,
  line: u32,
  column: u32,
  track_position: bool,
  pushed_back: Option<char>,
}

impl EntitySpooler {
  /// Builds a spooler over `bytes`, sensing the encoding unless
  /// `forced` names one. `interned` suppresses line/column tracking for
  /// already-normalized in-memory content, per §4.C.
  ///
  /// When sensing, this is a two-phase bootstrap: the sensed base
  /// encoding is first used to manually decode just enough of the
  /// stream to read an `encoding="..."` declaration, and if one names a
  /// different converter, that converter (not the sensed base) is what
  /// actually decodes `bytes` for the spooler's lifetime.
  pub fn new(bytes: &[u8], forced: Option<Encoding>, interned: bool) -> Self {
    let encoding = match forced {
      Some(e) => e,
      None => {
        let base = sense(bytes).as_encoding();
        sniff_declared_encoding(bytes, base).unwrap_or(base)
      }
    };
    let converter = Converter::new(encoding);
    let (decoded, _) = converter
      .decode(strip_bom(bytes, encoding), OnError::Replace('\u{FFFD}'))
      .unwrap_or_default();
    let normalized = normalize_newlines(&decoded);
    Self {
      chars: normalized.chars().collect(),
      pos: 0,
      line: 1,
      column: 1,
      track_position: !interned,
      pushed_back: None,
    }
  }

  pub fn peek(&self) -> Option<char> {
    if let Some(c) = self.pushed_back {
      return Some(c);
    }
    self.chars.get(self.pos).copied()
  }

  pub fn next(&mut self) -> Option<char> {
    if let Some(c) = self.pushed_back.take() {
      return Some(c);
    }
    let c = self.chars.get(self.pos).copied()?;
    self.pos += 1;
    if self.track_position {
      if c == '\n' {
        self.line += 1;
        self.column = 1;
      } else {
        self.column += 1;
      }
    }
    Some(c)
  }

  /// One character of pushback; callers must not push back more than
  /// one character without an intervening `next`.
  pub fn push_back(&mut self, c: char) {
    debug_assert!(self.pushed_back.is_none(), "at most one character of pushback");
    self.pushed_back = Some(c);
  }

  pub fn match_literal(&mut self, literal: &str) -> bool {
    let save_pos = self.pos;
    let save_pushed = self.pushed_back;
    for expected in literal.chars() {
      if self.next() != Some(expected) {
        self.pos = save_pos;
        self.pushed_back = save_pushed;
        return false;
      }
    }
    true
  }

  pub fn skip_spaces(&mut self) -> u32 {
    let mut n = 0;
    while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
      self.next();
      n += 1;
    }
    n
  }

  pub fn line(&self) -> u32 {
    self.line
  }

  pub fn column(&self) -> u32 {
    self.column
  }
}

/// One leading synthetic space for a parameter-entity reference outside
/// a literal, and one trailing space once the entity is exhausted, per
/// XML's entity-expansion rules (§4.C).
pub fn parameter_entity_chars(body: &str) -> Vec<char> {
  let mut out = vec![' '];
  out.extend(body.chars());
  out.push(' ');
  out
}

/// Manually decodes just enough of `bytes` under the sensed `base`
/// encoding to read a leading `<?xml ... encoding="..."?>` declaration,
/// and resolves the declared name through the registry. Returns `None`
/// if there is no declaration, no `encoding` pseudo-attribute, or the
/// declared name isn't a registered alias — in all of those cases the
/// sensed base encoding stands.
fn sniff_declared_encoding(bytes: &[u8], base: Encoding) -> Option<Encoding> {
  let unit = match base {
    Encoding::Utf16Le | Encoding::Utf16Be => 2,
    Encoding::Ucs4Le | Encoding::Ucs4Be => 4,
    _ => 1,
  };
  let probe_len = bytes.len().min(256);
  let probe_len = probe_len - (probe_len % unit);
  if probe_len == 0 {
    return None;
  }
  let probe = strip_bom(&bytes[..probe_len], base);
  let converter = Converter::new(base);
  let (decl_text, _) = converter.decode(probe, OnError::Replace('\u{FFFD}')).ok()?;
  let name = parse_declared_encoding_name(&decl_text)?;
  Registry::global().make(&name, OnError::Throw).ok().map(|c| c.encoding())
}

/// Pulls the quoted value of `encoding="..."`/`encoding='...'` out of a
/// leading XML declaration. Returns `None` if `decl_text` doesn't open
/// with `<?xml`, the declaration never closes with `?>` within the
/// probed prefix, or no `encoding` pseudo-attribute is present.
fn parse_declared_encoding_name(decl_text: &str) -> Option<String> {
  if !decl_text.starts_with("<?xml") {
    return None;
  }
  let decl_end = decl_text.find("?>")?;
  let decl = &decl_text[..decl_end];
  let key_pos = decl.find("encoding")?;
  let after_key = &decl[key_pos + "encoding".len()..];
  let after_eq = after_key.trim_start().strip_prefix('=')?.trim_start();
  let quote = after_eq.chars().next()?;
  if quote != '"' && quote != '\'' {
    return None;
  }
  let rest = &after_eq[quote.len_utf8()..];
  let value_end = rest.find(quote)?;
  Some(rest[..value_end].to_string())
}

fn strip_bom(bytes: &[u8], encoding: Encoding) -> &[u8] {
  match encoding {
    Encoding::Utf8 if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) => &bytes[3..],
    Encoding::Utf16Be if bytes.starts_with(&[0xFE, 0xFF]) => &bytes[2..],
    Encoding::Utf16Le if bytes.starts_with(&[0xFF, 0xFE]) => &bytes[2..],
    _ => bytes,
  }
}

fn normalize_newlines(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '\r' {
      if chars.peek() == Some(&'\n') {
        chars.next();
      }
      out.push('\n');
    } else {
      out.push(c);
    }
  }
  out
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn senses_utf8_bom() {
    let bytes = [0xEF, 0xBB, 0xBF, 0x3C, 0x3F, 0x78, 0x6D, 0x6C];
    assert_eq!(sense(&bytes), SensedEncoding::Utf8);
  }

  #[test]
  fn senses_utf16le_declaration() {
    let bytes = [0x3C, 0x00, 0x3F, 0x00, 0x78, 0x00, 0x6D, 0x00, 0x6C, 0x00, 0x20, 0x00];
    assert_eq!(sense(&bytes), SensedEncoding::Utf16Le);
  }

  #[test]
  fn senses_ebcdic_declaration() {
    let bytes = [0x4C, 0x6F, 0xA7, 0x94, 0x93, 0x40];
    assert_eq!(sense(&bytes), SensedEncoding::EbcdicUs);
  }

  #[test]
  fn normalizes_crlf_and_lone_cr() {
    let spooler = EntitySpooler::new(b"a\r\nb\rc", Some(Encoding::UsAscii), false);
    let s: String = spooler.chars.iter().collect();
    assert_eq!(s, "a\nb\nc");
  }

  #[test]
  fn tracks_line_and_column() {
    let mut spooler = EntitySpooler::new(b"ab\ncd", Some(Encoding::UsAscii), false);
    spooler.next();
    spooler.next();
    assert_eq!((spooler.line(), spooler.column()), (1, 3));
    spooler.next(); // consumes the newline
    assert_eq!((spooler.line(), spooler.column()), (2, 1));
  }

  #[test]
  fn interned_content_suppresses_position_tracking() {
    let mut spooler = EntitySpooler::new(b"ab\ncd", Some(Encoding::UsAscii), true);
    spooler.next();
    spooler.next();
    spooler.next();
    assert_eq!((spooler.line(), spooler.column()), (1, 1));
  }

  #[test]
  fn declared_encoding_overrides_sensed_base() {
    // Sensed as UTF-8 from the `<?xm` signature, but the declaration
    // names ISO-8859-2; the trailing byte 0xE8 is 'č' (U+010D) in
    // ISO-8859-2 and an incomplete UTF-8 lead byte on its own, so the
    // two interpretations are distinguishable.
    let mut bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-2\"?>".to_vec();
    bytes.push(0xE8);
    let spooler = EntitySpooler::new(&bytes, None, true);
    let s: String = spooler.chars.iter().collect();
    assert!(s.ends_with('\u{10d}'), "expected ISO-8859-2 decode of 0xE8, got {s:?}");
  }

  #[test]
  fn missing_declaration_keeps_sensed_base() {
    let bytes = [0xEF, 0xBB, 0xBF, b'h', b'i'];
    let spooler = EntitySpooler::new(&bytes, None, true);
    let s: String = spooler.chars.iter().collect();
    assert_eq!(s, "hi");
  }

  #[test]
  fn match_literal_restores_position_on_mismatch() {
    let mut spooler = EntitySpooler::new(b"abc", Some(Encoding::UsAscii), false);
    assert!(!spooler.match_literal("abd"));
    assert_eq!(spooler.next(), Some('a'));
  }
}
