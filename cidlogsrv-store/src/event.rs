//! The unit of data the store persists and the live-tail queue carries.
//!
//! `Severity`/`ErrClass` are `#[repr(u8)]`: the key index stores them as
//! raw bytes for filter-by-bitmask queries without touching the data
//! region. Text fields travel through [`cidlogsrv_codec`]'s UTF-8
//! converter rather than `serde_cbor`'s own string handling, so every
//! frame boundary crosses the same codec path the rest of the system
//! uses.
use cidlogsrv_codec::{Converter, Encoding, OnError};
use serde::{Deserialize, Serialize};

fn utf8() -> Converter {
  Converter::new(Encoding::Utf8)
}

/// Externalizes one text field through the UTF-8 converter. Replaces
/// rather than throws on the (practically unreachable, since the field
/// started life as a valid `&str`) error path, matching the "never
/// fatal" contract of §4.B for a call this deep in the write path.
fn externalize(s: &str) -> Vec<u8> {
  utf8().encode(s, OnError::Replace(b'?')).map(|(b, _)| b).unwrap_or_default()
}

fn internalize(b: &[u8]) -> String {
  utf8().decode(b, OnError::Replace('\u{FFFD}')).map(|(s, _)| s).unwrap_or_default()
}

/// Wire shape of [`LogEvent`]: text fields travel as the codec's
/// externalized bytes, not as `serde`-native `String`s.
#[derive(Serialize, Deserialize)]
struct WireEvent {
  logged_at: u64,
  host: Vec<u8>,
  process: Vec<u8>,
  facility: Vec<u8>,
  thread: Vec<u8>,
  file: Vec<u8>,
  message: Vec<u8>,
  aux_text: Vec<u8>,
  line: u32,
  severity: Severity,
  err_class: ErrClass,
  error_code: u32,
  kernel_error_code: u32,
  host_error_code: u32,
}

/// One-byte frame marker prefixed to every serialized event on disk,
/// matching §6's "framed by a 1-byte frame marker" requirement. Bumped
/// only if the wire shape of `LogEvent` changes incompatibly.
pub const FRAME_MARKER: u8 = 0xC1;

/// Events whose serialized form exceeds this are dropped at write time
/// (§3 invariant, §4.D.1 step 1).
pub const MAX_EVENT_BYTES: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
  Info = 0,
  Warn = 1,
  Failed = 2,
  ProcFatal = 3,
}

impl Severity {
  pub fn from_u8(v: u8) -> Option<Self> {
    match v {
      0 => Some(Severity::Info),
      1 => Some(Severity::Warn),
      2 => Some(Severity::Failed),
      3 => Some(Severity::ProcFatal),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrClass {
  Format = 0,
  NotFound = 1,
  Timeout = 2,
  Internal = 3,
  CantDo = 4,
}

impl ErrClass {
  pub fn from_u8(v: u8) -> Option<Self> {
    match v {
      0 => Some(ErrClass::Format),
      1 => Some(ErrClass::NotFound),
      2 => Some(ErrClass::Timeout),
      3 => Some(ErrClass::Internal),
      4 => Some(ErrClass::CantDo),
      _ => None,
    }
  }
}

/// Immutable record produced by a logger, consumed by the store and the
/// live-tail queue. `logged_at` is 100-nanosecond ticks since an epoch,
/// matching the original facility's `TTime` resolution; it is the sort
/// key for every time-ordered query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
  pub logged_at: u64,
  pub host: String,
  pub process: String,
  pub facility: String,
  pub thread: String,
  pub file: String,
  pub message: String,
  pub aux_text: String,
  pub line: u32,
  pub severity: Severity,
  pub err_class: ErrClass,
  pub error_code: u32,
  pub kernel_error_code: u32,
  pub host_error_code: u32,
}

impl LogEvent {
  /// Synthesizes an event for in-band protocol conditions (corrupt
  /// block, desync, missed events, bad watermark) that have no real
  /// logger behind them. Always `ProcFatal`/`Internal` severity so
  /// callers can tell synthetic events from real ones by inspection if
  /// they need to, without a dedicated flag crossing the wire.
  pub fn synthetic(message: impl Into<String>, logged_at: u64) -> Self {
    Self {
      logged_at,
      host: String::new(),
      process: String::new(),
      facility: String::from("cidlogsrv"),
      thread: String::new(),
      file: String::new(),
      message: message.into(),
      aux_text: String::new(),
      line: 0,
      severity: Severity::ProcFatal,
      err_class: ErrClass::Internal,
      error_code: 0,
      kernel_error_code: 0,
      host_error_code: 0,
    }
  }

  /// Serializes with the frame marker prefix. Returns `None` if the
  /// result would exceed `MAX_EVENT_BYTES` — the caller (write path)
  /// drops such events rather than treating this as an error.
  pub fn to_framed_bytes(&self) -> Option<Vec<u8>> {
    let wire = WireEvent {
      logged_at: self.logged_at,
      host: externalize(&self.host),
      process: externalize(&self.process),
      facility: externalize(&self.facility),
      thread: externalize(&self.thread),
      file: externalize(&self.file),
      message: externalize(&self.message),
      aux_text: externalize(&self.aux_text),
      line: self.line,
      severity: self.severity,
      err_class: self.err_class,
      error_code: self.error_code,
      kernel_error_code: self.kernel_error_code,
      host_error_code: self.host_error_code,
    };
    let mut buf = vec![FRAME_MARKER];
    serde_cbor::to_writer(&mut buf, &wire).ok()?;
    if buf.len() > MAX_EVENT_BYTES {
      None
    } else {
      Some(buf)
    }
  }

  pub fn from_framed_bytes(bytes: &[u8]) -> Option<Self> {
    if bytes.first() != Some(&FRAME_MARKER) {
      return None;
    }
    let wire: WireEvent = serde_cbor::from_slice(&bytes[1..]).ok()?;
    Some(Self {
      logged_at: wire.logged_at,
      host: internalize(&wire.host),
      process: internalize(&wire.process),
      facility: internalize(&wire.facility),
      thread: internalize(&wire.thread),
      file: internalize(&wire.file),
      message: internalize(&wire.message),
      aux_text: internalize(&wire.aux_text),
      line: wire.line,
      severity: wire.severity,
      err_class: wire.err_class,
      error_code: wire.error_code,
      kernel_error_code: wire.kernel_error_code,
      host_error_code: wire.host_error_code,
    })
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;

  fn sample() -> LogEvent {
    LogEvent {
      logged_at: 1000,
      host: "h".into(),
      process: "p".into(),
      facility: "f".into(),
      thread: "t".into(),
      file: "main.rs".into(),
      message: "a".into(),
      aux_text: String::new(),
      line: 42,
      severity: Severity::Info,
      err_class: ErrClass::Format,
      error_code: 0,
      kernel_error_code: 0,
      host_error_code: 0,
    }
  }

  #[test]
  fn round_trips_through_frame() {
    let ev = sample();
    let bytes = ev.to_framed_bytes().unwrap();
    let back = LogEvent::from_framed_bytes(&bytes).unwrap();
    assert_eq!(ev, back);
  }

  #[test]
  fn oversize_message_is_dropped_not_errored() {
    let mut ev = sample();
    ev.message = "x".repeat(MAX_EVENT_BYTES * 2);
    assert!(ev.to_framed_bytes().is_none());
  }
}
