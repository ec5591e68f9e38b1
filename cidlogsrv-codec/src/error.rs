use thiserror::Error;

/// Scoped to a single transcoding call. Never fatal to a store or a
/// connection; callers surface it to whoever asked for the conversion.
#[derive(Debug, Error)]
pub enum CodecError {
  #[error("no converter registered for encoding '{0}'")]
  UnknownEncoding(String),

  #[error("invalid byte sequence for encoding '{encoding}'")]
  BadSource { encoding: String },

  #[error("codepoint U+{codepoint:04X} is not representable in '{encoding}'")]
  Unrepresentable { codepoint: u32, encoding: String },
}
