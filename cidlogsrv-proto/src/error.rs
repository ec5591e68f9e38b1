use thiserror::Error;

/// The only error shapes a client ever sees (§7's propagation policy:
/// "the service facade never propagates raw file-system errors to
/// clients"). Every `StoreError`/`CodecError`/`regex::Error` the facade
/// encounters gets mapped into one of these three before it crosses
/// the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
  #[error("store unavailable")]
  Unavailable,

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("internal error")]
  Internal,
}

impl From<cidlogsrv_store::StoreError> for ServiceError {
  fn from(e: cidlogsrv_store::StoreError) -> Self {
    match e {
      cidlogsrv_store::StoreError::Corruption(_) => ServiceError::Unavailable,
      cidlogsrv_store::StoreError::CapacityExhausted => ServiceError::Unavailable,
      cidlogsrv_store::StoreError::Io(_) => ServiceError::Internal,
    }
  }
}

impl From<regex::Error> for ServiceError {
  fn from(e: regex::Error) -> Self {
    ServiceError::InvalidArgument(e.to_string())
  }
}
