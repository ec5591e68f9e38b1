use thiserror::Error;

/// Fatal-to-store conditions distinct from per-operation errors (§7,
/// §9 "two classes of failure"). A `StoreError` either triggers a
/// panic-reset (corruption, mid-compaction I/O failure) or a process
/// exit (capacity exhausted with no recovery path left); it never
/// reaches a service client directly.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store file corrupt: {0}")]
  Corruption(String),

  #[error("capacity exhausted: no space after evict+compact+expand")]
  CapacityExhausted,

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
