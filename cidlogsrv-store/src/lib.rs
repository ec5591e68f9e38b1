//! Persistent, crash-tolerant log event store (spec §3, §4.D, §4.E):
//! single-file storage with an in-memory key index and free-list
//! allocator, a bounded live-tail queue, and a background flusher.
//!
//! [`Store`] is the crate's single public entry point; everything else
//! here is the data it's built from.

pub mod error;
pub mod event;
pub mod format;
pub mod live_tail;
pub mod store;

pub use error::StoreError;
pub use event::{ErrClass, LogEvent, Severity};
pub use live_tail::{LiveEventsReply, LiveTail};
pub use store::{now_ticks, Store};
