//! §6's "method-oriented RPC with call/reply semantics": one call, one
//! reply, typed arguments. The eight operations here match §4.F
//! exactly, plus `AdminStop`, which the admin endpoint alone accepts.

use cidlogsrv_store::LogEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
  LogOne(LogEvent),
  LogMany(Vec<LogEvent>),
  QueryByCount { max_return: u32 },
  QueryByMinutes { max_return: u32, minutes: u32 },
  QueryFiltered {
    max_return: u32,
    host_re: String,
    proc_re: String,
    fac_re: String,
    thread_re: String,
    sev_bits: u64,
    class_bits: u64,
  },
  GetLiveEvents { watermark: u64 },
  RemoveAll,
  DebugDump,
  /// Admin-endpoint-only; the data endpoint rejects this with
  /// `InvalidArgument`.
  AdminStop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Reply {
  Ack,
  Events(Vec<LogEvent>),
  LiveEvents { events: Vec<LogEvent>, new_watermark: u64 },
  Text(String),
  Error { message: String },
}

impl Reply {
  pub fn from_service_error(e: crate::error::ServiceError) -> Self {
    Reply::Error { message: e.to_string() }
  }
}
