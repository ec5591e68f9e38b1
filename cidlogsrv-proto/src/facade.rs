//! §4.F Service facade: dispatches a decoded [`Request`] to the store
//! and maps whatever comes back into a [`Reply`], never letting a raw
//! `StoreError` cross into a wire reply (§7).

use std::sync::Arc;

use cidlogsrv_store::Store;
use tracing::instrument;

use crate::error::ServiceError;
use crate::message::{Reply, Request};

pub struct Facade {
  store: Arc<Store>,
}

impl Facade {
  pub fn new(store: Arc<Store>) -> Self {
    Self { store }
  }

  /// Dispatches one request. `is_admin` gates `AdminStop`: only the
  /// admin endpoint's listener passes `true` (§6's "two well-known
  /// endpoint bindings... the admin endpoint carries only
  /// `AdminStop()`").
  #[instrument(level = "debug", skip(self, request))]
  pub fn dispatch(&self, request: Request, is_admin: bool) -> Reply {
    match request {
      Request::LogOne(event) => self.log_one(event),
      Request::LogMany(events) => self.log_many(events),
      Request::QueryByCount { max_return } => Reply::Events(self.store.query_by_count(max_return)),
      Request::QueryByMinutes { max_return, minutes } => {
        Reply::Events(self.store.query_by_minutes(max_return, minutes))
      }
      Request::QueryFiltered {
        max_return,
        host_re,
        proc_re,
        fac_re,
        thread_re,
        sev_bits,
        class_bits,
      } => self.query_filtered(max_return, &host_re, &proc_re, &fac_re, &thread_re, sev_bits, class_bits),
      Request::GetLiveEvents { watermark } => {
        let reply = self.store.get_live_events(watermark);
        Reply::LiveEvents { events: reply.events, new_watermark: reply.new_watermark }
      }
      Request::RemoveAll => self.remove_all(),
      Request::DebugDump => Reply::Text(self.store.debug_dump()),
      Request::AdminStop if is_admin => Reply::Ack,
      Request::AdminStop => {
        Reply::from_service_error(ServiceError::InvalidArgument("AdminStop is admin-endpoint only".into()))
      }
    }
  }

  fn log_one(&self, event: cidlogsrv_store::LogEvent) -> Reply {
    match self.store.log_one(event) {
      Ok(()) => Reply::Ack,
      Err(e) => {
        tracing::error!(error = %e, "LogOne failed");
        Reply::from_service_error(e.into())
      }
    }
  }

  fn log_many(&self, events: Vec<cidlogsrv_store::LogEvent>) -> Reply {
    match self.store.log_many(&events) {
      Ok(()) => Reply::Ack,
      Err(e) => {
        tracing::error!(error = %e, count = events.len(), "LogMany failed");
        Reply::from_service_error(e.into())
      }
    }
  }

  #[allow(clippy::too_many_arguments)]
  fn query_filtered(
    &self,
    max_return: u32,
    host_re: &str,
    proc_re: &str,
    fac_re: &str,
    thread_re: &str,
    sev_bits: u64,
    class_bits: u64,
  ) -> Reply {
    match self.store.query_filtered(max_return, host_re, proc_re, fac_re, thread_re, sev_bits, class_bits) {
      Ok(events) => Reply::Events(events),
      Err(e) => {
        tracing::debug!(error = %e, "QueryFiltered rejected a bad pattern");
        Reply::from_service_error(e.into())
      }
    }
  }

  fn remove_all(&self) -> Reply {
    match self.store.remove_all() {
      Ok(()) => Reply::Ack,
      Err(e) => {
        tracing::error!(error = %e, "RemoveAll failed");
        Reply::from_service_error(e.into())
      }
    }
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use cidlogsrv_store::{ErrClass, LogEvent, Severity};
  use tempfile::tempdir;

  fn sample() -> LogEvent {
    LogEvent {
      logged_at: 1000,
      host: "h".into(),
      process: "p".into(),
      facility: "f".into(),
      thread: "t".into(),
      file: "main.rs".into(),
      message: "hi".into(),
      aux_text: String::new(),
      line: 1,
      severity: Severity::Info,
      err_class: ErrClass::Format,
      error_code: 0,
      kernel_error_code: 0,
      host_error_code: 0,
    }
  }

  fn facade() -> (Facade, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    (Facade::new(store), dir)
  }

  #[test]
  fn log_one_then_query_round_trips() {
    let (facade, _dir) = facade();
    let reply = facade.dispatch(Request::LogOne(sample()), false);
    assert!(matches!(reply, Reply::Ack));

    let reply = facade.dispatch(Request::QueryByCount { max_return: 10 }, false);
    match reply {
      Reply::Events(events) => {
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "hi");
      }
      other => panic!("expected Events, got {other:?}"),
    }
  }

  #[test]
  fn admin_stop_rejected_on_data_endpoint() {
    let (facade, _dir) = facade();
    let reply = facade.dispatch(Request::AdminStop, false);
    assert!(matches!(reply, Reply::Error { .. }));
  }

  #[test]
  fn admin_stop_accepted_on_admin_endpoint() {
    let (facade, _dir) = facade();
    let reply = facade.dispatch(Request::AdminStop, true);
    assert!(matches!(reply, Reply::Ack));
  }

  #[test]
  fn query_filtered_bad_regex_maps_to_invalid_argument() {
    let (facade, _dir) = facade();
    let reply = facade.dispatch(
      Request::QueryFiltered {
        max_return: 10,
        host_re: "(".into(),
        proc_re: "*".into(),
        fac_re: "*".into(),
        thread_re: "*".into(),
        sev_bits: 0,
        class_bits: 0,
      },
      false,
    );
    match reply {
      Reply::Error { message } => assert!(message.contains("invalid argument")),
      other => panic!("expected Error, got {other:?}"),
    }
  }
}
