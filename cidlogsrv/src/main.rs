//! Process entry point: CLI parsing, tracing init, a panic hook, and
//! the TCP transport that binds the data and admin endpoints (§6) onto
//! `cidlogsrv-proto`'s transport-independent [`Facade`].
//!
//! Scheduling follows §5 directly: one OS thread per connection, plus
//! the store's own dedicated flusher thread. There is no async runtime
//! here — blocking I/O is expected and fine for this workload.

mod config;

use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cidlogsrv_proto::{read_frame, write_frame, Facade, Reply, Request};
use cidlogsrv_store::Store;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;

fn main() {
  let config = Config::parse();
  init_tracing(&config.log_filter);
  install_panic_hook();

  tracing::info!(
    port = config.port,
    admin_port = config.port + 1,
    out_path = %config.out_path.display(),
    max = config.max,
    "cidlogsrv starting"
  );

  let store = match Store::open(&config.out_path) {
    Ok(s) => Arc::new(s),
    Err(e) => {
      tracing::error!(error = %e, "failed to open store, exiting");
      std::process::exit(1);
    }
  };

  let flusher = Store::spawn_flusher(Arc::clone(&store));
  let facade = Arc::new(Facade::new(Arc::clone(&store)));
  let active = Arc::new(AtomicUsize::new(0));

  let admin_handle = {
    let facade = Arc::clone(&facade);
    let store = Arc::clone(&store);
    let admin_port = config.port + 1;
    std::thread::spawn(move || run_admin_endpoint(admin_port, facade, store))
  };

  run_data_endpoint(config.port, facade, active, config.max);

  // Only reached if the data listener itself fails to bind; a clean
  // AdminStop exits the process directly from run_admin_endpoint.
  let _ = admin_handle.join();
  store.request_shutdown();
  let _ = flusher.join();
}

fn init_tracing(filter: &str) {
  let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Logs uncaught panics instead of letting them vanish into the
/// default panic message; does not attempt recovery of any kind (the
/// store's own corruption handling is §4.D.7's panic-reset, a
/// deliberately separate concept from a process-level panic).
fn install_panic_hook() {
  std::panic::set_hook(Box::new(|info| {
    tracing::error!(panic = %info, "uncaught panic");
  }));
}

/// The data endpoint: accepts `LogOne`/`LogMany`/`Query*`/`GetLiveEvents`/
/// `RemoveAll`/`DebugDump`, one thread per connection. Rejects `AdminStop`
/// (§6: only the admin endpoint carries it).
fn run_data_endpoint(port: u16, facade: Arc<Facade>, active: Arc<AtomicUsize>, max: u32) {
  let listener = match TcpListener::bind(("0.0.0.0", port)) {
    Ok(l) => l,
    Err(e) => {
      tracing::error!(error = %e, port, "failed to bind data endpoint");
      std::process::exit(1);
    }
  };
  tracing::info!(port, "data endpoint listening");

  for stream in listener.incoming() {
    let stream = match stream {
      Ok(s) => s,
      Err(e) => {
        tracing::warn!(error = %e, "failed to accept data connection");
        continue;
      }
    };
    if active.load(Ordering::Relaxed) as u32 >= max {
      tracing::warn!(max, "rejecting connection: max concurrent clients reached");
      drop(stream);
      continue;
    }
    active.fetch_add(1, Ordering::Relaxed);
    let facade = Arc::clone(&facade);
    let active = Arc::clone(&active);
    std::thread::spawn(move || {
      serve_connection(stream, &facade, false);
      active.fetch_sub(1, Ordering::Relaxed);
    });
  }
}

/// The admin endpoint: carries only `AdminStop` (§6). On receipt, acks
/// the caller, flushes the store, and exits the process — the
/// reference implementation's remote-admin shutdown is an external
/// collaborator spec'd only at this interface (§1).
fn run_admin_endpoint(port: u16, facade: Arc<Facade>, store: Arc<Store>) {
  let listener = match TcpListener::bind(("0.0.0.0", port)) {
    Ok(l) => l,
    Err(e) => {
      tracing::error!(error = %e, port, "failed to bind admin endpoint");
      return;
    }
  };
  tracing::info!(port, "admin endpoint listening");

  for stream in listener.incoming() {
    let mut stream = match stream {
      Ok(s) => s,
      Err(e) => {
        tracing::warn!(error = %e, "failed to accept admin connection");
        continue;
      }
    };
    let request: Request = match read_frame(&mut stream) {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!(error = %e, "bad admin request frame");
        continue;
      }
    };
    let is_stop = matches!(request, Request::AdminStop);
    let reply = facade.dispatch(request, true);
    let _ = write_frame(&mut stream, &reply);
    if is_stop {
      tracing::info!("AdminStop received, shutting down");
      if let Err(e) = store.shutdown() {
        tracing::error!(error = %e, "final flush on shutdown failed");
      }
      std::process::exit(0);
    }
  }
}

/// One connection's lifetime: read frames, dispatch, reply, until the
/// peer closes the stream or a frame fails to parse.
fn serve_connection(mut stream: TcpStream, facade: &Facade, is_admin: bool) {
  loop {
    let request: Request = match read_frame(&mut stream) {
      Ok(r) => r,
      Err(e) if e.kind() == ErrorKind::UnexpectedEof => return,
      Err(e) => {
        tracing::debug!(error = %e, "connection closed on bad frame");
        return;
      }
    };
    let reply: Reply = facade.dispatch(request, is_admin);
    if write_frame(&mut stream, &reply).is_err() {
      return;
    }
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use cidlogsrv_proto::Request;
  use std::io::Write;
  use std::net::TcpStream as StdStream;
  use tempfile::tempdir;

  fn facade() -> (Arc<Facade>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    (Arc::new(Facade::new(store)), dir)
  }

  #[test]
  fn serve_connection_handles_one_round_trip_over_a_socket_pair() {
    let (facade, _dir) = facade();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
      let (stream, _) = listener.accept().unwrap();
      serve_connection(stream, &facade, false);
    });

    let mut client: StdStream = StdStream::connect(addr).unwrap();
    write_frame(&mut client, &Request::QueryByCount { max_return: 10 }).unwrap();
    let reply: Reply = read_frame(&mut client).unwrap();
    assert!(matches!(reply, Reply::Events(events) if events.is_empty()));

    drop(client);
    server.join().unwrap();
  }

  #[test]
  fn bad_frame_closes_connection_without_panicking() {
    let (facade, _dir) = facade();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
      let (stream, _) = listener.accept().unwrap();
      serve_connection(stream, &facade, false);
    });

    let mut client: StdStream = StdStream::connect(addr).unwrap();
    client.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
    drop(client);
    server.join().unwrap();
  }
}
