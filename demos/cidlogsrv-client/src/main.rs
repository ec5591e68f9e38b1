//! Example client for a running `cidlogsrv` data endpoint: logs a
//! handful of synthetic events, then demonstrates each of §4.F's query
//! shapes against them. Renamed from the teacher's own `examples/`
//! member directory (kept as `demos/` here to avoid colliding with the
//! read-only retrieval pack directory of the same name).

use std::net::TcpStream;
use std::time::{SystemTime, UNIX_EPOCH};

use cidlogsrv_proto::{read_frame, write_frame, Reply, Request};
use cidlogsrv_store::{ErrClass, LogEvent, Severity};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cidlogsrv-client", about = "Example client for cidlogsrv")]
struct Args {
  #[arg(long, default_value = "127.0.0.1:8830")]
  addr: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Write a handful of sample events, then read them back.
  Demo {
    #[arg(long, default_value_t = 5)]
    count: u32,
  },
  /// Print up to `max` of the most recent events.
  Query {
    #[arg(long, default_value_t = 50)]
    max: u32,
  },
  /// Render the server's human-readable debug dump.
  Dump,
}

fn ticks_now() -> u64 {
  let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
  d.as_secs() * 10_000_000 + (d.subsec_nanos() as u64) / 100
}

fn sample_event(i: u32) -> LogEvent {
  LogEvent {
    logged_at: ticks_now(),
    host: "demo-host".into(),
    process: "cidlogsrv-client".into(),
    facility: "demo".into(),
    thread: "main".into(),
    file: "main.rs".into(),
    message: format!("sample event #{i}"),
    aux_text: String::new(),
    line: 42,
    severity: if i % 5 == 0 { Severity::Warn } else { Severity::Info },
    err_class: ErrClass::Format,
    error_code: 0,
    kernel_error_code: 0,
    host_error_code: 0,
  }
}

fn call(stream: &mut TcpStream, request: &Request) -> std::io::Result<Reply> {
  write_frame(stream, request)?;
  read_frame(stream)
}

fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt::init();
  let args = Args::parse();
  let mut stream = TcpStream::connect(&args.addr)?;
  tracing::info!(addr = %args.addr, "connected to cidlogsrv");

  match args.command {
    Command::Demo { count } => {
      let events: Vec<LogEvent> = (0..count).map(sample_event).collect();
      let reply = call(&mut stream, &Request::LogMany(events))?;
      println!("LogMany -> {reply:?}");

      let reply = call(&mut stream, &Request::QueryByCount { max_return: count })?;
      if let Reply::Events(events) = reply {
        for e in events {
          println!("[{}] {:?} {}/{}: {}", e.logged_at, e.severity, e.host, e.process, e.message);
        }
      }
    }
    Command::Query { max } => {
      let reply = call(&mut stream, &Request::QueryByCount { max_return: max })?;
      if let Reply::Events(events) = reply {
        for e in events {
          println!("[{}] {:?} {}/{}: {}", e.logged_at, e.severity, e.host, e.process, e.message);
        }
      }
    }
    Command::Dump => {
      let reply = call(&mut stream, &Request::DebugDump)?;
      if let Reply::Text(text) = reply {
        println!("{text}");
      }
    }
  }

  Ok(())
}
