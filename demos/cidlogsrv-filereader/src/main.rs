//! Offline reader for a `cidlogsrv` store directory.
//!
//! Unlike `demos/cidlogsrv-client`, which talks to a running server over
//! the wire protocol, this opens `CIDLogSrv.LogData` directly through
//! `cidlogsrv-store::Store` the same way the server binary does — useful
//! for inspecting a store while the server is down, since §5 treats the
//! file as exclusively owned by whichever process has it open. Also
//! doubles as a small demo of `cidlogsrv-codec`'s encoding auto-sense
//! (§4.A `ProbeForEncoding`, §4.C's signature table), since both
//! consume the codec crate independently of the store.

use std::path::PathBuf;

use cidlogsrv_codec::{spooler, Registry};
use cidlogsrv_store::Store;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cidlogsrv-filereader", about = "Offline cidlogsrv store reader")]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Open a store directory and print every stored event in time order.
  Dump {
    /// Directory holding CIDLogSrv.LogData and its sibling files.
    out_path: PathBuf,
  },
  /// Print up to `max` of the most recent events.
  Tail {
    out_path: PathBuf,
    #[arg(long, default_value_t = 50)]
    max: u32,
  },
  /// Sense the base encoding of a byte file the way the entity spooler
  /// would before any XML declaration has been read.
  Sense {
    path: PathBuf,
  },
}

fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  match args.command {
    Command::Dump { out_path } => {
      let store = Store::open(&out_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
      print!("{}", store.debug_dump());
    }
    Command::Tail { out_path, max } => {
      let store = Store::open(&out_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
      for event in store.query_by_count(max) {
        println!(
          "[{}] {:?}/{:?} {}/{}: {}",
          event.logged_at, event.severity, event.err_class, event.host, event.process,
          event.message
        );
      }
    }
    Command::Sense { path } => {
      let bytes = std::fs::read(&path)?;
      let prefix = &bytes[..bytes.len().min(6)];
      let sensed = spooler::sense(prefix);
      println!("entity-spooler sense: {sensed:?}");
      match Registry::probe_for_encoding(&bytes) {
        Some(alias) => println!("registry BOM probe: {alias}"),
        None => println!("registry BOM probe: no BOM recognized"),
      }
    }
  }

  Ok(())
}
