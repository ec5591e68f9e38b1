//! §6's recognized command-line options, plus one ambient-only flag
//! (`--log-filter`) that governs the `tracing-subscriber` layer and is
//! deliberately NOT part of the store-visible configuration surface.

use std::path::PathBuf;

use clap::Parser;

/// Default listen port when `--port` is not given. cidlogsrv has no
/// IANA-registered port; this is this workspace's own well-known-port
/// convention, chosen to stay out of the ephemeral range.
pub const DEFAULT_PORT: u16 = 8830;

#[derive(Debug, Parser)]
#[command(name = "cidlogsrv", about = "Networked log-event store")]
pub struct Config {
  /// Listen port for the data endpoint. The admin endpoint binds to
  /// `port + 1`.
  #[arg(long, default_value_t = DEFAULT_PORT)]
  pub port: u16,

  /// Maximum concurrent client connections.
  #[arg(long, default_value_t = 256)]
  pub max: u32,

  /// Directory holding `CIDLogSrv.LogData` and its sibling temp/backup
  /// files.
  #[arg(long = "out-path", default_value = "./cidlogsrv-data")]
  pub out_path: PathBuf,

  /// `tracing-subscriber` `EnvFilter` string. Ambient-only: this flag
  /// has no effect on store behavior, only on diagnostic output.
  #[arg(long = "log-filter", default_value = "info")]
  pub log_filter: String,
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn parses_defaults() {
    let cfg = Config::parse_from(["cidlogsrv"]);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.max, 256);
  }

  #[test]
  fn parses_overrides() {
    let cfg = Config::parse_from(["cidlogsrv", "--port", "9000", "--max", "8", "--out-path", "/tmp/x"]);
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.max, 8);
    assert_eq!(cfg.out_path, PathBuf::from("/tmp/x"));
  }
}
