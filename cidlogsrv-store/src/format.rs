//! On-disk layout constants and the fixed-size records that populate
//! them. Values are transcribed from the original facility's
//! `CIDLogSrv_Constant.hpp`/`CIDLogSrv_Type.hpp`.

pub const MAX_KEYS: usize = 8192;
pub const MAX_FREES: usize = MAX_KEYS / 4; // 2048
pub const FMT_VERSION: u32 = 1;
pub const EXPAND_BYTES: u64 = 256 * 1024;
pub const SENTINEL: u32 = 0xDEAD_BEEF;
pub const MARKER: &[u8; 7] = b"CIDLOG\0";
pub const RESIDUAL_ABSORB_BYTES: u32 = 128;

pub const LOG_FILE_NAME: &str = "CIDLogSrv.LogData";
pub const TMP_FILE_NAME: &str = "CIDLogSrv.TmpLogData";
pub const BACK_FILE_NAME: &str = "CIDLogSrv.BackLogData";

const HEADER_SIZE: u64 = 7 + 4 + 4 + 4 + 4 + 64;
const KEY_ITEM_SIZE: u64 = 4 + 4 + 8 + 1 + 1 + 1 + 1 + 4 + 4;
const FREE_ITEM_SIZE: u64 = 4 + 4;

/// Byte offset where the data region begins: header + key array +
/// sentinel + free array.
pub const STORE_OFFSET: u64 =
  HEADER_SIZE + KEY_ITEM_SIZE * MAX_KEYS as u64 + 4 + FREE_ITEM_SIZE * MAX_FREES as u64;

#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
  pub fmt_version: u32,
  pub last_seq: u32,
  pub frees_used: u32,
  pub keys_used: u32,
}

impl FileHeader {
  pub fn fresh() -> Self {
    Self { fmt_version: FMT_VERSION, last_seq: 1, frees_used: 0, keys_used: 0 }
  }

  pub fn write_to(&self, buf: &mut [u8]) {
    buf[0..7].copy_from_slice(MARKER);
    buf[7..11].copy_from_slice(&self.fmt_version.to_le_bytes());
    buf[11..15].copy_from_slice(&self.last_seq.to_le_bytes());
    buf[15..19].copy_from_slice(&self.frees_used.to_le_bytes());
    buf[19..23].copy_from_slice(&self.keys_used.to_le_bytes());
    // remaining 64 bytes are reserved and left zeroed by the caller
  }

  pub fn read_from(buf: &[u8]) -> Result<Self, &'static str> {
    if &buf[0..7] != MARKER {
      return Err("bad file marker");
    }
    Ok(Self {
      fmt_version: u32::from_le_bytes(buf[7..11].try_into().unwrap()),
      last_seq: u32::from_le_bytes(buf[11..15].try_into().unwrap()),
      frees_used: u32::from_le_bytes(buf[15..19].try_into().unwrap()),
      keys_used: u32::from_le_bytes(buf[19..23].try_into().unwrap()),
    })
  }

  pub const ON_DISK_SIZE: usize = HEADER_SIZE as usize;
}

/// One stored event's location, timestamp, and filter fields.
/// `offset` is relative to the start of the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyItem {
  pub offset: u32,
  pub size: u32,
  pub logged_at: u64,
  pub sev: u8,
  pub err_class: u8,
  pub seq: u32,
}

/// One contiguous unused span of the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeItem {
  pub offset: u32,
  pub size: u32,
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn header_round_trips() {
    let h = FileHeader { fmt_version: 1, last_seq: 42, frees_used: 3, keys_used: 7 };
    let mut buf = [0u8; FileHeader::ON_DISK_SIZE];
    h.write_to(&mut buf);
    let back = FileHeader::read_from(&buf).unwrap();
    assert_eq!(back.last_seq, 42);
    assert_eq!(back.frees_used, 3);
    assert_eq!(back.keys_used, 7);
  }

  #[test]
  fn rejects_bad_marker() {
    let buf = [0u8; FileHeader::ON_DISK_SIZE];
    assert!(FileHeader::read_from(&buf).is_err());
  }
}
