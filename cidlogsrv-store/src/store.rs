//! The persistent log store (§4.D): header + key index + free list +
//! data region in a single file, one write-preferring lock guarding
//! all of it (§5). Everything in this module runs under `Store`'s
//! `Mutex<Inner>` — queries included, since query cost is dominated by
//! disk I/O and the typical write rate is low (§5's "simpler full
//! exclusion model suffices").

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use tracing::instrument;

use crate::error::StoreError;
use crate::event::LogEvent;
use crate::format::{
  FileHeader, FreeItem, KeyItem, BACK_FILE_NAME, EXPAND_BYTES, FMT_VERSION, LOG_FILE_NAME,
  MAX_FREES, MAX_KEYS, RESIDUAL_ABSORB_BYTES, SENTINEL, STORE_OFFSET, TMP_FILE_NAME,
};
use crate::live_tail::{LiveEventsReply, LiveTail};

/// Evicted per eviction cycle, per §4.D.1 step 2 and §4.D.4.
const EVICT_BATCH: usize = 512;
/// §4.D.6: free-list coalescing is only worth the sort once this many
/// free entries have piled up.
const COALESCE_THRESHOLD: usize = 64;
/// 100-nanosecond ticks per second, for `QueryByMinutes`'s window math.
const TICKS_PER_SEC: u64 = 10_000_000;

/// 100ns ticks since the Unix epoch. Not the original facility's NT
/// epoch — callers only ever compare `logged_at` values produced by
/// this same function, so the epoch choice is invisible to them.
pub fn now_ticks() -> u64 {
  let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
  d.as_secs() * TICKS_PER_SEC + (d.subsec_nanos() as u64) / 100
}

struct Inner {
  file: File,
  dir: PathBuf,
  last_seq: u32,
  last_flushed_seq: u32,
  keys: Vec<KeyItem>,
  frees: Vec<FreeItem>,
  data_len: u64,
  live_tail: LiveTail,
  oversize_dropped: u64,
}

/// Owns the single on-disk file and every in-memory structure derived
/// from it. Construct with [`Store::open`]; the background flusher is
/// started separately via [`Store::spawn_flusher`] so tests can drive
/// the store without a live thread if they don't need one.
pub struct Store {
  inner: Mutex<Inner>,
  shutdown: AtomicBool,
  /// Bumped on every successful write; the flusher polls this instead
  /// of re-deriving it from `Inner::last_seq` under lock on every tick.
  seq_hint: AtomicU64,
}

impl Store {
  /// Opens (or initializes, §4.D.8) the store rooted at `dir`.
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let dir = dir.into();
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE_NAME);

    let inner = if path.exists() {
      Self::load(&dir, &path)?
    } else {
      Self::init_fresh(&dir, &path)?
    };

    let seq_hint = AtomicU64::new(inner.last_seq as u64);
    Ok(Self { inner: Mutex::new(inner), shutdown: AtomicBool::new(false), seq_hint })
  }

  fn init_fresh(dir: &Path, path: &Path) -> Result<Inner, StoreError> {
    let mut file = OpenOptions::new().create(true).read(true).write(true).open(path)?;
    file.set_len(STORE_OFFSET + 2 * EXPAND_BYTES)?;

    let header = FileHeader::fresh();
    write_header(&mut file, &header, &[], &[])?;

    let frees = vec![FreeItem { offset: 0, size: (2 * EXPAND_BYTES) as u32 }];
    write_frees(&mut file, &frees)?;
    file.flush()?;

    Ok(Inner {
      file,
      dir: dir.to_path_buf(),
      last_seq: header.last_seq,
      last_flushed_seq: header.last_seq,
      keys: Vec::new(),
      frees,
      data_len: 2 * EXPAND_BYTES,
      live_tail: LiveTail::new(),
      oversize_dropped: 0,
    })
  }

  fn load(dir: &Path, path: &Path) -> Result<Inner, StoreError> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let file_len = file.metadata()?.len();
    if file_len < STORE_OFFSET {
      return Err(StoreError::Corruption("file shorter than STORE_OFFSET".into()));
    }

    let mut header_buf = [0u8; FileHeader::ON_DISK_SIZE];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut header_buf)?;
    let header = FileHeader::read_from(&header_buf)
      .map_err(|e| StoreError::Corruption(e.to_string()))?;

    let keys = read_keys(&mut file, header.keys_used)?;
    verify_sentinel(&mut file)?;
    let frees = read_frees(&mut file, header.frees_used)?;

    Ok(Inner {
      file,
      dir: dir.to_path_buf(),
      last_seq: header.last_seq,
      last_flushed_seq: header.last_seq,
      keys,
      frees,
      data_len: file_len - STORE_OFFSET,
      live_tail: LiveTail::new(),
      oversize_dropped: 0,
    })
  }

  // ---------------------------------------------------------------- writes

  /// §4.F `LogOne`.
  #[instrument(level = "debug", skip(self, event))]
  pub fn log_one(&self, event: LogEvent) -> Result<(), StoreError> {
    self.log_many(std::slice::from_ref(&event))
  }

  /// §4.F `LogMany` / §4.D.1. All events in one call commit under a
  /// single lock acquisition, so they appear to readers as a
  /// contiguous prefix of the log.
  #[instrument(level = "debug", skip(self, events), fields(count = events.len()))]
  pub fn log_many(&self, events: &[LogEvent]) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().unwrap();
    for event in events {
      inner.write_one(event)?;
    }
    self.seq_hint.store(inner.last_seq as u64, Ordering::Relaxed);
    Ok(())
  }

  // ---------------------------------------------------------------- reads

  /// §4.D.2 `QueryByCount`.
  #[instrument(level = "debug", skip(self))]
  pub fn query_by_count(&self, max_return: u32) -> Vec<LogEvent> {
    let inner = self.inner.lock().unwrap();
    let n = clamp_max(max_return, inner.keys.len());
    let sorted = inner.sorted_view();
    let start = sorted.len().saturating_sub(n);
    sorted[start..].iter().map(|&idx| inner.read_event_or_placeholder(idx)).collect()
  }

  /// §4.D.3 `QueryByMinutes`.
  #[instrument(level = "debug", skip(self))]
  pub fn query_by_minutes(&self, max_return: u32, minutes: u32) -> Vec<LogEvent> {
    let inner = self.inner.lock().unwrap();
    let n = clamp_max(max_return, inner.keys.len());
    let cutoff = now_ticks().saturating_sub(minutes as u64 * 60 * TICKS_PER_SEC);
    let sorted = inner.sorted_view();
    let mut out: Vec<LogEvent> = Vec::new();
    for &idx in sorted.iter().rev() {
      if inner.keys[idx].logged_at < cutoff {
        break;
      }
      out.push(inner.read_event_or_placeholder(idx));
      if out.len() == n {
        break;
      }
    }
    out.reverse();
    out
  }

  /// §4.D.3 `QueryFiltered`. Regex compile failures are the caller's
  /// bad argument (§7), not the store's fault, so they come back as a
  /// typed error rather than an empty result.
  ///
  /// `sev_bits`/`class_bits` are ANDed against each key's recorded
  /// severity/class bit, matching the original facility's
  /// `CIDLogSrv_Impl.cpp` filter check: a `0` mask matches nothing, not
  /// everything. A caller wanting no filtering on a dimension must pass
  /// a mask with every bit it cares about set.
  #[allow(clippy::too_many_arguments)]
  #[instrument(level = "debug", skip(self, host_re, proc_re, fac_re, thread_re))]
  pub fn query_filtered(
    &self,
    max_return: u32,
    host_re: &str,
    proc_re: &str,
    fac_re: &str,
    thread_re: &str,
    sev_bits: u64,
    class_bits: u64,
  ) -> Result<Vec<LogEvent>, regex::Error> {
    let host_re = compile_unless_wildcard(host_re)?;
    let proc_re = compile_unless_wildcard(proc_re)?;
    let fac_re = compile_unless_wildcard(fac_re)?;
    let thread_re = compile_unless_wildcard(thread_re)?;

    let inner = self.inner.lock().unwrap();
    let n = clamp_max(max_return, inner.keys.len());
    let sorted = inner.sorted_view();
    let mut out = Vec::new();

    for &idx in sorted.iter().rev() {
      let key = &inner.keys[idx];
      if (sev_bits & (1 << key.sev)) == 0 {
        continue;
      }
      if (class_bits & (1 << key.err_class)) == 0 {
        continue;
      }
      let event = inner.read_event_or_placeholder(idx);
      if let Some(re) = &host_re {
        if !re.is_match(&event.host) {
          continue;
        }
      }
      if let Some(re) = &proc_re {
        if !re.is_match(&event.process) {
          continue;
        }
      }
      if let Some(re) = &fac_re {
        if !re.is_match(&event.facility) {
          continue;
        }
      }
      if let Some(re) = &thread_re {
        if !re.is_match(&event.thread) {
          continue;
        }
      }
      out.push(event);
      if out.len() == n {
        break;
      }
    }
    Ok(out)
  }

  /// §4.E `GetLiveEvents`.
  pub fn get_live_events(&self, watermark: u64) -> LiveEventsReply {
    let inner = self.inner.lock().unwrap();
    inner.live_tail.get_live_events(watermark)
  }

  /// §4.F `RemoveAll`.
  pub fn remove_all(&self) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().unwrap();
    inner.keys.clear();
    inner.frees = vec![FreeItem { offset: 0, size: inner.data_len as u32 }];
    inner.flush_header_and_indices()?;
    inner.live_tail.clear();
    Ok(())
  }

  /// §4.F `DebugDump`: a human-readable report, not a stable format.
  pub fn debug_dump(&self) -> String {
    let inner = self.inner.lock().unwrap();
    let sorted = inner.sorted_view();
    let mut out = String::new();
    out.push_str(&format!(
      "cidlogsrv store: {} live keys, {} free blocks, last_seq={}, oversize_dropped={}\n",
      inner.keys.len(),
      inner.frees.len(),
      inner.last_seq,
      inner.oversize_dropped
    ));
    for idx in sorted {
      let key = &inner.keys[idx];
      let event = inner.read_event_or_placeholder(idx);
      out.push_str(&format!(
        "[{:020}] seq={} sev={:?} class={:?} {}/{}: {}\n",
        event.logged_at, key.seq, event.severity, event.err_class, event.host, event.process,
        event.message
      ));
    }
    out
  }

  pub fn oversize_dropped(&self) -> u64 {
    self.inner.lock().unwrap().oversize_dropped
  }

  // ---------------------------------------------------------------- flusher

  /// §4.D.9: ticks every second, flushing the header and both index
  /// arrays if `last_seq` advanced since the prior tick. Call
  /// `request_shutdown` and then join the returned handle for a clean
  /// stop.
  pub fn spawn_flusher(store: std::sync::Arc<Store>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
      std::thread::sleep(std::time::Duration::from_secs(1));
      if store.shutdown.load(Ordering::Relaxed) {
        break;
      }
      let current = store.seq_hint.load(Ordering::Relaxed) as u32;
      let mut inner = store.inner.lock().unwrap();
      if current != inner.last_flushed_seq {
        if let Err(e) = inner.flush_header_and_indices() {
          tracing::error!(error = %e, "background flush failed");
        } else {
          inner.last_flushed_seq = current;
        }
      }
      drop(inner);
      if store.shutdown.load(Ordering::Relaxed) {
        break;
      }
    })
  }

  pub fn request_shutdown(&self) {
    self.shutdown.store(true, Ordering::Relaxed);
  }

  /// Final header write on clean shutdown, per §4.D.9.
  pub fn shutdown(&self) -> Result<(), StoreError> {
    self.request_shutdown();
    let mut inner = self.inner.lock().unwrap();
    inner.flush_header_and_indices()?;
    inner.file.sync_all()?;
    Ok(())
  }
}

fn clamp_max(max_return: u32, keys_used: usize) -> usize {
  let m = if max_return == 0 { 256 } else { max_return.clamp(1, 256) };
  (m as usize).min(keys_used)
}

fn compile_unless_wildcard(pattern: &str) -> Result<Option<Regex>, regex::Error> {
  if pattern == "*" {
    Ok(None)
  } else {
    Ok(Some(Regex::new(pattern)?))
  }
}

impl Inner {
  /// §4.D.1: the full single-event write path.
  fn write_one(&mut self, event: &LogEvent) -> Result<(), StoreError> {
    let bytes = match event.to_framed_bytes() {
      Some(b) => b,
      None => {
        self.oversize_dropped += 1;
        tracing::debug!(oversize_dropped = self.oversize_dropped, "dropped oversize event");
        return Ok(());
      }
    };
    let needed = bytes.len() as u32;

    if self.keys.len() >= MAX_KEYS {
      self.evict_oldest(EVICT_BATCH)?;
    }

    let free_idx = self.find_slot_with_recovery(needed)?;

    let block_offset = self.frees[free_idx].offset;
    self.file.seek(SeekFrom::Start(STORE_OFFSET + block_offset as u64))?;
    self.file.write_all(&bytes)?;

    let seq = self.last_seq;
    self.last_seq = self.last_seq.wrapping_add(1);

    let mut key_size = needed;
    let residual = self.frees[free_idx].size - needed;
    if residual < RESIDUAL_ABSORB_BYTES {
      key_size += residual;
      self.frees.remove(free_idx);
    } else {
      self.frees[free_idx].offset += needed;
      self.frees[free_idx].size = residual;
    }

    self.keys.push(KeyItem {
      offset: block_offset,
      size: key_size,
      logged_at: event.logged_at,
      sev: event.severity as u8,
      err_class: event.err_class as u8,
      seq,
    });

    self.live_tail.push(event.clone());
    Ok(())
  }

  /// Steps 3-7 of §4.D.1: find-or-make a free block big enough for
  /// `needed` bytes, escalating through expansion, coalescing, and
  /// full compaction before giving up.
  fn find_slot_with_recovery(&mut self, needed: u32) -> Result<usize, StoreError> {
    if let Some(i) = self.first_fit(needed) {
      return Ok(i);
    }
    if self.keys.len() < MAX_KEYS {
      self.expand_file()?;
      if let Some(i) = self.first_fit(needed) {
        return Ok(i);
      }
    }
    if self.frees.len() >= COALESCE_THRESHOLD {
      self.coalesce_frees();
      if let Some(i) = self.first_fit(needed) {
        return Ok(i);
      }
    }
    tracing::warn!(needed, "free list exhausted, running full compaction");
    self.full_compact()?;
    if let Some(i) = self.first_fit(needed) {
      return Ok(i);
    }
    self.evict_oldest(EVICT_BATCH)?;
    self.first_fit(needed).ok_or(StoreError::CapacityExhausted)
  }

  fn first_fit(&self, needed: u32) -> Option<usize> {
    self.frees.iter().position(|f| f.size >= needed)
  }

  /// §4.D.4. If `n` would clear out the whole key list, defers to the
  /// simpler `RemoveAll` reset instead.
  fn evict_oldest(&mut self, n: usize) -> Result<(), StoreError> {
    if n >= self.keys.len() {
      self.keys.clear();
      self.frees = vec![FreeItem { offset: 0, size: self.data_len as u32 }];
      self.flush_header_and_indices()?;
      return Ok(());
    }

    let mut order: Vec<usize> = (0..self.keys.len()).collect();
    order.sort_by_key(|&i| self.keys[i].logged_at);

    let mut candidate_blocks: Vec<(u32, u32, usize)> =
      order[..n].iter().map(|&i| (self.keys[i].offset, self.keys[i].size, i)).collect();
    candidate_blocks.sort_by_key(|&(off, _, _)| off);

    // Only a key whose block actually lands in `new_frees` is removed
    // below; if the cap stops the walk partway, the remaining
    // candidates (and their keys) are left untouched rather than
    // dropped with no corresponding free span.
    let mut new_frees: Vec<FreeItem> = Vec::new();
    let mut evicted: std::collections::HashSet<usize> = std::collections::HashSet::new();
    for (off, size, key_idx) in candidate_blocks {
      let merges_with_last = matches!(new_frees.last(), Some(last) if last.offset + last.size == off);
      if !merges_with_last && new_frees.len() >= MAX_FREES {
        break;
      }
      match new_frees.last_mut() {
        Some(last) if last.offset + last.size == off => last.size += size,
        _ => new_frees.push(FreeItem { offset: off, size }),
      }
      evicted.insert(key_idx);
    }

    self.keys = (0..self.keys.len())
      .filter(|i| !evicted.contains(i))
      .map(|i| self.keys[i])
      .collect();

    self.frees.extend(new_frees);
    if self.frees.len() > 256 {
      self.coalesce_frees();
    }
    self.flush_header_and_indices()?;
    tracing::warn!(evicted = evicted.len(), remaining_keys = self.keys.len(), "evicted oldest events");
    Ok(())
  }

  /// §4.D.5. Appends `EXPAND_BYTES` of zeroed space, growing the
  /// trailing free entry in place when the new region is contiguous
  /// with it rather than slivering a new one.
  fn expand_file(&mut self) -> Result<(), StoreError> {
    let old_len = self.file.metadata()?.len();
    let result = self.file.set_len(old_len + EXPAND_BYTES);
    if let Err(e) = result {
      self.file.set_len(old_len)?;
      return Err(e.into());
    }

    let new_region_offset = self.data_len as u32;
    match self
      .frees
      .iter_mut()
      .find(|f| f.offset + f.size == new_region_offset)
    {
      Some(f) => f.size += EXPAND_BYTES as u32,
      None => self.frees.push(FreeItem { offset: new_region_offset, size: EXPAND_BYTES as u32 }),
    }
    self.data_len += EXPAND_BYTES;
    Ok(())
  }

  /// §4.D.6. Returns the first post-coalesce free index with room for
  /// `needed`, though callers re-run `first_fit` themselves; this just
  /// performs the merge.
  fn coalesce_frees(&mut self) {
    self.frees.sort_by_key(|f| f.offset);
    let mut merged: Vec<FreeItem> = Vec::with_capacity(self.frees.len());
    for f in &self.frees {
      match merged.last_mut() {
        Some(last) if last.offset + last.size == f.offset => last.size += f.size,
        _ => merged.push(*f),
      }
    }
    self.frees = merged;
  }

  /// §4.D.7. Rewrites the file with every live key's bytes packed
  /// contiguously in offset order, followed by one trailing free
  /// region. On any I/O failure along the way, panic-resets rather
  /// than risking a half-written store.
  fn full_compact(&mut self) -> Result<(), StoreError> {
    match self.try_full_compact() {
      Ok(()) => Ok(()),
      Err(e) => {
        tracing::error!(error = %e, "compaction failed, panic-resetting store");
        self.panic_reset()?;
        Ok(())
      }
    }
  }

  fn try_full_compact(&mut self) -> Result<(), StoreError> {
    let tmp_path = self.dir.join(TMP_FILE_NAME);
    let back_path = self.dir.join(BACK_FILE_NAME);
    let live_path = self.dir.join(LOG_FILE_NAME);

    let mut tmp = OpenOptions::new().create(true).write(true).truncate(true).read(true).open(&tmp_path)?;
    tmp.set_len(STORE_OFFSET)?; // placeholder header region, filled in below

    let mut order: Vec<usize> = (0..self.keys.len()).collect();
    order.sort_by_key(|&i| self.keys[i].offset);

    let mut cursor = 0u32;
    let mut new_keys = self.keys.clone();
    const CHUNK: usize = 8 * 1024;
    let mut buf = vec![0u8; CHUNK];

    tmp.seek(SeekFrom::Start(STORE_OFFSET))?;
    for &i in &order {
      let key = self.keys[i];
      let mut remaining = key.size as usize;
      self.file.seek(SeekFrom::Start(STORE_OFFSET + key.offset as u64))?;
      while remaining > 0 {
        let take = remaining.min(CHUNK);
        self.file.read_exact(&mut buf[..take])?;
        tmp.write_all(&buf[..take])?;
        remaining -= take;
      }
      new_keys[i].offset = cursor;
      cursor += key.size;
    }

    let zero_chunk = vec![0u8; CHUNK];
    let mut remaining = EXPAND_BYTES as usize;
    while remaining > 0 {
      let take = remaining.min(CHUNK);
      tmp.write_all(&zero_chunk[..take])?;
      remaining -= take;
    }
    let new_data_len = cursor as u64 + EXPAND_BYTES;
    let new_frees = vec![FreeItem { offset: cursor, size: EXPAND_BYTES as u32 }];

    // Reorder new_keys back into seq-insertion order (the live slice's
    // logical order is by insertion, not by the offset sort used above).
    let mut by_seq = new_keys;
    by_seq.sort_by_key(|k| k.seq);

    write_header(&mut tmp, &FileHeader { fmt_version: FMT_VERSION, last_seq: self.last_seq, frees_used: new_frees.len() as u32, keys_used: by_seq.len() as u32 }, &by_seq, &new_frees)?;
    tmp.flush()?;
    tmp.sync_all()?;
    drop(tmp);

    // Close current before renaming it out from under the open handle.
    let _ = &self.file;
    if back_path.exists() {
      fs::remove_file(&back_path)?;
    }
    if live_path.exists() {
      fs::rename(&live_path, &back_path)?;
    }
    fs::rename(&tmp_path, &live_path)?;

    self.file = OpenOptions::new().read(true).write(true).open(&live_path)?;
    self.keys = by_seq;
    self.frees = new_frees;
    self.data_len = new_data_len;
    Ok(())
  }

  /// Last-resort recovery (§7, §9 glossary "panic-reset"): delete the
  /// live and temp files and reinitialize empty. Deliberately loses
  /// prior events — durability of the error report matters more than
  /// durability of the archive that just failed to write.
  fn panic_reset(&mut self) -> Result<(), StoreError> {
    let live_path = self.dir.join(LOG_FILE_NAME);
    let tmp_path = self.dir.join(TMP_FILE_NAME);
    let _ = fs::remove_file(&tmp_path);
    let _ = fs::remove_file(&live_path);

    let mut file = OpenOptions::new().create(true).read(true).write(true).open(&live_path)?;
    file.set_len(STORE_OFFSET + 2 * EXPAND_BYTES)?;
    let header = FileHeader::fresh();
    write_header(&mut file, &header, &[], &[])?;
    let frees = vec![FreeItem { offset: 0, size: (2 * EXPAND_BYTES) as u32 }];
    write_frees(&mut file, &frees)?;
    file.flush()?;

    self.file = file;
    self.keys.clear();
    self.frees = frees;
    self.data_len = 2 * EXPAND_BYTES;
    // Per spec.md §9(a): restart at 1, even though a live subscriber
    // may hold a watermark from before the reset. The desync is
    // surfaced by the live-tail protocol (§4.E), not repaired here.
    self.last_seq = 1;
    self.last_flushed_seq = 1;
    Ok(())
  }

  fn flush_header_and_indices(&mut self) -> Result<(), StoreError> {
    let header = FileHeader {
      fmt_version: FMT_VERSION,
      last_seq: self.last_seq,
      frees_used: self.frees.len() as u32,
      keys_used: self.keys.len() as u32,
    };
    write_header(&mut self.file, &header, &self.keys, &self.frees)?;
    self.file.flush()?;
    Ok(())
  }

  /// Builds a fresh index over the live key list, sorted by
  /// `(logged_at, seq)`, without reordering the key list itself
  /// (§4.D.2's "sorted view").
  fn sorted_view(&self) -> Vec<usize> {
    let mut v: Vec<usize> = (0..self.keys.len()).collect();
    v.sort_by_key(|&i| (self.keys[i].logged_at, self.keys[i].seq));
    v
  }

  /// Reads and deserializes the event at key index `idx`; substitutes
  /// a synthetic placeholder event on any I/O or framing failure
  /// rather than aborting the whole query (§4.D.2).
  fn read_event_or_placeholder(&self, idx: usize) -> LogEvent {
    let key = self.keys[idx];
    self
      .read_event(key)
      .unwrap_or_else(|| LogEvent::synthetic("corrupt block", key.logged_at))
  }

  fn read_event(&self, key: KeyItem) -> Option<LogEvent> {
    let mut file = self.file.try_clone().ok()?;
    file.seek(SeekFrom::Start(STORE_OFFSET + key.offset as u64)).ok()?;
    let mut buf = vec![0u8; key.size as usize];
    file.read_exact(&mut buf).ok()?;
    LogEvent::from_framed_bytes(&buf)
  }
}

fn write_header(
  file: &mut File,
  header: &FileHeader,
  keys: &[KeyItem],
  frees: &[FreeItem],
) -> Result<(), StoreError> {
  let mut buf = [0u8; FileHeader::ON_DISK_SIZE];
  header.write_to(&mut buf);
  file.seek(SeekFrom::Start(0))?;
  file.write_all(&buf)?;
  write_keys(file, keys)?;
  file.write_all(&SENTINEL.to_le_bytes())?;
  write_frees(file, frees)?;
  Ok(())
}

fn write_keys(file: &mut File, keys: &[KeyItem]) -> std::io::Result<()> {
  file.seek(SeekFrom::Start(FileHeader::ON_DISK_SIZE as u64))?;
  for k in keys {
    // Bytes 17..20 are the padding named in §6's packing; left zeroed.
    let mut rec = [0u8; 28];
    rec[0..4].copy_from_slice(&k.offset.to_le_bytes());
    rec[4..8].copy_from_slice(&k.size.to_le_bytes());
    rec[8..16].copy_from_slice(&k.logged_at.to_le_bytes());
    rec[16] = k.sev;
    rec[20..24].copy_from_slice(&(k.err_class as u32).to_le_bytes());
    rec[24..28].copy_from_slice(&k.seq.to_le_bytes());
    file.write_all(&rec)?;
  }
  Ok(())
}

fn read_keys(file: &mut File, count: u32) -> Result<Vec<KeyItem>, StoreError> {
  file.seek(SeekFrom::Start(FileHeader::ON_DISK_SIZE as u64))?;
  let mut out = Vec::with_capacity(count as usize);
  let mut rec = [0u8; 28];
  for _ in 0..count {
    file.read_exact(&mut rec)?;
    out.push(KeyItem {
      offset: u32::from_le_bytes(rec[0..4].try_into().unwrap()),
      size: u32::from_le_bytes(rec[4..8].try_into().unwrap()),
      logged_at: u64::from_le_bytes(rec[8..16].try_into().unwrap()),
      sev: rec[16],
      err_class: u32::from_le_bytes(rec[20..24].try_into().unwrap()) as u8,
      seq: u32::from_le_bytes(rec[24..28].try_into().unwrap()),
    });
  }
  Ok(out)
}

fn verify_sentinel(file: &mut File) -> Result<(), StoreError> {
  file.seek(SeekFrom::Start(FileHeader::ON_DISK_SIZE as u64 + MAX_KEYS as u64 * 28))?;
  let mut buf = [0u8; 4];
  file.read_exact(&mut buf)?;
  if u32::from_le_bytes(buf) != SENTINEL {
    return Err(StoreError::Corruption("layout sentinel mismatch".into()));
  }
  Ok(())
}

fn write_frees(file: &mut File, frees: &[FreeItem]) -> std::io::Result<()> {
  let frees_start = FileHeader::ON_DISK_SIZE as u64 + MAX_KEYS as u64 * 28 + 4;
  file.seek(SeekFrom::Start(frees_start))?;
  for f in frees {
    let mut rec = [0u8; 8];
    rec[0..4].copy_from_slice(&f.offset.to_le_bytes());
    rec[4..8].copy_from_slice(&f.size.to_le_bytes());
    file.write_all(&rec)?;
  }
  Ok(())
}

fn read_frees(file: &mut File, count: u32) -> Result<Vec<FreeItem>, StoreError> {
  let frees_start = FileHeader::ON_DISK_SIZE as u64 + MAX_KEYS as u64 * 28 + 4;
  file.seek(SeekFrom::Start(frees_start))?;
  let mut out = Vec::with_capacity(count as usize);
  let mut rec = [0u8; 8];
  for _ in 0..count {
    file.read_exact(&mut rec)?;
    out.push(FreeItem {
      offset: u32::from_le_bytes(rec[0..4].try_into().unwrap()),
      size: u32::from_le_bytes(rec[4..8].try_into().unwrap()),
    });
  }
  Ok(out)
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::event::{ErrClass, Severity};
  use tempfile::tempdir;

  fn sample(logged_at: u64, msg: &str) -> LogEvent {
    LogEvent {
      logged_at,
      host: "h".into(),
      process: "p".into(),
      facility: "f".into(),
      thread: "t".into(),
      file: "main.rs".into(),
      message: msg.into(),
      aux_text: String::new(),
      line: 1,
      severity: Severity::Info,
      err_class: ErrClass::Format,
      error_code: 0,
      kernel_error_code: 0,
      host_error_code: 0,
    }
  }

  #[test]
  fn fresh_store_write_and_read_back() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.log_one(sample(1000, "a")).unwrap();
    let got = store.query_by_count(10);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].message, "a");
    assert_eq!(got[0].host, "h");
  }

  #[test]
  fn query_by_count_clamps_to_keys_used() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    for i in 0..5 {
      store.log_one(sample(1000 + i, &format!("e{i}"))).unwrap();
    }
    let got = store.query_by_count(100);
    assert_eq!(got.len(), 5);
    assert_eq!(got[0].message, "e0");
    assert_eq!(got[4].message, "e4");
  }

  #[test]
  fn oversize_event_is_dropped_not_errored() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let mut ev = sample(1000, "big");
    ev.message = "x".repeat(4096);
    store.log_one(ev).unwrap();
    assert_eq!(store.query_by_count(10).len(), 0);
    assert_eq!(store.oversize_dropped(), 1);
  }

  #[test]
  fn remove_all_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.log_one(sample(1000, "a")).unwrap();
    store.remove_all().unwrap();
    store.remove_all().unwrap();
    assert_eq!(store.query_by_count(10).len(), 0);
  }

  #[test]
  fn query_filtered_wildcard_skips_regex() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.log_one(sample(1000, "a")).unwrap();
    let got = store.query_filtered(10, "*", "*", "*", "*", 0, 0).unwrap();
    assert_eq!(got.len(), 1);
  }

  #[test]
  fn query_filtered_bad_regex_is_an_error() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let err = store.query_filtered(10, "(", "*", "*", "*", 0, 0);
    assert!(err.is_err());
  }

  #[test]
  fn reopen_after_close_preserves_events() {
    let dir = tempdir().unwrap();
    {
      let store = Store::open(dir.path()).unwrap();
      store.log_one(sample(1000, "a")).unwrap();
      store.shutdown().unwrap();
    }
    let store = Store::open(dir.path()).unwrap();
    let got = store.query_by_count(10);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].message, "a");
  }
}
