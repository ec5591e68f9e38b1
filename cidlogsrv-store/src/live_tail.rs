//! Bounded recency window of the most recently stored events, with
//! gap/resync semantics for late subscribers (§4.E). A plain `VecDeque`
//! models the "singly-linked list, owned head, no back-references"
//! shape the spec's design notes call for: push at the tail, evict at
//! the head, no node ever points back at the store.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use crate::event::LogEvent;

pub const CAPACITY: usize = 32;
const HEAD_MAX_AGE: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct LiveNode {
  pub event: LogEvent,
  pub index: u64,
  inserted_at: SystemTime,
}

pub struct LiveTail {
  nodes: VecDeque<LiveNode>,
  next_index: u64,
}

/// What `get_live_events` hands back to a subscriber, alongside the
/// watermark it should remember for its next call.
pub struct LiveEventsReply {
  pub events: Vec<LogEvent>,
  pub new_watermark: u64,
}

impl LiveTail {
  pub fn new() -> Self {
    Self { nodes: VecDeque::with_capacity(CAPACITY), next_index: 0 }
  }

  /// Inserts `event`, per §4.E's policy: append while under capacity;
  /// once full, recycle the head if it's aged out, otherwise still
  /// append (the spec guarantees an aged-out head exists in steady
  /// state once the list has reached 32 entries).
  pub fn push(&mut self, event: LogEvent) {
    let index = self.next_index;
    self.next_index += 1;
    let node = LiveNode { event, index, inserted_at: SystemTime::now() };

    if self.nodes.len() < CAPACITY {
      self.nodes.push_back(node);
      return;
    }

    let head_is_stale = self
      .nodes
      .front()
      .map(|h| h.inserted_at.elapsed().unwrap_or_default() >= HEAD_MAX_AGE)
      .unwrap_or(true);

    if head_is_stale {
      self.nodes.pop_front();
    }
    self.nodes.push_back(node);
  }

  pub fn next_index(&self) -> u64 {
    self.next_index
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    // next_index is not reset: it must keep increasing monotonically
    // even across RemoveAll, since live subscribers may still hold a
    // watermark from before the clear.
  }

  /// §4.E's subscriber protocol.
  pub fn get_live_events(&self, watermark: u64) -> LiveEventsReply {
    if self.nodes.is_empty() {
      return LiveEventsReply { events: Vec::new(), new_watermark: watermark };
    }
    if watermark == self.next_index {
      return LiveEventsReply { events: Vec::new(), new_watermark: watermark };
    }

    let head_index = self.nodes.front().unwrap().index;
    let tail_index = self.nodes.back().unwrap().index;

    if watermark < head_index {
      let mut events = vec![LogEvent::synthetic("events missed", 0)];
      events.extend(self.nodes.iter().map(|n| n.event.clone()));
      return LiveEventsReply { events, new_watermark: self.next_index };
    }

    if watermark > tail_index {
      return LiveEventsReply {
        events: vec![LogEvent::synthetic("out of sync", 0)],
        new_watermark: self.next_index,
      };
    }

    match self.nodes.iter().position(|n| n.index == watermark) {
      Some(pos) => LiveEventsReply {
        events: self.nodes.iter().skip(pos).map(|n| n.event.clone()).collect(),
        new_watermark: self.next_index,
      },
      None => LiveEventsReply {
        events: vec![LogEvent::synthetic("bad id", 0)],
        new_watermark: self.next_index,
      },
    }
  }
}

impl Default for LiveTail {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;

  fn ev(n: u64) -> LogEvent {
    LogEvent::synthetic(format!("e{n}"), n)
  }

  #[test]
  fn caps_at_32_and_indexes_strictly_increase() {
    let mut q = LiveTail::new();
    for i in 0..40 {
      q.push(ev(i));
    }
    assert!(q.nodes.len() <= CAPACITY);
    let mut last = None;
    for n in &q.nodes {
      if let Some(l) = last {
        assert!(n.index > l);
      }
      last = Some(n.index);
    }
    assert!(q.next_index() > q.nodes.back().unwrap().index);
  }

  #[test]
  fn empty_queue_returns_empty() {
    let q = LiveTail::new();
    let reply = q.get_live_events(0);
    assert!(reply.events.is_empty());
    assert_eq!(reply.new_watermark, 0);
  }

  #[test]
  fn watermark_equal_to_next_index_is_caught_up() {
    let mut q = LiveTail::new();
    q.push(ev(0));
    let reply = q.get_live_events(q.next_index());
    assert!(reply.events.is_empty());
  }

  #[test]
  fn stale_watermark_below_head_synthesizes_missed_events() {
    let mut q = LiveTail::new();
    for i in 0..5 {
      q.push(ev(i));
    }
    // Simulate eviction by clearing and repushing, leaving head at index 3.
    q.nodes.pop_front();
    q.nodes.pop_front();
    q.nodes.pop_front();
    let reply = q.get_live_events(0);
    assert_eq!(reply.events[0].message, "events missed");
    assert_eq!(reply.new_watermark, q.next_index());
  }

  #[test]
  fn desync_after_restart_yields_out_of_sync() {
    let mut q = LiveTail::new();
    for i in 0..3 {
      q.push(ev(i));
    }
    let reply = q.get_live_events(1000);
    assert_eq!(reply.events.len(), 1);
    assert_eq!(reply.events[0].message, "out of sync");
    assert_eq!(reply.new_watermark, q.next_index());
  }

  #[test]
  fn known_watermark_resumes_from_that_node() {
    let mut q = LiveTail::new();
    for i in 0..5 {
      q.push(ev(i));
    }
    let reply = q.get_live_events(2);
    assert_eq!(reply.events.len(), 3);
    assert_eq!(reply.events[0].message, "e2");
    assert_eq!(reply.new_watermark, q.next_index());
  }
}
