//! Mock bus and dictionary for testing.
//!
//! `MockCanInterface` fans injected frames out to matching subscriptions;
//! `MockObjectDictionary` serves scripted entries and records every access.
//! All tests use these instead of real hardware so the suite runs in CI on
//! any platform.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::dictionary::ObjectDictionary;
use crate::error::{CanError, CanResult, DictError, DictResult};
use crate::interface::{CanInterface, FrameSubscription};
use crate::types::{CanFrame, EntryKey, FrameFilter};

// ── Bus ─────────────────────────────────────────────────────────

/// Mock CAN interface with manual frame injection.
pub struct MockCanInterface {
    subscribers: Mutex<Vec<(FrameFilter, mpsc::UnboundedSender<CanFrame>)>>,
    /// Whether `subscribe` succeeds (default: true).
    accept_subscriptions: bool,
}

impl MockCanInterface {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            accept_subscriptions: true,
        }
    }

    /// A bus that rejects every subscription.
    pub fn rejecting() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            accept_subscriptions: false,
        }
    }

    /// Deliver a frame to every live subscription whose filter matches.
    /// Returns the number of subscriptions that received it.
    pub fn inject(&self, frame: CanFrame) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|(_, tx)| !tx.is_closed());
        subscribers
            .iter()
            .filter(|(filter, _)| filter.matches(&frame))
            .filter(|(_, tx)| tx.send(frame.clone()).is_ok())
            .count()
    }

    /// Filters of all subscriptions that are still held by a receiver.
    pub fn active_filters(&self) -> Vec<FrameFilter> {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .map(|(filter, _)| *filter)
            .collect()
    }
}

impl Default for MockCanInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CanInterface for MockCanInterface {
    async fn subscribe(&self, filter: FrameFilter) -> CanResult<FrameSubscription> {
        if !self.accept_subscriptions {
            return Err(CanError::Subscribe {
                id: filter.id,
                reason: "mock bus rejects subscriptions".into(),
            });
        }
        let (tx, subscription) = FrameSubscription::channel(filter);
        self.subscribers.lock().unwrap().push((filter, tx));
        Ok(subscription)
    }
}

// ── Dictionary ──────────────────────────────────────────────────

/// Scripted behaviour of a single mock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEntry {
    /// Declared and readable.
    Value(u32),
    /// Declared, but every round-trip times out.
    Timeout,
    /// Declared, but the device aborts every transfer with this code.
    Abort(u32),
}

/// Mock object dictionary with access recording.
pub struct MockObjectDictionary {
    entries: Mutex<BTreeMap<EntryKey, MockEntry>>,
    reads: Mutex<Vec<EntryKey>>,
    writes: Mutex<Vec<(EntryKey, u32)>>,
    timeout_ms: u64,
}

impl MockObjectDictionary {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            timeout_ms: 1000,
        }
    }

    /// Builder-style helper: declare a readable entry.
    pub fn with_value(self, index: u16, subindex: u8, value: u32) -> Self {
        self.set(index, subindex, MockEntry::Value(value));
        self
    }

    /// Builder-style helper: declare an entry whose reads time out.
    pub fn with_timeout(self, index: u16, subindex: u8) -> Self {
        self.set(index, subindex, MockEntry::Timeout);
        self
    }

    /// Declare or replace an entry.
    pub fn set(&self, index: u16, subindex: u8, entry: MockEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(EntryKey::new(index, subindex), entry);
    }

    /// Remove an entry from the device description.
    pub fn remove(&self, index: u16, subindex: u8) {
        self.entries
            .lock()
            .unwrap()
            .remove(&EntryKey::new(index, subindex));
    }

    /// Current scripted value of a readable entry.
    pub fn value(&self, index: u16, subindex: u8) -> Option<u32> {
        match self.entries.lock().unwrap().get(&EntryKey::new(index, subindex)) {
            Some(MockEntry::Value(v)) => Some(*v),
            _ => None,
        }
    }

    /// Every key passed to `read`, in call order.
    pub fn reads(&self) -> Vec<EntryKey> {
        self.reads.lock().unwrap().clone()
    }

    /// Every successful or attempted write, in call order.
    pub fn writes(&self) -> Vec<(EntryKey, u32)> {
        self.writes.lock().unwrap().clone()
    }

    /// Forget recorded reads and writes.
    pub fn clear_log(&self) {
        self.reads.lock().unwrap().clear();
        self.writes.lock().unwrap().clear();
    }

    fn lookup(&self, key: EntryKey) -> DictResult<u32> {
        match self.entries.lock().unwrap().get(&key) {
            Some(MockEntry::Value(v)) => Ok(*v),
            Some(MockEntry::Timeout) => Err(DictError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
            Some(MockEntry::Abort(code)) => Err(DictError::Aborted { code: *code }),
            None => Err(DictError::NotFound {
                index: key.index,
                subindex: key.subindex,
            }),
        }
    }
}

impl Default for MockObjectDictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectDictionary for MockObjectDictionary {
    fn has_entry(&self, key: EntryKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key)
    }

    async fn read(&self, key: EntryKey) -> DictResult<u32> {
        self.reads.lock().unwrap().push(key);
        self.lookup(key)
    }

    async fn write(&self, key: EntryKey, value: u32) -> DictResult<()> {
        self.writes.lock().unwrap().push((key, value));
        self.lookup(key)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key, MockEntry::Value(value));
        Ok(())
    }
}
