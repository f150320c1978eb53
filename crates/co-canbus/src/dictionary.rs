//! Remote object dictionary abstraction.
//!
//! The dictionary collaborator owns entry caching, the SDO round-trip and its
//! timeout policy. Layers only see raw unsigned values; entries narrower than
//! 32 bits are zero-extended.

use async_trait::async_trait;

use crate::error::DictResult;
use crate::types::EntryKey;

#[async_trait]
pub trait ObjectDictionary: Send + Sync {
    /// Whether the device description declares `key`. Answered locally,
    /// without touching the bus.
    fn has_entry(&self, key: EntryKey) -> bool;

    /// Read an entry from the device. Resolves once the round-trip completes
    /// or the collaborator's timeout expires.
    async fn read(&self, key: EntryKey) -> DictResult<u32>;

    /// Write an entry on the device.
    async fn write(&self, key: EntryKey, value: u32) -> DictResult<()>;
}
