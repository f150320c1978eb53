//! EMCY layer configuration, loadable from TOML.

use co_canbus::EntryKey;
use co_canbus::types::{EMCY_COB_ID_INDEX, ERROR_HISTORY_INDEX, ERROR_REGISTER_INDEX};
use serde::Deserialize;

/// Dictionary layout and reset policy for one device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmcyConfig {
    /// Error register entry (subindex 0, mandatory).
    pub error_register_index: u16,
    /// Pre-defined error field: length at subindex 0, log at 1..N.
    pub error_history_index: u16,
    /// EMCY COB-ID entry (subindex 0).
    pub emcy_id_index: u16,
    /// Write 0 to the history length when init/recover finds no fault.
    pub clear_history_on_reset: bool,
}

impl Default for EmcyConfig {
    fn default() -> Self {
        Self {
            error_register_index: ERROR_REGISTER_INDEX,
            error_history_index: ERROR_HISTORY_INDEX,
            emcy_id_index: EMCY_COB_ID_INDEX,
            clear_history_on_reset: true,
        }
    }
}

impl EmcyConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn error_register(&self) -> EntryKey {
        EntryKey::new(self.error_register_index, 0)
    }

    pub fn history_length(&self) -> EntryKey {
        EntryKey::new(self.error_history_index, 0)
    }

    /// History slot at `position` (1-based).
    pub fn history_entry(&self, position: u8) -> EntryKey {
        EntryKey::new(self.error_history_index, position)
    }

    pub fn emcy_id(&self) -> EntryKey {
        EntryKey::new(self.emcy_id_index, 0)
    }
}
