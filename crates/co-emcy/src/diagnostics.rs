//! Pull-based diagnostics from the error register and the error history log.
//!
//! Only a failed read of the error register fails a report. Trouble inside
//! the history log is degraded into sentinel items so the caller always gets
//! a best-effort picture:
//! - a slot missing from the dictionary becomes `NOT_IN_DICT` and the walk
//!   moves on;
//! - any other failed read (timeout, abort) becomes `LIST_UNDERFLOW` and the
//!   walk stops there.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use co_canbus::types::MAX_SUBINDEX;
use co_canbus::{DictError, EntryKey, ObjectDictionary};
use co_protocol::{LayerReport, Severity};
use serde::Serialize;

use crate::classify::classify;
use crate::codec::{HistoryEntry, decode_history_entry};
use crate::config::EmcyConfig;
use crate::error::{EmcyError, EmcyResult};
use crate::health::PROFILE_SPECIFIC_MASK;

/// Error register bit 0: at least one error is active.
pub const GENERIC_ERROR_BIT: u8 = 0x01;

pub const NOT_IN_DICT: &str = "NOT_IN_DICT";
pub const LIST_UNDERFLOW: &str = "LIST_UNDERFLOW";

/// One position of the history walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryItem {
    Entry {
        position: u8,
        error_code: u16,
        additional_info: u16,
    },
    NotInDict {
        position: u8,
    },
    ListUnderflow {
        position: u8,
    },
}

impl HistoryItem {
    fn entry(position: u8, entry: HistoryEntry) -> Self {
        Self::Entry {
            position,
            error_code: entry.error_code,
            additional_info: entry.additional_info,
        }
    }
}

impl std::fmt::Display for HistoryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry {
                error_code,
                additional_info,
                ..
            } => write!(f, "{}#{additional_info:x}", classify(*error_code)),
            Self::NotInDict { .. } => f.write_str(NOT_IN_DICT),
            Self::ListUnderflow { .. } => f.write_str(LIST_UNDERFLOW),
        }
    }
}

/// Severity implied by an error register value.
pub fn register_severity(register: u8) -> Severity {
    if register & GENERIC_ERROR_BIT != 0 {
        Severity::Error
    } else if register & !PROFILE_SPECIFIC_MASK != 0 {
        Severity::Warn
    } else {
        Severity::Ok
    }
}

/// Result of one diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub severity: Severity,
    pub error_register: u8,
    /// Empty when severity is ok or the device keeps no history.
    pub history: Vec<HistoryItem>,
    pub generated_at: DateTime<Utc>,
}

impl DiagnosticReport {
    /// History rendered as a comma-separated list.
    pub fn history_text(&self) -> String {
        self.history
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Copy severity and fields into the orchestrator's report. Nothing is
    /// added for a healthy register.
    pub fn merge_into(&self, report: &mut LayerReport) {
        match self.severity {
            Severity::Ok => return,
            Severity::Warn => report.warn("Error register is not zero"),
            Severity::Error => report.error("Node has emergency error"),
        }
        report.add("error_register", self.error_register);
        report.add("errors", self.history_text());
    }
}

/// Reads the error register and history log from the remote dictionary.
pub struct DiagnosticsReporter {
    dictionary: Arc<dyn ObjectDictionary>,
    config: EmcyConfig,
    /// History length entry, if the device declares one.
    history_length: Option<EntryKey>,
}

impl DiagnosticsReporter {
    pub fn new(dictionary: Arc<dyn ObjectDictionary>, config: EmcyConfig) -> Self {
        let key = config.history_length();
        let history_length = dictionary.has_entry(key).then_some(key);
        if history_length.is_none() {
            tracing::debug!(entry = %key, "device keeps no error history");
        }
        Self {
            dictionary,
            config,
            history_length,
        }
    }

    pub fn has_history(&self) -> bool {
        self.history_length.is_some()
    }

    pub async fn read_register(&self) -> EmcyResult<u8> {
        let raw = self
            .dictionary
            .read(self.config.error_register())
            .await
            .map_err(EmcyError::RegisterUnreadable)?;
        Ok((raw & 0xFF) as u8)
    }

    pub async fn build_report(&self) -> EmcyResult<DiagnosticReport> {
        let error_register = self.read_register().await?;
        let severity = register_severity(error_register);

        let history = if severity == Severity::Ok {
            Vec::new()
        } else {
            let len = self.history_len().await;
            self.walk_history(len).await
        };

        Ok(DiagnosticReport {
            severity,
            error_register,
            history,
            generated_at: Utc::now(),
        })
    }

    /// Number of logged errors; 0 when the entry is absent, unreadable or out
    /// of range.
    async fn history_len(&self) -> u8 {
        let Some(key) = self.history_length else {
            return 0;
        };
        match self.dictionary.read(key).await {
            Ok(len) if len <= u32::from(MAX_SUBINDEX) => len as u8,
            Ok(len) => {
                tracing::warn!(entry = %key, len, "error history length out of range");
                0
            }
            Err(e) => {
                tracing::warn!(entry = %key, error = %e, "error history length unreadable");
                0
            }
        }
    }

    async fn walk_history(&self, len: u8) -> Vec<HistoryItem> {
        let mut items = Vec::with_capacity(usize::from(len));
        for position in 1..=len {
            let key = self.config.history_entry(position);
            match self.dictionary.read(key).await {
                Ok(raw) => items.push(HistoryItem::entry(position, decode_history_entry(raw))),
                Err(DictError::NotFound { .. }) => items.push(HistoryItem::NotInDict { position }),
                Err(e) => {
                    tracing::warn!(entry = %key, error = %e, "error history walk stopped");
                    items.push(HistoryItem::ListUnderflow { position });
                    break;
                }
            }
        }
        items
    }

    /// Clear the device's error history by writing 0 to its length.
    /// Returns `Ok(false)` when the device keeps no history.
    pub async fn clear_history(&self) -> Result<bool, DictError> {
        let Some(key) = self.history_length else {
            return Ok(false);
        };
        self.dictionary.write(key, 0).await?;
        Ok(true)
    }
}
