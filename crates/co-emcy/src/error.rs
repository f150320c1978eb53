//! EMCY layer error types.

use co_canbus::DictError;
use thiserror::Error;

/// Errors that escape an EMCY operation.
///
/// Per-entry history faults are not errors: they are folded into the report
/// as `HistoryItem` sentinels.
#[derive(Debug, Error)]
pub enum EmcyError {
    #[error("emergency frame must be 8 bytes, got {len}")]
    MalformedFrame { len: usize },

    #[error("Could not read error register: {0}")]
    RegisterUnreadable(#[source] DictError),

    #[error("Node has emergency error (register 0x{register:02X})")]
    FaultPresent { register: u8 },
}

/// Convenience alias for EMCY results.
pub type EmcyResult<T> = Result<T, EmcyError>;
