//! CAN bus and object dictionary error types.

use thiserror::Error;

/// Errors raised by the bus collaborator.
#[derive(Debug, Error)]
pub enum CanError {
    #[error("CAN interface error: {0}")]
    Interface(String),

    #[error("subscription rejected for 0x{id:X}: {reason}")]
    Subscribe { id: u32, reason: String },
}

/// Convenience alias for CAN bus results.
pub type CanResult<T> = Result<T, CanError>;

/// Errors raised by the object dictionary collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    #[error("entry 0x{index:04X}:{subindex} is not in the dictionary")]
    NotFound { index: u16, subindex: u8 },

    #[error("dictionary round-trip timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("transfer aborted with code 0x{code:08X}")]
    Aborted { code: u32 },

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for dictionary results.
pub type DictResult<T> = Result<T, DictError>;
