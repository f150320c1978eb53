//! Core CAN bus types and CANopen communication-profile indices.

// ── Communication profile entries ───────────────────────────────

/// Error register (UNSIGNED8, mandatory).
pub const ERROR_REGISTER_INDEX: u16 = 0x1001;

/// Pre-defined error field: subindex 0 holds the number of logged errors,
/// subindices 1..N hold the log, newest first.
pub const ERROR_HISTORY_INDEX: u16 = 0x1003;

/// COB-ID of the emergency object (UNSIGNED32).
pub const EMCY_COB_ID_INDEX: u16 = 0x1014;

/// Highest subindex an entry can carry.
pub const MAX_SUBINDEX: u8 = 0xFE;

// ── CAN Frame ───────────────────────────────────────────────────

/// A raw CAN frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// Arbitration ID (11-bit standard or 29-bit extended).
    pub id: u32,
    /// Whether `id` uses the 29-bit extended format.
    pub extended: bool,
    /// Data payload (0–8 bytes for classic CAN).
    pub data: Vec<u8>,
}

impl CanFrame {
    pub fn new(id: u32, data: Vec<u8>) -> Self {
        Self {
            id,
            extended: false,
            data,
        }
    }

    pub fn new_extended(id: u32, data: Vec<u8>) -> Self {
        Self {
            id,
            extended: true,
            data,
        }
    }
}

/// Identifier filter for a bus subscription. Data frames only: remote and
/// error frames never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameFilter {
    pub id: u32,
    pub extended: bool,
}

impl FrameFilter {
    pub fn matches(&self, frame: &CanFrame) -> bool {
        frame.id == self.id && frame.extended == self.extended
    }
}

impl std::fmt::Display for FrameFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.extended {
            write!(f, "0x{:08X}x", self.id)
        } else {
            write!(f, "0x{:03X}", self.id)
        }
    }
}

// ── Dictionary addressing ───────────────────────────────────────

/// Address of an object dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub index: u16,
    pub subindex: u8,
}

impl EntryKey {
    pub const fn new(index: u16, subindex: u8) -> Self {
        Self { index, subindex }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}:{}", self.index, self.subindex)
    }
}
