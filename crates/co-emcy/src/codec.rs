//! Wire codecs for the three fixed EMCY layouts:
//!
//! - EMCY COB-ID entry (0x1014), a 32-bit word:
//!   bits 0–28 identifier, bit 29 extended frame, bit 30 reserved, bit 31 invalid.
//! - EMCY payload, 8 bytes: error code (little-endian u16), error register,
//!   5 manufacturer-specific bytes.
//! - Pre-defined error field entry (0x1003:N), a 32-bit word: low 16 bits
//!   error code, high 16 bits additional information.
//!
//! Everything is explicit masking and shifting on fixed-width integers.

use co_canbus::FrameFilter;

use crate::error::{EmcyError, EmcyResult};

/// Length of an EMCY payload on the wire.
pub const EMCY_FRAME_LEN: usize = 8;

const ID_MASK: u32 = 0x1FFF_FFFF;
const EXTENDED_BIT: u32 = 1 << 29;
const INVALID_BIT: u32 = 1 << 31;

// ── Arbitration identifier ──────────────────────────────────────

/// Decoded EMCY COB-ID entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationId {
    /// Identifier the device emits EMCY frames on (29 bits).
    pub node_id: u32,
    pub extended: bool,
    /// Set when the device does not produce EMCY frames at all.
    pub invalid: bool,
}

impl ArbitrationId {
    /// Re-encode to the 32-bit entry layout. The reserved bit is always 0.
    pub fn to_raw(&self) -> u32 {
        let mut raw = self.node_id & ID_MASK;
        if self.extended {
            raw |= EXTENDED_BIT;
        }
        if self.invalid {
            raw |= INVALID_BIT;
        }
        raw
    }

    /// Bus filter for this identifier, or `None` when the entry is marked
    /// invalid and must not be subscribed to.
    pub fn filter(&self) -> Option<FrameFilter> {
        (!self.invalid).then_some(FrameFilter {
            id: self.node_id,
            extended: self.extended,
        })
    }
}

pub fn decode_arbitration_id(raw: u32) -> ArbitrationId {
    ArbitrationId {
        node_id: raw & ID_MASK,
        extended: raw & EXTENDED_BIT != 0,
        invalid: raw & INVALID_BIT != 0,
    }
}

// ── Emergency payload ───────────────────────────────────────────

/// One decoded EMCY frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyRecord {
    pub error_code: u16,
    pub error_register: u8,
    pub manufacturer_bytes: [u8; 5],
}

impl EmergencyRecord {
    pub fn to_bytes(&self) -> [u8; EMCY_FRAME_LEN] {
        let [lo, hi] = self.error_code.to_le_bytes();
        let m = self.manufacturer_bytes;
        [lo, hi, self.error_register, m[0], m[1], m[2], m[3], m[4]]
    }
}

/// Decode an EMCY payload. The layout is fixed-length, so anything other than
/// exactly 8 bytes is a transport contract violation.
pub fn decode_emergency_record(data: &[u8]) -> EmcyResult<EmergencyRecord> {
    let bytes: &[u8; EMCY_FRAME_LEN] = data
        .try_into()
        .map_err(|_| EmcyError::MalformedFrame { len: data.len() })?;

    Ok(EmergencyRecord {
        error_code: u16::from_le_bytes([bytes[0], bytes[1]]),
        error_register: bytes[2],
        manufacturer_bytes: [bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]],
    })
}

// ── Error history entry ─────────────────────────────────────────

/// One slot of the pre-defined error field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub error_code: u16,
    pub additional_info: u16,
}

pub fn decode_history_entry(raw: u32) -> HistoryEntry {
    HistoryEntry {
        error_code: (raw & 0xFFFF) as u16,
        additional_info: (raw >> 16) as u16,
    }
}

pub fn encode_history_entry(entry: HistoryEntry) -> u32 {
    (u32::from(entry.additional_info) << 16) | u32::from(entry.error_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_emcy_cob_id() {
        // 0x80 + node 5, standard frame, valid
        let id = decode_arbitration_id(0x0000_0085);
        assert_eq!(id.node_id, 0x85);
        assert!(!id.extended);
        assert!(!id.invalid);
        assert_eq!(
            id.filter(),
            Some(FrameFilter {
                id: 0x85,
                extended: false
            })
        );
    }

    #[test]
    fn extended_and_invalid_flags() {
        let id = decode_arbitration_id(0xA000_0123);
        assert_eq!(id.node_id, 0x123);
        assert!(id.extended);
        assert!(id.invalid);
        assert!(id.filter().is_none());
    }

    #[test]
    fn reserved_bit_is_ignored() {
        let id = decode_arbitration_id(0x4000_0081);
        assert_eq!(id.node_id, 0x81);
        assert!(!id.extended);
        assert!(!id.invalid);
        assert_eq!(id.to_raw(), 0x81);
    }

    #[test]
    fn emcy_payload_is_little_endian() {
        let frame = [0x10, 0x32, 0x05, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let record = decode_emergency_record(&frame).unwrap();
        assert_eq!(record.error_code, 0x3210);
        assert_eq!(record.error_register, 0x05);
        assert_eq!(record.manufacturer_bytes, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        assert_eq!(record.to_bytes(), frame);
    }

    #[test]
    fn short_and_long_frames_are_malformed() {
        for len in [0usize, 7, 9] {
            let frame = vec![0u8; len];
            let err = decode_emergency_record(&frame).unwrap_err();
            assert!(matches!(err, EmcyError::MalformedFrame { len: l } if l == len));
        }
    }

    #[test]
    fn history_entry_packing() {
        let entry = decode_history_entry(0x001F_3210);
        assert_eq!(entry.error_code, 0x3210);
        assert_eq!(entry.additional_info, 0x001F);
        assert_eq!(encode_history_entry(entry), 0x001F_3210);
    }

    proptest! {
        #[test]
        fn arbitration_id_round_trip(raw in any::<u32>()) {
            let raw = raw & !(1 << 30);
            prop_assert_eq!(decode_arbitration_id(raw).to_raw(), raw);
        }

        #[test]
        fn history_entry_round_trip(raw in any::<u32>()) {
            prop_assert_eq!(encode_history_entry(decode_history_entry(raw)), raw);
        }

        #[test]
        fn emergency_record_round_trip(frame in any::<[u8; 8]>()) {
            let record = decode_emergency_record(&frame).unwrap();
            prop_assert_eq!(record.to_bytes(), frame);
        }
    }
}
