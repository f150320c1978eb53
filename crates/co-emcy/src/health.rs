//! Live device health flag, fed by EMCY frames.
//!
//! Written from the bus listener task, read from the orchestrator's task.
//! Release/acquire ordering makes the latest EMCY visible to the next
//! lifecycle call.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::codec::EmergencyRecord;

/// Error register bit reserved for device-profile use. It alone is not a fault.
pub const PROFILE_SPECIFIC_MASK: u8 = 0x20;

const CODE_PRESENT: u32 = 1 << 16;

#[derive(Debug)]
pub struct HealthMonitor {
    has_fault: AtomicBool,
    /// Last EMCY error code, tagged with `CODE_PRESENT`; 0 before the first frame.
    last_code: AtomicU32,
}

impl HealthMonitor {
    /// Starts with a fault assumed present until init or recover clears it.
    pub fn new() -> Self {
        Self {
            has_fault: AtomicBool::new(true),
            last_code: AtomicU32::new(0),
        }
    }

    pub fn on_emergency_frame(&self, record: &EmergencyRecord) {
        let fault = record.error_register & !PROFILE_SPECIFIC_MASK != 0;
        self.last_code
            .store(CODE_PRESENT | u32::from(record.error_code), Ordering::Release);
        self.has_fault.store(fault, Ordering::Release);
    }

    pub fn reset(&self) {
        self.has_fault.store(false, Ordering::Release);
    }

    /// Whether the device has an unacknowledged fault.
    pub fn query(&self) -> bool {
        self.has_fault.load(Ordering::Acquire)
    }

    /// Error code of the most recent EMCY frame, if any arrived.
    pub fn last_error_code(&self) -> Option<u16> {
        let tagged = self.last_code.load(Ordering::Acquire);
        (tagged & CODE_PRESENT != 0).then_some(tagged as u16)
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}
