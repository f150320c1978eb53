//! Shared test harness for E2E lifecycle tests.
//!
//! Wires a real `EmcyHandler` to a `MockCanInterface` and a
//! `MockObjectDictionary`, then drives it through the `Layer` hooks the way
//! an orchestrator would.

#![allow(dead_code)]

use std::sync::Arc;

use co_canbus::{CanFrame, MockCanInterface, MockEntry, MockObjectDictionary};
use co_emcy::{EmcyConfig, EmcyHandler, EmergencyRecord};
use co_protocol::{Layer, LayerReport, LayerState, LayerStatus};
use tracing_subscriber::EnvFilter;

/// EMCY COB-ID of the simulated device (0x80 + node 1).
pub const EMCY_ID: u32 = 0x81;

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Dictionary of a device with an EMCY producer and an empty error history.
pub fn healthy_dictionary() -> MockObjectDictionary {
    MockObjectDictionary::new()
        .with_value(0x1001, 0, 0x00)
        .with_value(0x1003, 0, 0)
        .with_value(0x1014, 0, EMCY_ID)
}

/// A simulated device plus the handler under test.
pub struct TestDevice {
    pub bus: MockCanInterface,
    pub dict: Arc<MockObjectDictionary>,
    pub handler: EmcyHandler,
}

impl TestDevice {
    pub async fn new(dict: MockObjectDictionary) -> Self {
        Self::with_config(dict, EmcyConfig::default()).await
    }

    pub async fn with_config(dict: MockObjectDictionary, config: EmcyConfig) -> Self {
        init_tracing();
        let bus = MockCanInterface::new();
        let dict = Arc::new(dict);
        let handler = EmcyHandler::new(&bus, dict.clone(), config)
            .await
            .expect("handler construction");
        Self { bus, dict, handler }
    }

    pub async fn healthy() -> Self {
        Self::new(healthy_dictionary()).await
    }

    /// Set the device's error register.
    pub fn set_register(&self, register: u8) {
        self.dict.set(0x1001, 0, MockEntry::Value(u32::from(register)));
    }

    /// Replace the error history log. Slot N of `slots` becomes subindex N+1.
    pub fn set_history(&self, slots: &[Option<MockEntry>]) {
        self.dict.set(0x1003, 0, MockEntry::Value(slots.len() as u32));
        for (i, slot) in slots.iter().enumerate() {
            let subindex = (i + 1) as u8;
            match slot {
                Some(entry) => self.dict.set(0x1003, subindex, *entry),
                None => self.dict.remove(0x1003, subindex),
            }
        }
    }

    /// Put an EMCY frame on the bus and let the listener process it.
    pub async fn emcy(&self, error_code: u16, error_register: u8) {
        let record = EmergencyRecord {
            error_code,
            error_register,
            manufacturer_bytes: [0; 5],
        };
        self.bus
            .inject(CanFrame::new(EMCY_ID, record.to_bytes().to_vec()));
        settle().await;
    }

    pub async fn init(&self) -> LayerStatus {
        let mut status = LayerStatus::new();
        self.handler.init(&mut status).await;
        status
    }

    pub async fn recover(&self) -> LayerStatus {
        let mut status = LayerStatus::new();
        self.handler.recover(&mut status).await;
        status
    }

    pub async fn read(&self, state: LayerState) -> LayerStatus {
        let mut status = LayerStatus::new();
        self.handler.read(&mut status, state).await;
        status
    }

    pub async fn diag(&self) -> LayerReport {
        let mut report = LayerReport::new();
        self.handler.diag(&mut report).await;
        report
    }
}

/// Yield until spawned listener tasks have drained their channels.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
