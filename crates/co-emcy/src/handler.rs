//! EMCY lifecycle layer.
//!
//! Construction resolves the dictionary entries once: the error register is
//! mandatory, the history length and the EMCY COB-ID are optional and simply
//! disable their feature when absent. A valid COB-ID starts a listener task
//! that feeds the health monitor for as long as the handler lives.
//!
//! Init and recover clear the fault flag unconditionally once the register
//! reads clean. An EMCY frame that lands between the register read and that
//! reset is overwritten, and since a device sends EMCY once per fault, the
//! flag stays clear until the device sends another frame.

use std::sync::Arc;

use async_trait::async_trait;
use co_canbus::{CanInterface, DictError, FrameFilter, FrameSubscription, ObjectDictionary};
use co_protocol::{Layer, LayerReport, LayerState, LayerStatus};
use tokio::task::JoinHandle;

use crate::classify::classify;
use crate::codec::{decode_arbitration_id, decode_emergency_record};
use crate::config::EmcyConfig;
use crate::diagnostics::{DiagnosticsReporter, GENERIC_ERROR_BIT};
use crate::error::{EmcyError, EmcyResult};
use crate::health::HealthMonitor;

/// Bus subscription plus the task draining it. Aborting the task drops the
/// subscription, which releases it on the bus.
struct EmcyListener {
    filter: FrameFilter,
    task: JoinHandle<()>,
}

impl Drop for EmcyListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct EmcyHandler {
    health: Arc<HealthMonitor>,
    reporter: DiagnosticsReporter,
    config: EmcyConfig,
    listener: Option<EmcyListener>,
}

impl EmcyHandler {
    /// Fails only when the device does not declare the error register.
    pub async fn new(
        bus: &dyn CanInterface,
        dictionary: Arc<dyn ObjectDictionary>,
        config: EmcyConfig,
    ) -> EmcyResult<Self> {
        let register = config.error_register();
        if !dictionary.has_entry(register) {
            return Err(EmcyError::RegisterUnreadable(DictError::NotFound {
                index: register.index,
                subindex: register.subindex,
            }));
        }

        let health = Arc::new(HealthMonitor::new());
        let listener = listen(bus, dictionary.as_ref(), &config, &health).await;
        let reporter = DiagnosticsReporter::new(dictionary, config.clone());

        Ok(Self {
            health,
            reporter,
            config,
            listener,
        })
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn reporter(&self) -> &DiagnosticsReporter {
        &self.reporter
    }

    /// Identifier the handler listens on, if EMCY is enabled for the device.
    pub fn emcy_filter(&self) -> Option<FrameFilter> {
        self.listener.as_ref().map(|l| l.filter)
    }

    async fn check_register(&self) -> EmcyResult<()> {
        let register = self.reporter.read_register().await?;
        if register & GENERIC_ERROR_BIT != 0 {
            let last = self.health.last_error_code().map(classify);
            tracing::warn!(
                register = format_args!("{register:#04x}"),
                last_emcy = last.as_deref().unwrap_or("none"),
                "device reports active error"
            );
            return Err(EmcyError::FaultPresent { register });
        }
        Ok(())
    }

    async fn reset_errors(&self, status: &mut LayerStatus) {
        if self.config.clear_history_on_reset
            && let Err(e) = self.reporter.clear_history().await
        {
            tracing::warn!(error = %e, "could not clear error history");
            status.warn(format!("Could not clear error history: {e}"));
        }
        self.health.reset();
    }
}

async fn listen(
    bus: &dyn CanInterface,
    dictionary: &dyn ObjectDictionary,
    config: &EmcyConfig,
    health: &Arc<HealthMonitor>,
) -> Option<EmcyListener> {
    let key = config.emcy_id();
    if !dictionary.has_entry(key) {
        tracing::debug!(entry = %key, "no EMCY COB-ID, emergency listener disabled");
        return None;
    }

    let raw = match dictionary.read(key).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(entry = %key, error = %e, "EMCY COB-ID unreadable, emergency listener disabled");
            return None;
        }
    };

    let Some(filter) = decode_arbitration_id(raw).filter() else {
        tracing::debug!(cob_id = format_args!("{raw:#010x}"), "EMCY COB-ID marked invalid");
        return None;
    };

    let subscription = match bus.subscribe(filter).await {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(%filter, error = %e, "EMCY subscription failed, emergency listener disabled");
            return None;
        }
    };

    tracing::info!(%filter, "EMCY listener started");
    let task = tokio::spawn(run_listener(subscription, Arc::clone(health)));
    Some(EmcyListener { filter, task })
}

async fn run_listener(mut subscription: FrameSubscription, health: Arc<HealthMonitor>) {
    while let Some(frame) = subscription.recv().await {
        match decode_emergency_record(&frame.data) {
            Ok(record) => {
                tracing::info!(
                    code = %classify(record.error_code),
                    register = format_args!("{:#04x}", record.error_register),
                    manufacturer = ?record.manufacturer_bytes,
                    "EMCY received"
                );
                health.on_emergency_frame(&record);
            }
            Err(e) => {
                tracing::warn!(id = frame.id, error = %e, "dropping malformed EMCY frame");
            }
        }
    }
    tracing::debug!(filter = %subscription.filter(), "EMCY subscription closed");
}

#[async_trait]
impl Layer for EmcyHandler {
    fn name(&self) -> &str {
        "EMCY handler"
    }

    async fn init(&self, status: &mut LayerStatus) {
        match self.check_register().await {
            Ok(()) => self.reset_errors(status).await,
            Err(e) => status.error(e.to_string()),
        }
    }

    async fn read(&self, status: &mut LayerStatus, current_state: LayerState) {
        if current_state == LayerState::Ready && self.health.query() {
            status.error("Node has unacknowledged emergency error");
        }
    }

    async fn write(&self, _status: &mut LayerStatus, _current_state: LayerState) {}

    async fn diag(&self, report: &mut LayerReport) {
        match self.reporter.build_report().await {
            Ok(diagnosis) => diagnosis.merge_into(report),
            Err(e) => report.error(e.to_string()),
        }
    }

    async fn recover(&self, status: &mut LayerStatus) {
        self.init(status).await;
    }

    async fn halt(&self, _status: &mut LayerStatus) {}

    async fn shutdown(&self, _status: &mut LayerStatus) {}
}
