//! Device lifecycle hooks.
//!
//! An orchestrator owns a chain of layers and drives each of them through the
//! same hook sequence: `init` once, then `read`/`write` every cycle while the
//! device is `Ready`, `diag` on demand, and `recover`/`halt`/`shutdown` on the
//! corresponding transitions. Hooks never return errors; every outcome is
//! recorded in the status or report sink passed in by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::status::{LayerReport, LayerStatus};

/// Externally observed device state, owned by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerState {
    Init,
    Ready,
    Halted,
    Recovering,
    Shutdown,
}

impl std::fmt::Display for LayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Ready => write!(f, "ready"),
            Self::Halted => write!(f, "halted"),
            Self::Recovering => write!(f, "recovering"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Lifecycle hooks invoked by the orchestrator, one call at a time.
#[async_trait]
pub trait Layer: Send + Sync {
    /// Layer name, used in logs.
    fn name(&self) -> &str;

    /// Called once before the device becomes `Ready`.
    async fn init(&self, status: &mut LayerStatus);

    /// Called every cycle to pull state from the device.
    async fn read(&self, status: &mut LayerStatus, current_state: LayerState);

    /// Called every cycle to push state to the device.
    async fn write(&self, status: &mut LayerStatus, current_state: LayerState);

    /// Populate a diagnostic report.
    async fn diag(&self, report: &mut LayerReport);

    /// Called after a failure to bring the layer back.
    async fn recover(&self, status: &mut LayerStatus);

    async fn halt(&self, status: &mut LayerStatus);

    async fn shutdown(&self, status: &mut LayerStatus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Severity;

    struct AlwaysWarn;

    #[async_trait]
    impl Layer for AlwaysWarn {
        fn name(&self) -> &str {
            "always_warn"
        }

        async fn init(&self, status: &mut LayerStatus) {
            status.warn("init");
        }

        async fn read(&self, status: &mut LayerStatus, current_state: LayerState) {
            status.warn(format!("read in {current_state}"));
        }

        async fn write(&self, _status: &mut LayerStatus, _current_state: LayerState) {}

        async fn diag(&self, report: &mut LayerReport) {
            report.warn("diag");
        }

        async fn recover(&self, status: &mut LayerStatus) {
            self.init(status).await;
        }

        async fn halt(&self, _status: &mut LayerStatus) {}

        async fn shutdown(&self, _status: &mut LayerStatus) {}
    }

    #[tokio::test]
    async fn hooks_are_object_safe() {
        let layer: Box<dyn Layer> = Box::new(AlwaysWarn);
        let mut status = LayerStatus::new();
        layer.read(&mut status, LayerState::Ready).await;
        assert_eq!(status.severity(), Severity::Warn);
        assert_eq!(status.reasons(), ["read in ready"]);
        assert_eq!(layer.name(), "always_warn");
    }

    #[test]
    fn state_serialization() {
        assert_eq!(
            serde_json::to_string(&LayerState::Recovering).unwrap(),
            r#""recovering""#
        );
    }
}
