pub mod classify;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod health;

pub use classify::classify;
pub use codec::{ArbitrationId, EmergencyRecord, HistoryEntry};
pub use config::EmcyConfig;
pub use diagnostics::{DiagnosticReport, DiagnosticsReporter, HistoryItem};
pub use error::{EmcyError, EmcyResult};
pub use handler::EmcyHandler;
pub use health::HealthMonitor;
