use serde::{Deserialize, Serialize};

/// Outcome severity of a lifecycle call. Ordered so that the worst one wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing to report.
    #[default]
    Ok,
    /// Degraded, the device keeps running.
    Warn,
    /// The layer cannot fulfil the call.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Status sink handed to every lifecycle hook.
///
/// Severity only ever escalates: a `warn` after an `error` keeps the status at
/// `error`, but both reasons are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStatus {
    severity: Severity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    reasons: Vec<String>,
}

impl LayerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, reason: impl Into<String>) {
        self.bump(Severity::Warn, reason.into());
    }

    pub fn error(&mut self, reason: impl Into<String>) {
        self.bump(Severity::Error, reason.into());
    }

    fn bump(&mut self, severity: Severity, reason: String) {
        self.severity = self.severity.max(severity);
        self.reasons.push(reason);
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Reasons in the order they were recorded.
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}

/// Diagnostic report: a status plus named key/value fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    #[serde(flatten)]
    status: LayerStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<(String, String)>,
}

impl LayerReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, reason: impl Into<String>) {
        self.status.warn(reason);
    }

    pub fn error(&mut self, reason: impl Into<String>) {
        self.status.error(reason);
    }

    /// Attach a named field. Later fields with the same key are kept as well.
    pub fn add(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.push((key.into(), value.to_string()));
    }

    pub fn status(&self) -> &LayerStatus {
        &self.status
    }

    pub fn severity(&self) -> Severity {
        self.status.severity()
    }

    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    /// First value recorded under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
