//! Reporter log state: the structured events the CLI reporter has emitted
//! during this build.
//!
//! The reporter renders to the terminal elsewhere; the store keeps the
//! event ledger so the develop server can replay activity to clients and
//! the engine can decide whether a build ended with errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a reporter event, ordered from least to most severe.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// One structured reporter event.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::diagnostics::{LogEvent, LogSeverity};
/// use serde_json::json;
///
/// let event = LogEvent::error("query-running", "query failed for /blog/")
///     .with_details(json!({"componentPath": "/src/templates/post.js"}));
///
/// assert_eq!(event.severity, LogSeverity::Error);
/// assert_eq!(event.scope, "query-running");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEvent {
    #[serde(default = "Utc::now")]
    pub when: DateTime<Utc>,
    #[serde(default)]
    pub severity: LogSeverity,
    /// Build phase the event belongs to (`sourcing`, `query-running`, ...).
    pub scope: String,
    pub message: String,
    /// Structured payload for machine consumers.
    #[serde(default)]
    pub details: Value,
}

impl LogEvent {
    pub fn new(
        severity: LogSeverity,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            when: Utc::now(),
            severity,
            scope: scope.into(),
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn debug(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Debug, scope, message)
    }

    pub fn info(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Info, scope, message)
    }

    pub fn warn(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Warn, scope, message)
    }

    pub fn error(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Error, scope, message)
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Append-only ledger of reporter events with per-severity counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticLedger {
    #[serde(default)]
    pub events: Vec<LogEvent>,
    #[serde(default)]
    warnings: u64,
    #[serde(default)]
    errors: u64,
}

impl DiagnosticLedger {
    /// Appends an event, updating the severity counters.
    pub fn record(&mut self, event: LogEvent) {
        match event.severity {
            LogSeverity::Warn => self.warnings += 1,
            LogSeverity::Error => self.errors += 1,
            LogSeverity::Debug | LogSeverity::Info => {}
        }
        self.events.push(event);
    }

    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.errors
    }

    #[must_use]
    pub fn warning_count(&self) -> u64 {
        self.warnings
    }

    /// Returns `true` when at least one error-severity event was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_severity() {
        let mut ledger = DiagnosticLedger::default();
        ledger.record(LogEvent::info("sourcing", "sourced 120 nodes"));
        ledger.record(LogEvent::warn("sourcing", "slow source plugin"));
        ledger.record(LogEvent::error("query-running", "query failed"));

        assert_eq!(ledger.events.len(), 3);
        assert_eq!(ledger.warning_count(), 1);
        assert!(ledger.has_errors());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(LogSeverity::Error > LogSeverity::Warn);
        assert!(LogSeverity::Warn > LogSeverity::Info);
    }
}
