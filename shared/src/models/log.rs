//! Log domain model.

use crate::models::common::{Attribute, AttributeValue, InstrumentationScope, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized severity tier of a log record.
///
/// Derived from the raw OTLP severity number with
/// [`SeverityLevel::from_number`]; the raw number and text are kept alongside
/// it on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// Severity number was zero or negative.
    #[default]
    Unspecified,
    /// Severity numbers 1-4.
    Trace,
    /// Severity numbers 5-8.
    Debug,
    /// Severity numbers 9-12.
    Info,
    /// Severity numbers 13-16.
    Warn,
    /// Severity numbers 17-20.
    Error,
    /// Severity numbers above 20.
    Fatal,
}

impl SeverityLevel {
    /// Bands a raw OTLP severity number into its tier.
    #[must_use]
    pub fn from_number(number: i32) -> Self {
        match number {
            i32::MIN..=0 => Self::Unspecified,
            1..=4 => Self::Trace,
            5..=8 => Self::Debug,
            9..=12 => Self::Info,
            13..=16 => Self::Warn,
            17..=20 => Self::Error,
            _ => Self::Fatal,
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Internal id, unique per ingested item.
    pub id: String,

    /// Record time as nanoseconds since the Unix epoch.
    pub time_unix_nano: i64,
    /// Observation time as nanoseconds since the Unix epoch.
    pub observed_time_unix_nano: i64,
    /// Wall-clock record time.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock observation time.
    pub observed_time: DateTime<Utc>,

    /// Log body; a string for most producers, but any value shape is kept.
    pub body: AttributeValue,
    /// Raw OTLP severity number.
    pub severity_number: i32,
    /// Producer-supplied severity text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub severity_text: String,
    /// Normalized severity tier.
    pub severity: SeverityLevel,

    /// Hex-encoded trace id, when the record is trace-correlated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Hex-encoded span id, when the record is trace-correlated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// W3C trace flags.
    pub trace_flags: u32,

    /// The producing entity.
    pub resource: Resource,
    /// The producing instrumentation library.
    pub instrumentation_scope: InstrumentationScope,
    /// Record attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Attributes dropped by the producer before export.
    pub dropped_attributes_count: u32,

    /// When this record was received by the collector.
    pub received_at: DateTime<Utc>,
}

impl LogRecord {
    /// Whether the record is at error severity or above.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity_number >= 17
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_banding() {
        assert_eq!(SeverityLevel::from_number(0), SeverityLevel::Unspecified);
        assert_eq!(SeverityLevel::from_number(-3), SeverityLevel::Unspecified);
        assert_eq!(SeverityLevel::from_number(1), SeverityLevel::Trace);
        assert_eq!(SeverityLevel::from_number(4), SeverityLevel::Trace);
        assert_eq!(SeverityLevel::from_number(5), SeverityLevel::Debug);
        assert_eq!(SeverityLevel::from_number(10), SeverityLevel::Info);
        assert_eq!(SeverityLevel::from_number(13), SeverityLevel::Warn);
        assert_eq!(SeverityLevel::from_number(19), SeverityLevel::Error);
        assert_eq!(SeverityLevel::from_number(21), SeverityLevel::Fatal);
        assert_eq!(SeverityLevel::from_number(25), SeverityLevel::Fatal);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(SeverityLevel::Info.to_string(), "info");
        assert_eq!(SeverityLevel::Unspecified.to_string(), "unspecified");
    }

    #[test]
    fn test_log_record_is_error() {
        let mut record = LogRecord {
            id: "log-1-1".to_string(),
            time_unix_nano: 0,
            observed_time_unix_nano: 0,
            timestamp: Utc::now(),
            observed_time: Utc::now(),
            body: AttributeValue::String("boom".to_string()),
            severity_number: 17,
            severity_text: "ERROR".to_string(),
            severity: SeverityLevel::Error,
            trace_id: None,
            span_id: None,
            trace_flags: 0,
            resource: Resource::default(),
            instrumentation_scope: InstrumentationScope::default(),
            attributes: Vec::new(),
            dropped_attributes_count: 0,
            received_at: Utc::now(),
        };
        assert!(record.is_error());

        record.severity_number = 9;
        assert!(!record.is_error());
    }
}
