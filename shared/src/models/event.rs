//! Read-surface types: events pushed to subscribers and bulk snapshots.

use crate::models::common::SignalType;
use crate::models::log::LogRecord;
use crate::models::metric::Metric;
use crate::models::trace::Span;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A real-time event emitted once per ingested telemetry item.
///
/// Exactly one of `span`, `metric`, or `log` is populated, matching
/// `signal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Which signal the event carries.
    #[serde(rename = "type")]
    pub signal: SignalType,
    /// The span, for trace events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The metric, for metric events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    /// The log record, for log events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogRecord>,
    /// When the carried item was received.
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Wraps a span in a trace event.
    #[must_use]
    pub fn from_span(span: Span) -> Self {
        Self {
            signal: SignalType::Trace,
            timestamp: span.received_at,
            span: Some(span),
            metric: None,
            log: None,
        }
    }

    /// Wraps a metric in a metric event.
    #[must_use]
    pub fn from_metric(metric: Metric) -> Self {
        Self {
            signal: SignalType::Metric,
            timestamp: metric.received_at,
            span: None,
            metric: Some(metric),
            log: None,
        }
    }

    /// Wraps a log record in a log event.
    #[must_use]
    pub fn from_log(log: LogRecord) -> Self {
        Self {
            signal: SignalType::Log,
            timestamp: log.received_at,
            span: None,
            metric: None,
            log: Some(log),
        }
    }
}

/// A bulk snapshot of everything currently stored, for initial loads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryBatch {
    /// Stored spans, oldest to newest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
    /// Stored metrics, oldest to newest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,
    /// Stored log records, oldest to newest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogRecord>,
}

/// Occupancy of the three signal stores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryStats {
    /// Spans currently stored.
    pub trace_count: usize,
    /// Metrics currently stored.
    pub metric_count: usize,
    /// Log records currently stored.
    pub log_count: usize,
    /// Trace store capacity.
    pub trace_capacity: usize,
    /// Metric store capacity.
    pub metric_capacity: usize,
    /// Log store capacity.
    pub log_capacity: usize,
    /// Trace store fill ratio.
    pub trace_usage: f64,
    /// Metric store fill ratio.
    pub metric_usage: f64,
    /// Log store fill ratio.
    pub log_usage: f64,
}
