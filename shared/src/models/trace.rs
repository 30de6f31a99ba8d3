//! Trace domain model.

use crate::models::common::{Attribute, InstrumentationScope, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// The kind was not set on the wire.
    #[default]
    Unspecified,
    /// An internal operation.
    Internal,
    /// A server handling a request.
    Server,
    /// A client making a request.
    Client,
    /// A producer sending a message.
    Producer,
    /// A consumer receiving a message.
    Consumer,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// Status of a finished span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    /// No status was recorded.
    #[default]
    Unset,
    /// The operation completed successfully.
    Ok,
    /// The operation failed.
    Error,
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// An event recorded during a span's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEvent {
    /// Event name.
    pub name: String,
    /// Nanosecond epoch timestamp from the wire.
    pub timestamp_unix_nano: i64,
    /// Wall-clock form of the timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Attributes dropped by the producer before export.
    pub dropped_attributes_count: u32,
}

/// A link to a span, possibly in another trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLink {
    /// Hex-encoded trace id of the linked span.
    pub trace_id: String,
    /// Hex-encoded span id of the linked span.
    pub span_id: String,
    /// W3C trace state, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,
    /// Link attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Attributes dropped by the producer before export.
    pub dropped_attributes_count: u32,
}

/// A single span in a distributed trace.
///
/// Constructed once by the converter; `duration_ms` and the wall-clock
/// timestamps are derived at that point and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Internal id, unique per ingested item.
    pub id: String,
    /// Hex-encoded trace id.
    pub trace_id: String,
    /// Hex-encoded span id.
    pub span_id: String,
    /// Hex-encoded parent span id; `None` for root spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    /// W3C trace state, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,

    /// Start time as nanoseconds since the Unix epoch.
    pub start_time_unix_nano: i64,
    /// End time as nanoseconds since the Unix epoch.
    pub end_time_unix_nano: i64,
    /// Wall-clock start time.
    pub start_time: DateTime<Utc>,
    /// Wall-clock end time.
    pub end_time: DateTime<Utc>,
    /// Duration in milliseconds, derived once at conversion.
    pub duration_ms: f64,

    /// Operation name.
    pub name: String,
    /// Kind of span.
    pub kind: SpanKind,

    /// Status of the span.
    pub status_code: SpanStatus,
    /// Status message, when one was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// The producing entity.
    pub resource: Resource,
    /// The producing instrumentation library.
    pub instrumentation_scope: InstrumentationScope,
    /// Span attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Events recorded during the span.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,
    /// Links to related spans.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SpanLink>,

    /// Attributes dropped by the producer before export.
    pub dropped_attributes_count: u32,
    /// Events dropped by the producer before export.
    pub dropped_events_count: u32,
    /// Links dropped by the producer before export.
    pub dropped_links_count: u32,

    /// When this span was received by the collector.
    pub received_at: DateTime<Utc>,
}

impl Span {
    /// Whether the span finished with an error status.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status_code == SpanStatus::Error
    }

    /// Whether this is a root span (no parent).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }
}
