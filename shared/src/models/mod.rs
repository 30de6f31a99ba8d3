//! Domain models for the Lumen telemetry collector.
//!
//! These types are produced exclusively by the OTLP converter at ingestion
//! time and are immutable afterwards. They serialize to camelCase JSON, the
//! contract consumed by the presentation layer.

pub mod common;
pub mod event;
pub mod log;
pub mod metric;
pub mod trace;

pub use common::{
    Attribute, AttributeType, AttributeValue, InstrumentationScope, Resource, SignalType,
};
pub use event::{TelemetryBatch, TelemetryEvent, TelemetryStats};
pub use log::{LogRecord, SeverityLevel};
pub use metric::{AggregationTemporality, DataPoint, Metric, MetricType, QuantileValue};
pub use trace::{Span, SpanEvent, SpanKind, SpanLink, SpanStatus};
