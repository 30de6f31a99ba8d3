//! Conversions between OTLP protobuf types and the Lumen domain model.
//!
//! Every conversion is total: malformed or absent optional fields degrade to
//! documented defaults instead of failing, so ingestion never rejects a
//! batch the transport layer accepted.

use crate::ids::IdGenerator;
use crate::models::{
    AggregationTemporality, Attribute, AttributeType, AttributeValue, DataPoint,
    InstrumentationScope, LogRecord, Metric, MetricType, QuantileValue, Resource, SeverityLevel,
    Span, SpanEvent, SpanKind, SpanLink, SpanStatus,
};
use crate::otlp::proto;
use chrono::{DateTime, Utc};
use std::time::{Duration, UNIX_EPOCH};

/// Converts an OTLP timestamp (nanoseconds since epoch) to a `DateTime<Utc>`.
fn timestamp_to_datetime(nanos: u64) -> DateTime<Utc> {
    let duration = Duration::from_nanos(nanos);
    DateTime::<Utc>::from(UNIX_EPOCH + duration)
}

/// Hex-encodes an id, mapping empty bytes to `None`.
fn encode_optional_id(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(hex::encode(bytes))
    }
}

/// Wraps a non-empty string in `Some`.
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Converts an OTLP `AnyValue` to a domain [`AttributeValue`].
///
/// Arrays and keyed lists recurse through this decoder, so nesting is
/// unbounded; byte values are rendered as lowercase hex.
fn convert_any_value(value: Option<&proto::common::v1::AnyValue>) -> AttributeValue {
    use proto::common::v1::any_value::Value;

    match value.and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(s)) => AttributeValue::String(s.clone()),
        Some(Value::IntValue(i)) => AttributeValue::Int(*i),
        Some(Value::DoubleValue(d)) => AttributeValue::Double(*d),
        Some(Value::BoolValue(b)) => AttributeValue::Bool(*b),
        Some(Value::ArrayValue(arr)) => AttributeValue::Array(
            arr.values
                .iter()
                .map(|v| convert_any_value(Some(v)))
                .collect(),
        ),
        Some(Value::KvlistValue(kv)) => AttributeValue::KvList(
            kv.values
                .iter()
                .map(|pair| (pair.key.clone(), convert_any_value(pair.value.as_ref())))
                .collect(),
        ),
        Some(Value::BytesValue(b)) => AttributeValue::String(hex::encode(b)),
        None => AttributeValue::Null,
    }
}

/// Returns the type tag for an OTLP `AnyValue`.
fn value_type(value: Option<&proto::common::v1::AnyValue>) -> AttributeType {
    use proto::common::v1::any_value::Value;

    match value.and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(_)) => AttributeType::String,
        Some(Value::IntValue(_)) => AttributeType::Int,
        Some(Value::DoubleValue(_)) => AttributeType::Double,
        Some(Value::BoolValue(_)) => AttributeType::Bool,
        Some(Value::ArrayValue(_)) => AttributeType::Array,
        Some(Value::KvlistValue(_)) => AttributeType::Kvlist,
        Some(Value::BytesValue(_)) => AttributeType::Bytes,
        None => AttributeType::Null,
    }
}

/// Converts OTLP key-value pairs to domain attributes.
fn convert_attributes(attributes: &[proto::common::v1::KeyValue]) -> Vec<Attribute> {
    attributes
        .iter()
        .map(|kv| Attribute {
            key: kv.key.clone(),
            value: convert_any_value(kv.value.as_ref()),
            value_type: value_type(kv.value.as_ref()),
        })
        .collect()
}

/// Converts an OTLP span kind, defaulting to `Unspecified`.
fn convert_span_kind(kind: i32) -> SpanKind {
    use proto::trace::v1::span::SpanKind as OtlpSpanKind;

    match OtlpSpanKind::try_from(kind) {
        Ok(OtlpSpanKind::Internal) => SpanKind::Internal,
        Ok(OtlpSpanKind::Server) => SpanKind::Server,
        Ok(OtlpSpanKind::Client) => SpanKind::Client,
        Ok(OtlpSpanKind::Producer) => SpanKind::Producer,
        Ok(OtlpSpanKind::Consumer) => SpanKind::Consumer,
        Ok(OtlpSpanKind::Unspecified) | Err(_) => SpanKind::Unspecified,
    }
}

/// Converts an OTLP span status, defaulting to `Unset`.
fn convert_status_code(status: Option<&proto::trace::v1::Status>) -> SpanStatus {
    use proto::trace::v1::status::StatusCode;

    match status {
        Some(s) => match StatusCode::try_from(s.code) {
            Ok(StatusCode::Ok) => SpanStatus::Ok,
            Ok(StatusCode::Error) => SpanStatus::Error,
            Ok(StatusCode::Unset) | Err(_) => SpanStatus::Unset,
        },
        None => SpanStatus::Unset,
    }
}

/// Converts an OTLP aggregation temporality value.
fn convert_temporality(temporality: i32) -> AggregationTemporality {
    use proto::metrics::v1::AggregationTemporality as OtlpTemporality;

    match OtlpTemporality::try_from(temporality) {
        Ok(OtlpTemporality::Delta) => AggregationTemporality::Delta,
        Ok(OtlpTemporality::Cumulative) => AggregationTemporality::Cumulative,
        Ok(OtlpTemporality::Unspecified) | Err(_) => AggregationTemporality::Unspecified,
    }
}

fn convert_span_events(events: &[proto::trace::v1::span::Event]) -> Vec<SpanEvent> {
    events
        .iter()
        .map(|e| SpanEvent {
            name: e.name.clone(),
            timestamp_unix_nano: e.time_unix_nano as i64,
            timestamp: timestamp_to_datetime(e.time_unix_nano),
            attributes: convert_attributes(&e.attributes),
            dropped_attributes_count: e.dropped_attributes_count,
        })
        .collect()
}

fn convert_span_links(links: &[proto::trace::v1::span::Link]) -> Vec<SpanLink> {
    links
        .iter()
        .map(|l| SpanLink {
            trace_id: hex::encode(&l.trace_id),
            span_id: hex::encode(&l.span_id),
            trace_state: non_empty(&l.trace_state),
            attributes: convert_attributes(&l.attributes),
            dropped_attributes_count: l.dropped_attributes_count,
        })
        .collect()
}

fn convert_number_data_points(points: &[proto::metrics::v1::NumberDataPoint]) -> Vec<DataPoint> {
    use proto::metrics::v1::number_data_point::Value;

    points
        .iter()
        .map(|dp| {
            let (value_int64, value_double) = match dp.value {
                Some(Value::AsInt(i)) => (Some(i), None),
                Some(Value::AsDouble(d)) => (None, Some(d)),
                None => (None, None),
            };

            DataPoint {
                attributes: convert_attributes(&dp.attributes),
                start_time_unix_nano: dp.start_time_unix_nano as i64,
                time_unix_nano: dp.time_unix_nano as i64,
                timestamp: timestamp_to_datetime(dp.time_unix_nano),
                value_int64,
                value_double,
                ..DataPoint::default()
            }
        })
        .collect()
}

fn convert_histogram_data_points(
    points: &[proto::metrics::v1::HistogramDataPoint],
) -> Vec<DataPoint> {
    points
        .iter()
        .map(|dp| DataPoint {
            attributes: convert_attributes(&dp.attributes),
            start_time_unix_nano: dp.start_time_unix_nano as i64,
            time_unix_nano: dp.time_unix_nano as i64,
            timestamp: timestamp_to_datetime(dp.time_unix_nano),
            count: Some(dp.count),
            sum: dp.sum,
            bucket_counts: dp.bucket_counts.clone(),
            explicit_bounds: dp.explicit_bounds.clone(),
            ..DataPoint::default()
        })
        .collect()
}

fn convert_summary_data_points(points: &[proto::metrics::v1::SummaryDataPoint]) -> Vec<DataPoint> {
    points
        .iter()
        .map(|dp| DataPoint {
            attributes: convert_attributes(&dp.attributes),
            start_time_unix_nano: dp.start_time_unix_nano as i64,
            time_unix_nano: dp.time_unix_nano as i64,
            timestamp: timestamp_to_datetime(dp.time_unix_nano),
            count: Some(dp.count),
            sum: Some(dp.sum),
            quantile_values: dp
                .quantile_values
                .iter()
                .map(|qv| QuantileValue {
                    quantile: qv.quantile,
                    value: qv.value,
                })
                .collect(),
            ..DataPoint::default()
        })
        .collect()
}

/// Maps OTLP wire types into the domain model.
///
/// Each converter owns its [`IdGenerator`]; the ingestion service holds one
/// converter and every converted item receives a fresh id from it.
#[derive(Debug, Default)]
pub struct Converter {
    ids: IdGenerator,
}

impl Converter {
    /// Creates a converter with a fresh id generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter using the provided id generator.
    #[must_use]
    pub fn with_generator(ids: IdGenerator) -> Self {
        Self { ids }
    }

    /// Converts an OTLP resource; `None` yields an empty resource with the
    /// `"unknown"` service name.
    #[must_use]
    pub fn convert_resource(
        &self,
        resource: Option<&proto::resource::v1::Resource>,
    ) -> Resource {
        match resource {
            Some(r) => Resource::from_attributes(convert_attributes(&r.attributes)),
            None => Resource::default(),
        }
    }

    /// Converts an OTLP instrumentation scope; `None` yields an empty scope.
    #[must_use]
    pub fn convert_scope(
        &self,
        scope: Option<&proto::common::v1::InstrumentationScope>,
    ) -> InstrumentationScope {
        match scope {
            Some(s) => InstrumentationScope {
                name: s.name.clone(),
                version: s.version.clone(),
                attributes: convert_attributes(&s.attributes),
            },
            None => InstrumentationScope::default(),
        }
    }

    /// Converts an OTLP span.
    ///
    /// Ids are hex-encoded, enum values outside the known range fall back to
    /// `Unspecified`/`Unset`, and `duration_ms` is derived here once.
    #[must_use]
    pub fn convert_span(
        &self,
        span: &proto::trace::v1::Span,
        resource: &Resource,
        scope: &InstrumentationScope,
    ) -> Span {
        let start_nano = span.start_time_unix_nano as i64;
        let end_nano = span.end_time_unix_nano as i64;

        Span {
            id: self.ids.next_id("span"),
            trace_id: hex::encode(&span.trace_id),
            span_id: hex::encode(&span.span_id),
            parent_span_id: encode_optional_id(&span.parent_span_id),
            trace_state: non_empty(&span.trace_state),
            start_time_unix_nano: start_nano,
            end_time_unix_nano: end_nano,
            start_time: timestamp_to_datetime(span.start_time_unix_nano),
            end_time: timestamp_to_datetime(span.end_time_unix_nano),
            duration_ms: (end_nano - start_nano) as f64 / 1e6,
            name: span.name.clone(),
            kind: convert_span_kind(span.kind),
            status_code: convert_status_code(span.status.as_ref()),
            status_message: span
                .status
                .as_ref()
                .and_then(|s| non_empty(&s.message)),
            resource: resource.clone(),
            instrumentation_scope: scope.clone(),
            attributes: convert_attributes(&span.attributes),
            events: convert_span_events(&span.events),
            links: convert_span_links(&span.links),
            dropped_attributes_count: span.dropped_attributes_count,
            dropped_events_count: span.dropped_events_count,
            dropped_links_count: span.dropped_links_count,
            received_at: Utc::now(),
        }
    }

    /// Converts an OTLP metric, dispatching on its data oneof.
    ///
    /// Exponential-histogram metrics keep their metadata and temporality but
    /// carry an empty data-point list.
    #[must_use]
    pub fn convert_metric(
        &self,
        metric: &proto::metrics::v1::Metric,
        resource: &Resource,
        scope: &InstrumentationScope,
    ) -> Metric {
        use proto::metrics::v1::metric::Data;

        let (metric_type, aggregation_temporality, data_points) = match &metric.data {
            Some(Data::Gauge(gauge)) => (
                MetricType::Gauge,
                None,
                convert_number_data_points(&gauge.data_points),
            ),
            Some(Data::Sum(sum)) => (
                MetricType::Sum,
                Some(convert_temporality(sum.aggregation_temporality)),
                convert_number_data_points(&sum.data_points),
            ),
            Some(Data::Histogram(histogram)) => (
                MetricType::Histogram,
                Some(convert_temporality(histogram.aggregation_temporality)),
                convert_histogram_data_points(&histogram.data_points),
            ),
            Some(Data::Summary(summary)) => (
                MetricType::Summary,
                None,
                convert_summary_data_points(&summary.data_points),
            ),
            Some(Data::ExponentialHistogram(exponential)) => {
                tracing::debug!(
                    metric = %metric.name,
                    "exponential histogram data points are not decoded"
                );
                (
                    MetricType::ExponentialHistogram,
                    Some(convert_temporality(exponential.aggregation_temporality)),
                    Vec::new(),
                )
            }
            None => (MetricType::Gauge, None, Vec::new()),
        };

        Metric {
            id: self.ids.next_id("metric"),
            name: metric.name.clone(),
            description: metric.description.clone(),
            unit: metric.unit.clone(),
            metric_type,
            aggregation_temporality,
            data_points,
            resource: resource.clone(),
            instrumentation_scope: scope.clone(),
            received_at: Utc::now(),
        }
    }

    /// Converts an OTLP log record.
    ///
    /// Empty trace/span ids become `None`; the severity number is banded into
    /// its normalized tier alongside the raw value.
    #[must_use]
    pub fn convert_log_record(
        &self,
        log: &proto::logs::v1::LogRecord,
        resource: &Resource,
        scope: &InstrumentationScope,
    ) -> LogRecord {
        LogRecord {
            id: self.ids.next_id("log"),
            time_unix_nano: log.time_unix_nano as i64,
            observed_time_unix_nano: log.observed_time_unix_nano as i64,
            timestamp: timestamp_to_datetime(log.time_unix_nano),
            observed_time: timestamp_to_datetime(log.observed_time_unix_nano),
            body: convert_any_value(log.body.as_ref()),
            severity_number: log.severity_number,
            severity_text: log.severity_text.clone(),
            severity: SeverityLevel::from_number(log.severity_number),
            trace_id: encode_optional_id(&log.trace_id),
            span_id: encode_optional_id(&log.span_id),
            trace_flags: log.flags,
            resource: resource.clone(),
            instrumentation_scope: scope.clone(),
            attributes: convert_attributes(&log.attributes),
            dropped_attributes_count: log.dropped_attributes_count,
            received_at: Utc::now(),
        }
    }
}


#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
