//! Metric domain model.

use crate::models::common::{Attribute, InstrumentationScope, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of metric, matching the OTLP data oneof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MetricType {
    /// An instantaneous measurement.
    #[default]
    Gauge,
    /// A running total, monotonic or not.
    Sum,
    /// A bucketed distribution with explicit bounds.
    Histogram,
    /// A distribution summarized as quantiles.
    Summary,
    /// An exponential-bucket histogram.
    ///
    /// Accepted on the wire, but its data points are not decoded; the metric
    /// keeps its metadata and an empty data-point list.
    ExponentialHistogram,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Sum => write!(f, "sum"),
            Self::Histogram => write!(f, "histogram"),
            Self::Summary => write!(f, "summary"),
            Self::ExponentialHistogram => write!(f, "exponentialHistogram"),
        }
    }
}

/// How successive data points relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationTemporality {
    /// The temporality was not set on the wire.
    Unspecified,
    /// Each point covers the interval since the previous point.
    Delta,
    /// Each point covers the interval since a fixed start time.
    Cumulative,
}

/// A quantile/value pair in a summary data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileValue {
    /// Quantile in `0.0..=1.0`.
    pub quantile: f64,
    /// Observed value at that quantile.
    pub value: f64,
}

/// A single data point within a metric.
///
/// Exactly one value family is populated, depending on the parent metric's
/// type: the number fields for gauges and sums, the histogram fields for
/// histograms, the quantile fields for summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Data point attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Interval start as nanoseconds since the Unix epoch.
    pub start_time_unix_nano: i64,
    /// Point time as nanoseconds since the Unix epoch.
    pub time_unix_nano: i64,
    /// Wall-clock form of the point time.
    pub timestamp: DateTime<Utc>,

    /// Integer value, for number points recorded as integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int64: Option<i64>,
    /// Double value, for number points recorded as doubles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_double: Option<f64>,

    /// Observation count, for histograms and summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Sum of observations, for histograms and summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Per-bucket counts, for histograms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bucket_counts: Vec<u64>,
    /// Bucket upper bounds, for histograms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explicit_bounds: Vec<f64>,

    /// Quantile values, for summaries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quantile_values: Vec<QuantileValue>,
}

/// A metric and its data points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Internal id, unique per ingested item.
    pub id: String,
    /// Metric name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Unit of measurement.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Metric type.
    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Aggregation temporality, present for sums and histograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_temporality: Option<AggregationTemporality>,

    /// The data points, ordered as they appeared on the wire.
    pub data_points: Vec<DataPoint>,

    /// The producing entity.
    pub resource: Resource,
    /// The producing instrumentation library.
    pub instrumentation_scope: InstrumentationScope,

    /// When this metric was received by the collector.
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_serialization() {
        assert_eq!(
            serde_json::to_value(MetricType::Gauge).unwrap(),
            serde_json::json!("gauge")
        );
        assert_eq!(
            serde_json::to_value(MetricType::ExponentialHistogram).unwrap(),
            serde_json::json!("exponentialHistogram")
        );
    }

    #[test]
    fn test_metric_serializes_camel_case() {
        let metric = Metric {
            id: "metric-1-1".to_string(),
            name: "http_requests_total".to_string(),
            description: String::new(),
            unit: "1".to_string(),
            metric_type: MetricType::Sum,
            aggregation_temporality: Some(AggregationTemporality::Cumulative),
            data_points: vec![DataPoint {
                time_unix_nano: 1_700_000_000_000_000_000,
                value_int64: Some(200),
                ..DataPoint::default()
            }],
            resource: Resource::default(),
            instrumentation_scope: InstrumentationScope::default(),
            received_at: Utc::now(),
        };

        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "sum");
        assert_eq!(json["aggregationTemporality"], "cumulative");
        assert_eq!(json["dataPoints"][0]["valueInt64"], 200);
        // Empty description is omitted.
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_data_point_empty_collections_are_omitted() {
        let point = DataPoint {
            time_unix_nano: 1,
            value_double: Some(0.5),
            ..DataPoint::default()
        };

        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("bucketCounts").is_none());
        assert!(json.get("quantileValues").is_none());
        assert_eq!(json["valueDouble"], 0.5);
    }
}
