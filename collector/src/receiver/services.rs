//! gRPC service implementations for the OTLP collector services.
//!
//! Each service walks its request's resource-group / scope-group / item
//! nesting, converting the resource and scope once per group and reusing
//! them for every item in it. Converted items are pushed to the matching
//! store and handed to the dispatcher before the call is acknowledged.
//! Conversion is total, so a batch the transport accepted is always
//! acknowledged in full.

use super::Inner;
use shared::models::TelemetryEvent;
use shared::otlp::proto;
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// Implementation of the OTLP `TraceService`.
#[derive(Clone)]
pub struct TraceServiceImpl {
    inner: Arc<Inner>,
}

impl TraceServiceImpl {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }
}

#[tonic::async_trait]
impl proto::collector::trace::v1::trace_service_server::TraceService for TraceServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::trace::v1::ExportTraceServiceRequest>,
    ) -> Result<Response<proto::collector::trace::v1::ExportTraceServiceResponse>, Status> {
        let req = request.into_inner();
        let mut span_count: u64 = 0;

        for resource_spans in &req.resource_spans {
            let resource = self
                .inner
                .converter
                .convert_resource(resource_spans.resource.as_ref());

            for scope_spans in &resource_spans.scope_spans {
                let scope = self.inner.converter.convert_scope(scope_spans.scope.as_ref());

                for span in &scope_spans.spans {
                    let converted = self.inner.converter.convert_span(span, &resource, &scope);
                    self.inner.traces.push(converted.clone());
                    self.inner
                        .dispatcher
                        .emit(&TelemetryEvent::from_span(converted));
                    span_count += 1;
                }
            }
        }

        self.inner.bump_stats(|stats| stats.traces_received += span_count);
        tracing::debug!(count = span_count, "received spans");

        Ok(Response::new(
            proto::collector::trace::v1::ExportTraceServiceResponse {
                partial_success: None,
            },
        ))
    }
}

/// Implementation of the OTLP `MetricsService`.
#[derive(Clone)]
pub struct MetricsServiceImpl {
    inner: Arc<Inner>,
}

impl MetricsServiceImpl {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }
}

#[tonic::async_trait]
impl proto::collector::metrics::v1::metrics_service_server::MetricsService for MetricsServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::metrics::v1::ExportMetricsServiceRequest>,
    ) -> Result<Response<proto::collector::metrics::v1::ExportMetricsServiceResponse>, Status> {
        let req = request.into_inner();
        let mut metric_count: u64 = 0;

        for resource_metrics in &req.resource_metrics {
            let resource = self
                .inner
                .converter
                .convert_resource(resource_metrics.resource.as_ref());

            for scope_metrics in &resource_metrics.scope_metrics {
                let scope = self
                    .inner
                    .converter
                    .convert_scope(scope_metrics.scope.as_ref());

                for metric in &scope_metrics.metrics {
                    let converted = self.inner.converter.convert_metric(metric, &resource, &scope);
                    self.inner.metrics.push(converted.clone());
                    self.inner
                        .dispatcher
                        .emit(&TelemetryEvent::from_metric(converted));
                    metric_count += 1;
                }
            }
        }

        self.inner
            .bump_stats(|stats| stats.metrics_received += metric_count);
        tracing::debug!(count = metric_count, "received metrics");

        Ok(Response::new(
            proto::collector::metrics::v1::ExportMetricsServiceResponse {
                partial_success: None,
            },
        ))
    }
}

/// Implementation of the OTLP `LogsService`.
#[derive(Clone)]
pub struct LogsServiceImpl {
    inner: Arc<Inner>,
}

impl LogsServiceImpl {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }
}

#[tonic::async_trait]
impl proto::collector::logs::v1::logs_service_server::LogsService for LogsServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::logs::v1::ExportLogsServiceRequest>,
    ) -> Result<Response<proto::collector::logs::v1::ExportLogsServiceResponse>, Status> {
        let req = request.into_inner();
        let mut log_count: u64 = 0;

        for resource_logs in &req.resource_logs {
            let resource = self
                .inner
                .converter
                .convert_resource(resource_logs.resource.as_ref());

            for scope_logs in &resource_logs.scope_logs {
                let scope = self.inner.converter.convert_scope(scope_logs.scope.as_ref());

                for log_record in &scope_logs.log_records {
                    let converted =
                        self.inner
                            .converter
                            .convert_log_record(log_record, &resource, &scope);
                    self.inner.logs.push(converted.clone());
                    self.inner
                        .dispatcher
                        .emit(&TelemetryEvent::from_log(converted));
                    log_count += 1;
                }
            }
        }

        self.inner.bump_stats(|stats| stats.logs_received += log_count);
        tracing::debug!(count = log_count, "received logs");

        Ok(Response::new(
            proto::collector::logs::v1::ExportLogsServiceResponse {
                partial_success: None,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectorConfig;
    use proto::collector::logs::v1::logs_service_server::LogsService;
    use proto::collector::metrics::v1::metrics_service_server::MetricsService;
    use proto::collector::trace::v1::trace_service_server::TraceService;
    use shared::models::{SeverityLevel, SpanKind, SpanStatus};

    fn test_inner() -> Arc<Inner> {
        Arc::new(Inner::new(&CollectorConfig {
            trace_capacity: 10,
            metric_capacity: 10,
            log_capacity: 10,
            ..CollectorConfig::default()
        }))
    }

    fn service_name_kv(name: &str) -> proto::common::v1::KeyValue {
        proto::common::v1::KeyValue {
            key: "service.name".to_string(),
            value: Some(proto::common::v1::AnyValue {
                value: Some(proto::common::v1::any_value::Value::StringValue(
                    name.to_string(),
                )),
            }),
        }
    }

    fn test_span(name: &str) -> proto::trace::v1::Span {
        proto::trace::v1::Span {
            trace_id: vec![0x01; 16],
            span_id: vec![0x02; 8],
            name: name.to_string(),
            kind: proto::trace::v1::span::SpanKind::Server as i32,
            start_time_unix_nano: 1_700_000_000_000_000_000,
            end_time_unix_nano: 1_700_000_001_000_000_000,
            status: Some(proto::trace::v1::Status {
                message: String::new(),
                code: proto::trace::v1::status::StatusCode::Ok as i32,
            }),
            ..Default::default()
        }
    }

    // ========== TraceService tests ==========

    #[tokio::test]
    async fn test_trace_service_empty_request() {
        let inner = test_inner();
        let service = TraceServiceImpl::new(Arc::clone(&inner));

        let response = service
            .export(Request::new(
                proto::collector::trace::v1::ExportTraceServiceRequest {
                    resource_spans: vec![],
                },
            ))
            .await
            .unwrap();

        assert!(response.into_inner().partial_success.is_none());
        assert_eq!(inner.traces.len(), 0);
    }

    #[tokio::test]
    async fn test_trace_service_stores_spans() {
        let inner = test_inner();
        let service = TraceServiceImpl::new(Arc::clone(&inner));

        let request = Request::new(proto::collector::trace::v1::ExportTraceServiceRequest {
            resource_spans: vec![proto::trace::v1::ResourceSpans {
                resource: Some(proto::resource::v1::Resource {
                    attributes: vec![service_name_kv("trace-service")],
                    ..Default::default()
                }),
                scope_spans: vec![proto::trace::v1::ScopeSpans {
                    scope: Some(proto::common::v1::InstrumentationScope {
                        name: "test-tracer".to_string(),
                        version: "1.0.0".to_string(),
                        ..Default::default()
                    }),
                    spans: vec![test_span("op-a"), test_span("op-b")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        });

        service.export(request).await.unwrap();

        let stored = inner.traces.get_all();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "op-a");
        assert_eq!(stored[1].name, "op-b");
        assert_eq!(stored[0].kind, SpanKind::Server);
        assert_eq!(stored[0].status_code, SpanStatus::Ok);
        // Resource and scope are shared by both spans of the group.
        assert_eq!(stored[0].resource.service_name, "trace-service");
        assert_eq!(stored[1].instrumentation_scope.name, "test-tracer");

        let stats = inner.stats.read().unwrap();
        assert_eq!(stats.traces_received, 2);
    }

    #[tokio::test]
    async fn test_trace_service_missing_resource_defaults() {
        let inner = test_inner();
        let service = TraceServiceImpl::new(Arc::clone(&inner));

        let request = Request::new(proto::collector::trace::v1::ExportTraceServiceRequest {
            resource_spans: vec![proto::trace::v1::ResourceSpans {
                resource: None,
                scope_spans: vec![proto::trace::v1::ScopeSpans {
                    scope: None,
                    spans: vec![test_span("orphan")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        });

        service.export(request).await.unwrap();

        let stored = inner.traces.get_all();
        assert_eq!(stored[0].resource.service_name, "unknown");
    }

    #[tokio::test]
    async fn test_trace_service_overflow_evicts_oldest() {
        let inner = Arc::new(Inner::new(&CollectorConfig {
            trace_capacity: 2,
            ..CollectorConfig::default()
        }));
        let service = TraceServiceImpl::new(Arc::clone(&inner));

        for name in ["first", "second", "third"] {
            let request = Request::new(proto::collector::trace::v1::ExportTraceServiceRequest {
                resource_spans: vec![proto::trace::v1::ResourceSpans {
                    scope_spans: vec![proto::trace::v1::ScopeSpans {
                        spans: vec![test_span(name)],
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            });
            service.export(request).await.unwrap();
        }

        let stored = inner.traces.get_all();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "second");
        assert_eq!(stored[1].name, "third");
        // The received counter keeps counting past evictions.
        assert_eq!(inner.stats.read().unwrap().traces_received, 3);
    }

    // ========== MetricsService tests ==========

    #[tokio::test]
    async fn test_metrics_service_empty_request() {
        let inner = test_inner();
        let service = MetricsServiceImpl::new(Arc::clone(&inner));

        let response = service
            .export(Request::new(
                proto::collector::metrics::v1::ExportMetricsServiceRequest {
                    resource_metrics: vec![],
                },
            ))
            .await
            .unwrap();

        assert!(response.into_inner().partial_success.is_none());
        assert_eq!(inner.metrics.len(), 0);
    }

    #[tokio::test]
    async fn test_metrics_service_stores_gauge() {
        let inner = test_inner();
        let service = MetricsServiceImpl::new(Arc::clone(&inner));

        let request = Request::new(proto::collector::metrics::v1::ExportMetricsServiceRequest {
            resource_metrics: vec![proto::metrics::v1::ResourceMetrics {
                resource: Some(proto::resource::v1::Resource {
                    attributes: vec![service_name_kv("metrics-service")],
                    ..Default::default()
                }),
                scope_metrics: vec![proto::metrics::v1::ScopeMetrics {
                    metrics: vec![proto::metrics::v1::Metric {
                        name: "memory_usage".to_string(),
                        unit: "bytes".to_string(),
                        data: Some(proto::metrics::v1::metric::Data::Gauge(
                            proto::metrics::v1::Gauge {
                                data_points: vec![proto::metrics::v1::NumberDataPoint {
                                    time_unix_nano: 1_700_000_000_000_000_000,
                                    value: Some(
                                        proto::metrics::v1::number_data_point::Value::AsDouble(
                                            99.9,
                                        ),
                                    ),
                                    ..Default::default()
                                }],
                            },
                        )),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        });

        service.export(request).await.unwrap();

        let stored = inner.metrics.get_all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "memory_usage");
        assert_eq!(stored[0].data_points[0].value_double, Some(99.9));
        assert_eq!(inner.stats.read().unwrap().metrics_received, 1);
    }

    // ========== LogsService tests ==========

    #[tokio::test]
    async fn test_logs_service_empty_request() {
        let inner = test_inner();
        let service = LogsServiceImpl::new(Arc::clone(&inner));

        let response = service
            .export(Request::new(
                proto::collector::logs::v1::ExportLogsServiceRequest {
                    resource_logs: vec![],
                },
            ))
            .await
            .unwrap();

        assert!(response.into_inner().partial_success.is_none());
        assert_eq!(inner.logs.len(), 0);
    }

    #[tokio::test]
    async fn test_logs_service_stores_record() {
        let inner = test_inner();
        let service = LogsServiceImpl::new(Arc::clone(&inner));

        let request = Request::new(proto::collector::logs::v1::ExportLogsServiceRequest {
            resource_logs: vec![proto::logs::v1::ResourceLogs {
                resource: Some(proto::resource::v1::Resource {
                    attributes: vec![service_name_kv("logs-service")],
                    ..Default::default()
                }),
                scope_logs: vec![proto::logs::v1::ScopeLogs {
                    log_records: vec![proto::logs::v1::LogRecord {
                        time_unix_nano: 1_700_000_000_000_000_000,
                        severity_number: 13,
                        severity_text: "WARN".to_string(),
                        body: Some(proto::common::v1::AnyValue {
                            value: Some(proto::common::v1::any_value::Value::StringValue(
                                "disk nearly full".to_string(),
                            )),
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        });

        service.export(request).await.unwrap();

        let stored = inner.logs.get_all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].severity, SeverityLevel::Warn);
        assert_eq!(stored[0].resource.service_name, "logs-service");
        assert_eq!(inner.stats.read().unwrap().logs_received, 1);
    }

    #[tokio::test]
    async fn test_export_emits_events() {
        use tokio::sync::mpsc;

        let inner = test_inner();
        let (tx, mut rx) = mpsc::unbounded_channel();
        inner.dispatcher.subscribe(Box::new(move |event| {
            tx.send(event).unwrap();
        }));

        let service = TraceServiceImpl::new(Arc::clone(&inner));
        let request = Request::new(proto::collector::trace::v1::ExportTraceServiceRequest {
            resource_spans: vec![proto::trace::v1::ResourceSpans {
                scope_spans: vec![proto::trace::v1::ScopeSpans {
                    spans: vec![test_span("evented")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        });
        service.export(request).await.unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.span.unwrap().name, "evented");
    }
}
