//! OTLP gRPC receiver: ingestion services, bounded stores, and lifecycle.
//!
//! The receiver owns one ring buffer per signal type, the event dispatcher,
//! and the converter. The three OTLP collector services in [`services`] share
//! that state and feed it on every `Export` call.

mod services;

pub use services::{LogsServiceImpl, MetricsServiceImpl, TraceServiceImpl};

use crate::config::CollectorConfig;
use crate::dispatcher::{EventCallback, EventDispatcher};
use serde::{Deserialize, Serialize};
use shared::buffer::RingBuffer;
use shared::models::{LogRecord, Metric, Span, TelemetryStats};
use shared::otlp::proto::collector::logs::v1::logs_service_server::LogsServiceServer;
use shared::otlp::proto::collector::metrics::v1::metrics_service_server::MetricsServiceServer;
use shared::otlp::proto::collector::trace::v1::trace_service_server::TraceServiceServer;
use shared::otlp::Converter;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

/// Errors surfaced by the receiver lifecycle.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The OTLP listener could not be bound.
    #[error("failed to bind OTLP listener on {addr}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `start` was called while the receiver was already running.
    #[error("receiver already started")]
    AlreadyStarted,

    /// The gRPC transport failed while serving.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Items accepted per signal since startup or the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverStats {
    /// Spans accepted.
    pub traces_received: u64,
    /// Metrics accepted.
    pub metrics_received: u64,
    /// Log records accepted.
    pub logs_received: u64,
}

/// State shared between the receiver handle and the gRPC services.
pub(crate) struct Inner {
    pub(crate) traces: RingBuffer<Span>,
    pub(crate) metrics: RingBuffer<Metric>,
    pub(crate) logs: RingBuffer<LogRecord>,
    pub(crate) dispatcher: EventDispatcher,
    pub(crate) converter: Converter,
    pub(crate) stats: RwLock<ReceiverStats>,
}

impl Inner {
    pub(crate) fn new(config: &CollectorConfig) -> Self {
        Self {
            traces: RingBuffer::new(config.trace_capacity),
            metrics: RingBuffer::new(config.metric_capacity),
            logs: RingBuffer::new(config.log_capacity),
            dispatcher: EventDispatcher::new(config.event_queue_capacity),
            converter: Converter::new(),
            stats: RwLock::new(ReceiverStats::default()),
        }
    }

    pub(crate) fn bump_stats(&self, update: impl FnOnce(&mut ReceiverStats)) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }
}

struct ServerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), tonic::transport::Error>>,
}

/// The OTLP gRPC receiver for all three signal types.
///
/// Holds the per-signal ring buffers and exposes the read/control surface;
/// `start`/`stop` manage the gRPC server lifecycle.
pub struct OtlpReceiver {
    config: CollectorConfig,
    inner: Arc<Inner>,
    server: tokio::sync::Mutex<Option<ServerHandle>>,
}

impl OtlpReceiver {
    /// Creates a receiver with the given configuration. Nothing is bound
    /// until [`start`](Self::start).
    #[must_use]
    pub fn new(config: CollectorConfig) -> Self {
        let inner = Arc::new(Inner::new(&config));
        Self {
            config,
            inner,
            server: tokio::sync::Mutex::new(None),
        }
    }

    /// Binds the OTLP listener and starts serving in a background task.
    ///
    /// Returns the bound address (useful with port 0). Calling `start` on a
    /// running receiver is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Bind`] if the listener cannot be bound and
    /// [`CollectorError::AlreadyStarted`] if the receiver is running.
    pub async fn start(&self) -> Result<SocketAddr, CollectorError> {
        let mut server = self.server.lock().await;
        if server.is_some() {
            return Err(CollectorError::AlreadyStarted);
        }

        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CollectorError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| CollectorError::Bind { addr, source })?;

        let max_message_size = self.config.max_message_size;
        let router = Server::builder()
            .add_service(
                TraceServiceServer::new(TraceServiceImpl::new(Arc::clone(&self.inner)))
                    .max_decoding_message_size(max_message_size),
            )
            .add_service(
                MetricsServiceServer::new(MetricsServiceImpl::new(Arc::clone(&self.inner)))
                    .max_decoding_message_size(max_message_size),
            )
            .add_service(
                LogsServiceServer::new(LogsServiceImpl::new(Arc::clone(&self.inner)))
                    .max_decoding_message_size(max_message_size),
            );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(router.serve_with_incoming_shutdown(
            TcpListenerStream::new(listener),
            async {
                let _ = shutdown_rx.await;
            },
        ));

        tracing::info!(addr = %local_addr, "OTLP receiver listening");

        *server = Some(ServerHandle {
            shutdown: shutdown_tx,
            task,
        });
        Ok(local_addr)
    }

    /// Stops accepting new calls, drains in-flight ones, and releases the
    /// listener. A no-op if the receiver is not running.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Transport`] if the server task ended with a
    /// transport failure.
    pub async fn stop(&self) -> Result<(), CollectorError> {
        let handle = self.server.lock().await.take();
        let Some(handle) = handle else {
            return Ok(());
        };

        // The server may already have exited; a failed send just means the
        // shutdown future resolved on its own.
        let _ = handle.shutdown.send(());
        match handle.task.await {
            Ok(result) => result?,
            Err(join_error) => {
                tracing::error!(error = %join_error, "receiver server task failed");
            }
        }

        tracing::info!("OTLP receiver stopped");
        Ok(())
    }

    /// Registers a callback invoked once per ingested item.
    pub fn on_event(&self, callback: EventCallback) {
        self.inner.dispatcher.subscribe(callback);
    }

    /// Returns all stored spans, oldest to newest.
    #[must_use]
    pub fn get_traces(&self) -> Vec<Span> {
        self.inner.traces.get_all()
    }

    /// Returns the last `n` spans.
    #[must_use]
    pub fn get_recent_traces(&self, n: usize) -> Vec<Span> {
        self.inner.traces.get_last(n)
    }

    /// Returns the most recently stored span.
    #[must_use]
    pub fn get_latest_trace(&self) -> Option<Span> {
        self.inner.traces.get_latest()
    }

    /// Returns all stored metrics, oldest to newest.
    #[must_use]
    pub fn get_metrics(&self) -> Vec<Metric> {
        self.inner.metrics.get_all()
    }

    /// Returns the last `n` metrics.
    #[must_use]
    pub fn get_recent_metrics(&self, n: usize) -> Vec<Metric> {
        self.inner.metrics.get_last(n)
    }

    /// Returns the most recently stored metric.
    #[must_use]
    pub fn get_latest_metric(&self) -> Option<Metric> {
        self.inner.metrics.get_latest()
    }

    /// Returns all stored log records, oldest to newest.
    #[must_use]
    pub fn get_logs(&self) -> Vec<LogRecord> {
        self.inner.logs.get_all()
    }

    /// Returns the last `n` log records.
    #[must_use]
    pub fn get_recent_logs(&self, n: usize) -> Vec<LogRecord> {
        self.inner.logs.get_last(n)
    }

    /// Returns the most recently stored log record.
    #[must_use]
    pub fn get_latest_log(&self) -> Option<LogRecord> {
        self.inner.logs.get_latest()
    }

    /// Snapshot of the three stores' occupancy.
    #[must_use]
    pub fn stats(&self) -> TelemetryStats {
        let traces = self.inner.traces.stats();
        let metrics = self.inner.metrics.stats();
        let logs = self.inner.logs.stats();

        TelemetryStats {
            trace_count: traces.count,
            metric_count: metrics.count,
            log_count: logs.count,
            trace_capacity: traces.capacity,
            metric_capacity: metrics.capacity,
            log_capacity: logs.capacity,
            trace_usage: traces.usage,
            metric_usage: metrics.usage,
            log_usage: logs.usage,
        }
    }

    /// Items accepted per signal since startup or the last clear.
    #[must_use]
    pub fn received(&self) -> ReceiverStats {
        *self
            .inner
            .stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears all three stores and resets the received counters.
    pub fn clear_all(&self) {
        self.inner.traces.clear();
        self.inner.metrics.clear();
        self.inner.logs.clear();
        self.inner.bump_stats(|stats| *stats = ReceiverStats::default());
        tracing::info!("all telemetry cleared");
    }

    /// The configuration this receiver was built with.
    #[must_use]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}
