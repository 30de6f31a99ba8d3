//! Embedding facade: the read/control surface consumed by a shell or UI.

use crate::config::CollectorConfig;
use crate::dispatcher::EventCallback;
use crate::receiver::{CollectorError, OtlpReceiver, ReceiverStats};
use shared::models::{LogRecord, Metric, Span, TelemetryBatch, TelemetryStats};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// The collector core plus the streaming gate a presentation layer toggles.
///
/// The gate is advisory: subscribers check [`Collector::is_streaming`]
/// themselves before forwarding an event; the dispatcher always delivers to
/// every registered callback.
pub struct Collector {
    receiver: OtlpReceiver,
    streaming: AtomicBool,
}

impl Collector {
    /// Creates a collector with the given configuration.
    #[must_use]
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            receiver: OtlpReceiver::new(config),
            streaming: AtomicBool::new(false),
        }
    }

    /// Starts the OTLP receiver and returns the bound address.
    ///
    /// # Errors
    ///
    /// See [`OtlpReceiver::start`].
    pub async fn start(&self) -> Result<SocketAddr, CollectorError> {
        self.receiver.start().await
    }

    /// Gracefully stops the OTLP receiver.
    ///
    /// # Errors
    ///
    /// See [`OtlpReceiver::stop`].
    pub async fn stop(&self) -> Result<(), CollectorError> {
        self.receiver.stop().await
    }

    /// Registers a callback invoked once per ingested item.
    pub fn on_event(&self, callback: EventCallback) {
        self.receiver.on_event(callback);
    }

    /// Enables forwarding of events to the presentation layer.
    pub fn start_streaming(&self) {
        self.streaming.store(true, Ordering::Relaxed);
        tracing::info!("streaming enabled");
    }

    /// Disables forwarding of events to the presentation layer.
    pub fn stop_streaming(&self) {
        self.streaming.store(false, Ordering::Relaxed);
        tracing::info!("streaming disabled");
    }

    /// Whether streaming is currently enabled.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Relaxed)
    }

    /// Returns all stored spans (up to buffer capacity).
    #[must_use]
    pub fn get_traces(&self) -> Vec<Span> {
        self.receiver.get_traces()
    }

    /// Returns the last `n` spans.
    #[must_use]
    pub fn get_recent_traces(&self, n: usize) -> Vec<Span> {
        self.receiver.get_recent_traces(n)
    }

    /// Returns all stored metrics (up to buffer capacity).
    #[must_use]
    pub fn get_metrics(&self) -> Vec<Metric> {
        self.receiver.get_metrics()
    }

    /// Returns the last `n` metrics.
    #[must_use]
    pub fn get_recent_metrics(&self, n: usize) -> Vec<Metric> {
        self.receiver.get_recent_metrics(n)
    }

    /// Returns all stored log records (up to buffer capacity).
    #[must_use]
    pub fn get_logs(&self) -> Vec<LogRecord> {
        self.receiver.get_logs()
    }

    /// Returns the last `n` log records.
    #[must_use]
    pub fn get_recent_logs(&self, n: usize) -> Vec<LogRecord> {
        self.receiver.get_recent_logs(n)
    }

    /// Returns everything currently stored, for an initial load or refresh.
    #[must_use]
    pub fn get_all_telemetry(&self) -> TelemetryBatch {
        TelemetryBatch {
            spans: self.receiver.get_traces(),
            metrics: self.receiver.get_metrics(),
            logs: self.receiver.get_logs(),
        }
    }

    /// Snapshot of the three stores' occupancy.
    #[must_use]
    pub fn stats(&self) -> TelemetryStats {
        self.receiver.stats()
    }

    /// Items accepted per signal since startup or the last clear.
    #[must_use]
    pub fn received(&self) -> ReceiverStats {
        self.receiver.received()
    }

    /// Clears all stored telemetry and resets the received counters.
    pub fn clear_all(&self) {
        self.receiver.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_gate_toggles() {
        let collector = Collector::new(CollectorConfig::default());
        assert!(!collector.is_streaming());

        collector.start_streaming();
        assert!(collector.is_streaming());

        collector.stop_streaming();
        assert!(!collector.is_streaming());
    }

    #[test]
    fn test_empty_collector_surfaces() {
        let collector = Collector::new(CollectorConfig {
            trace_capacity: 5,
            metric_capacity: 5,
            log_capacity: 5,
            ..CollectorConfig::default()
        });

        let batch = collector.get_all_telemetry();
        assert!(batch.spans.is_empty());
        assert!(batch.metrics.is_empty());
        assert!(batch.logs.is_empty());

        let stats = collector.stats();
        assert_eq!(stats.trace_count, 0);
        assert_eq!(stats.trace_capacity, 5);
        assert_eq!(collector.received(), ReceiverStats::default());
    }
}
