//! Non-blocking fan-out of telemetry events to subscribers.
//!
//! Each subscriber owns a bounded queue drained by its own worker task, so a
//! slow or panicking callback can never stall the ingestion path or other
//! subscribers. When a queue is full the incoming event is dropped for that
//! subscriber (drop-newest) and counted.

use shared::models::TelemetryEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc;

/// Callback invoked once per delivered telemetry event.
pub type EventCallback = Box<dyn Fn(TelemetryEvent) + Send + Sync + 'static>;

struct Subscriber {
    queue: mpsc::Sender<TelemetryEvent>,
}

/// Fan-out gate between the ingestion path and registered subscribers.
///
/// Subscriptions are process-lifetime; there is no unsubscribe. Delivery to
/// one subscriber is FIFO through its queue; ordering across subscribers is
/// unspecified.
pub struct EventDispatcher {
    subscribers: RwLock<Vec<Subscriber>>,
    queue_capacity: usize,
    dropped: AtomicU64,
}

impl EventDispatcher {
    /// Creates a dispatcher whose subscriber queues hold `queue_capacity`
    /// events each. A capacity of zero is corrected to one.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            queue_capacity: queue_capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Registers a callback and spawns its delivery worker.
    ///
    /// Must be called from within a tokio runtime. A panic inside the
    /// callback is caught and logged; the worker keeps draining.
    pub fn subscribe(&self, callback: EventCallback) {
        let (tx, mut rx) = mpsc::channel::<TelemetryEvent>(self.queue_capacity);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                    tracing::warn!("event subscriber panicked; event discarded");
                }
            }
        });

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { queue: tx });
    }

    /// Hands the event to every subscriber queue and returns immediately.
    ///
    /// A full queue drops the event for that subscriber only.
    pub fn emit(&self, event: &TelemetryEvent) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        for subscriber in subscribers.iter() {
            match subscriber.queue.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("subscriber queue full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Worker is gone (runtime shutdown); nothing to deliver to.
                }
            }
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Total events dropped because a subscriber queue was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        AttributeValue, InstrumentationScope, LogRecord, Resource, SeverityLevel, SignalType,
    };
    use std::time::Duration;

    fn test_event(message: &str) -> TelemetryEvent {
        let now = shared::chrono::Utc::now();
        TelemetryEvent::from_log(LogRecord {
            id: format!("log-test-{message}"),
            time_unix_nano: 0,
            observed_time_unix_nano: 0,
            timestamp: now,
            observed_time: now,
            body: AttributeValue::String(message.to_string()),
            severity_number: 9,
            severity_text: String::new(),
            severity: SeverityLevel::Info,
            trace_id: None,
            span_id: None,
            trace_flags: 0,
            resource: Resource::default(),
            instrumentation_scope: InstrumentationScope::default(),
            attributes: Vec::new(),
            dropped_attributes_count: 0,
            received_at: now,
        })
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_noop() {
        let dispatcher = EventDispatcher::new(8);
        dispatcher.emit(&test_event("nobody listening"));
        assert_eq!(dispatcher.subscriber_count(), 0);
        assert_eq!(dispatcher.dropped_events(), 0);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_events() {
        let dispatcher = EventDispatcher::new(8);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        dispatcher.subscribe(Box::new(move |event| {
            tx_a.send(event).unwrap();
        }));
        dispatcher.subscribe(Box::new(move |event| {
            tx_b.send(event).unwrap();
        }));
        assert_eq!(dispatcher.subscriber_count(), 2);

        dispatcher.emit(&test_event("hello"));

        let received_a = tokio::time::timeout(Duration::from_secs(1), rx_a.recv())
            .await
            .unwrap()
            .unwrap();
        let received_b = tokio::time::timeout(Duration::from_secs(1), rx_b.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(received_a.signal, SignalType::Log);
        assert_eq!(received_b.signal, SignalType::Log);
    }

    #[tokio::test]
    async fn test_delivery_order_is_fifo_per_subscriber() {
        let dispatcher = EventDispatcher::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();

        dispatcher.subscribe(Box::new(move |event| {
            tx.send(event).unwrap();
        }));

        for i in 0..5 {
            dispatcher.emit(&test_event(&i.to_string()));
        }

        for i in 0..5 {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            let body = event.log.unwrap().body;
            assert_eq!(body, AttributeValue::String(i.to_string()));
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        // Current-thread runtime: the worker cannot drain until we yield, so
        // a capacity-1 queue overflows deterministically.
        let dispatcher = EventDispatcher::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        dispatcher.subscribe(Box::new(move |event| {
            tx.send(event).unwrap();
        }));

        dispatcher.emit(&test_event("kept"));
        dispatcher.emit(&test_event("dropped-1"));
        dispatcher.emit(&test_event("dropped-2"));

        assert_eq!(dispatcher.dropped_events(), 2);

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            received.log.unwrap().body,
            AttributeValue::String("kept".to_string())
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_affect_others() {
        let dispatcher = EventDispatcher::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();

        dispatcher.subscribe(Box::new(|_| {
            panic!("subscriber bug");
        }));
        dispatcher.subscribe(Box::new(move |event| {
            tx.send(event).unwrap();
        }));

        dispatcher.emit(&test_event("first"));
        dispatcher.emit(&test_event("second"));

        // The healthy subscriber sees both events despite the panicking one.
        for expected in ["first", "second"] {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                event.log.unwrap().body,
                AttributeValue::String(expected.to_string())
            );
        }
    }
}
