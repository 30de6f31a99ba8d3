//! Collector configuration.
//!
//! Handles loading configuration from environment variables with the
//! defaults of the OTLP gRPC convention:
//! - `LUMEN_HOST`: address to bind (default: "0.0.0.0")
//! - `LUMEN_PORT`: OTLP gRPC port (default: 4317)
//! - `LUMEN_TRACE_CAPACITY`: trace ring buffer capacity (default: 1000)
//! - `LUMEN_METRIC_CAPACITY`: metric ring buffer capacity (default: 1000)
//! - `LUMEN_LOG_CAPACITY`: log ring buffer capacity (default: 1000)

use anyhow::Result;
use std::net::SocketAddr;

/// Default OTLP gRPC port.
pub const DEFAULT_PORT: u16 = 4317;

/// Default ring buffer capacity per signal type.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default depth of each subscriber's event queue.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;

/// Maximum accepted gRPC message size (16 MiB). Oversized messages are
/// rejected by the transport before they reach the converter.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Collector configuration.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// The host address to bind to.
    pub host: String,
    /// The OTLP gRPC port to listen on.
    pub port: u16,
    /// Trace ring buffer capacity.
    pub trace_capacity: usize,
    /// Metric ring buffer capacity.
    pub metric_capacity: usize,
    /// Log ring buffer capacity.
    pub log_capacity: usize,
    /// Depth of each subscriber's event queue.
    pub event_queue_capacity: usize,
    /// Maximum accepted gRPC message size in bytes.
    pub max_message_size: usize,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(std::env::var(name)
        .ok()
        .map(|value| value.parse::<T>())
        .transpose()?
        .unwrap_or(default))
}

impl CollectorConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed as its
    /// expected type.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("LUMEN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Self {
            host,
            port: parse_var("LUMEN_PORT", DEFAULT_PORT)?,
            trace_capacity: parse_var("LUMEN_TRACE_CAPACITY", DEFAULT_CAPACITY)?,
            metric_capacity: parse_var("LUMEN_METRIC_CAPACITY", DEFAULT_CAPACITY)?,
            log_capacity: parse_var("LUMEN_LOG_CAPACITY", DEFAULT_CAPACITY)?,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            max_message_size: MAX_MESSAGE_SIZE,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid
    /// socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            trace_capacity: DEFAULT_CAPACITY,
            metric_capacity: DEFAULT_CAPACITY,
            log_capacity: DEFAULT_CAPACITY,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}
