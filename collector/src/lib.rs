//! Lumen Collector
//!
//! This crate is the ingestion core of Lumen: an OTLP gRPC receiver that
//! converts incoming traces, metrics, and logs into the domain model, stores
//! each signal in a fixed-capacity ring buffer, and fans new items out to
//! subscribers without blocking the ingestion path.
//!
//! # Architecture
//!
//! - [`receiver`] - the three OTLP collector services and the server lifecycle
//! - [`dispatcher`] - bounded, non-blocking event fan-out
//! - [`app`] - the [`Collector`] facade consumed by an embedding shell
//! - [`config`] - environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use collector::{Collector, CollectorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let collector = Collector::new(CollectorConfig::default());
//!     let addr = collector.start().await?;
//!     println!("OTLP receiver on {addr}");
//!     collector.stop().await?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod receiver;

pub use app::Collector;
pub use config::CollectorConfig;
pub use dispatcher::{EventCallback, EventDispatcher};
pub use receiver::{CollectorError, OtlpReceiver, ReceiverStats};
