//! Lumen Shared Library
//!
//! This crate contains the telemetry domain model, the bounded ring buffer,
//! and the OTLP wire-format conversions used across the Lumen collector.
//!
//! # Modules
//!
//! - [`models`] - Domain types for spans, metrics, and log records
//! - [`buffer`] - Generic fixed-capacity circular buffer
//! - [`otlp`] - OTLP protobuf types and conversions into the domain model
//! - [`ids`] - Identity generation for converted telemetry items
//!
//! # Example
//!
//! ```
//! use shared::buffer::RingBuffer;
//!
//! let buffer = RingBuffer::new(3);
//! for n in 1..=5 {
//!     buffer.push(n);
//! }
//!
//! assert_eq!(buffer.get_all(), vec![3, 4, 5]);
//! assert!(buffer.is_full());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod ids;
pub mod models;
pub mod otlp;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
