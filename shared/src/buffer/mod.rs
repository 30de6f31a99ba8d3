//! Thread-safe, bounded data structures for telemetry storage.
//!
//! The collector stores each signal type in a [`RingBuffer`] so memory stays
//! bounded regardless of arrival rate; once full, the oldest item is
//! overwritten on every push.

mod ring;

pub use ring::{RingBuffer, RingStats, DEFAULT_CAPACITY};
