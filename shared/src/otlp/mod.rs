//! OpenTelemetry Protocol (OTLP) support.
//!
//! Wire types come from the tonic bindings in the `opentelemetry-proto`
//! crate, re-exported here as [`proto`] so call sites read
//! `proto::trace::v1::Span`, `proto::collector::logs::v1::...`, and so on.
//! [`conversions`] maps those wire types into the domain model in
//! [`crate::models`].

pub mod conversions;

pub use opentelemetry_proto::tonic as proto;

pub use conversions::Converter;
