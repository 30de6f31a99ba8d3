//! Signal-agnostic building blocks: attributes, resources, and scopes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resource attribute key the service name is extracted from.
pub const SERVICE_NAME_KEY: &str = "service.name";

/// Fallback service name when a resource carries no `service.name`.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// The telemetry signal a stored item or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// A span belonging to a distributed trace.
    Trace,
    /// A metric with one or more data points.
    Metric,
    /// A log record.
    Log,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Metric => write!(f, "metric"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// A decoded attribute value.
///
/// This is the explicit tagged form of the OTLP `AnyValue` union. Arrays and
/// key/value lists nest arbitrarily through the same type; byte values are
/// decoded to lowercase hex strings and tagged [`AttributeType::Bytes`] on
/// the surrounding [`Attribute`]. Serialization is untagged, so JSON output
/// is a plain scalar, array, or object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// No value was present on the wire.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit integer value.
    Int(i64),
    /// A double-precision value.
    Double(f64),
    /// A string value (also used for hex-encoded bytes).
    String(String),
    /// A nested list of values.
    Array(Vec<AttributeValue>),
    /// A nested map of keyed values.
    KvList(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the string content if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether no value was present on the wire.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Which wire variant an [`AttributeValue`] was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// String value.
    String,
    /// Integer value.
    Int,
    /// Double value.
    Double,
    /// Boolean value.
    Bool,
    /// Array of nested values.
    Array,
    /// Keyed list of nested values.
    Kvlist,
    /// Byte string, stored as lowercase hex.
    Bytes,
    /// The wire value was absent.
    Null,
}

/// A single key/value attribute with its wire type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key.
    pub key: String,
    /// Decoded value.
    pub value: AttributeValue,
    /// Wire variant the value was decoded from.
    #[serde(rename = "type")]
    pub value_type: AttributeType,
}

/// The entity that produced a piece of telemetry.
///
/// Immutable once constructed; `service_name` is derived from the
/// `service.name` attribute at construction time so consumers never rescan
/// the attribute list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource attributes as they appeared on the wire.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Derived service name, `"unknown"` when absent.
    pub service_name: String,
}

impl Resource {
    /// Builds a resource, extracting the service name from its attributes.
    ///
    /// The first `service.name` attribute with a string value wins; absence
    /// (or a non-string value) yields [`UNKNOWN_SERVICE`].
    #[must_use]
    pub fn from_attributes(attributes: Vec<Attribute>) -> Self {
        let service_name = attributes
            .iter()
            .find(|attr| attr.key == SERVICE_NAME_KEY)
            .and_then(|attr| attr.value.as_str())
            .unwrap_or(UNKNOWN_SERVICE)
            .to_string();

        Self {
            attributes,
            service_name,
        }
    }
}

impl Default for Resource {
    fn default() -> Self {
        Self::from_attributes(Vec::new())
    }
}

/// The instrumentation library that produced a signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationScope {
    /// Library name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Library version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Scope attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}
