// ABOUTME: Record and RecordCollection types shared by all pipeline stages
// ABOUTME: Handles attribute access and timestamp parsing from wire values

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One logical record: a flat attribute map plus an optional geometry value.
///
/// Attributes and geometry are kept as JSON so the pipeline is agnostic to
/// the layer schema; the stores own any format-specific conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub attributes: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl Record {
    pub fn new(attributes: serde_json::Map<String, Value>, geometry: Option<Value>) -> Self {
        Self {
            attributes,
            geometry,
        }
    }

    /// Look up an attribute by field name, tolerating case differences
    /// introduced by the staging round trip.
    pub fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field).or_else(|| {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        })
    }

    /// The record's identifier under the given field name, if present and
    /// non-empty.
    pub fn identifier(&self, id_field: &str) -> Option<&str> {
        self.attribute(id_field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// One layer's records at one point in time, with the field names that make
/// up its schema.
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    pub layer: String,
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(layer: impl Into<String>, fields: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            layer: layer.into(),
            fields,
            records,
        }
    }

    /// Whether the schema carries the given field, ignoring ASCII case.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.eq_ignore_ascii_case(field))
    }

    /// Find a record by identifier value (exact match).
    pub fn record_by_id(&self, id_field: &str, id: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.identifier(id_field) == Some(id))
    }
}

/// Parse a last-modified value from its wire representation.
///
/// Both stores use the same convention per layer, but the staging round trip
/// may turn an RFC 3339 string into epoch milliseconds, so both forms are
/// accepted.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
