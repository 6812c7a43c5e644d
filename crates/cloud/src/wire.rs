//! Firestore REST typed-value encoding
//!
//! The Firestore REST API wraps every field in a single-key object naming
//! its type: `{"stringValue": "alice"}`, `{"integerValue": "42"}` (yes,
//! integers are strings on the wire), `{"timestampValue": "2024-..."}`.
//! Only the handful of types the registry documents use are modeled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;

/// A single Firestore field value
///
/// Serializes to/from the REST API's `{"<type>Value": ...}` shape.
///
/// # Examples
///
/// ```
/// use phonebase_cloud::FieldValue;
///
/// let v = FieldValue::String("alice".to_string());
/// let json = serde_json::to_value(&v).unwrap();
/// assert_eq!(json, serde_json::json!({"stringValue": "alice"}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// UTF-8 string
    #[serde(rename = "stringValue")]
    String(String),
    /// 64-bit integer, stringified on the wire
    #[serde(rename = "integerValue")]
    Integer(#[serde(with = "stringified_i64")] i64),
    /// 64-bit float
    #[serde(rename = "doubleValue")]
    Double(f64),
    /// Boolean
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    /// RFC 3339 timestamp
    #[serde(rename = "timestampValue")]
    Timestamp(DateTime<Utc>),
}

/// Firestore stringifies integerValue; (de)serialize through a String
mod stringified_i64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl FieldValue {
    /// String content, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp content, if this is a timestamp field
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

/// A Firestore document as returned by the REST API
///
/// `name` is the full resource path
/// (`projects/{p}/databases/(default)/documents/phones/{id}`); the last
/// path component is the document ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireDocument {
    /// Full resource name (absent on request bodies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Typed field map
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl WireDocument {
    /// Build a request document from fields
    pub fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        WireDocument { name: None, fields }
    }

    /// The document ID: last component of the resource name
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref()?.rsplit('/').next()
    }

    /// Read a string field leniently
    ///
    /// Missing or differently-typed fields yield `None`; callers decide
    /// their own fallbacks (the diagnostic tool prints `unknown`).
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.as_str()
    }

    /// Read a timestamp field leniently
    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.fields.get(field)?.as_timestamp()
    }
}

/// Response shape of `GET .../documents/{collection}`
///
/// Firestore omits `documents` entirely when the collection is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocumentsResponse {
    /// Documents in the collection
    #[serde(default)]
    pub documents: Vec<WireDocument>,
}

/// Deserialization helper for error bodies (best effort; the raw body is
/// kept when this shape doesn't match)
pub(crate) fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrBody {
        error: ErrInner,
    }
    #[derive(Deserialize)]
    struct ErrInner {
        message: String,
    }
    serde_json::from_str::<ErrBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Convenience: JSON object body `{"fields": {...}}` for write requests
pub(crate) fn fields_body(fields: &BTreeMap<String, FieldValue>) -> serde_json::Value {
    let mut map = Map::new();
    map.insert(
        "fields".to_string(),
        serde_json::to_value(fields).unwrap_or_default(),
    );
    serde_json::Value::Object(map)
}
