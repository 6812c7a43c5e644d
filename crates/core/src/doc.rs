//! Document IDs and timestamp stamping
//!
//! Created documents get an ID derived from the current time plus a short
//! random suffix. This gives probabilistic, not guaranteed, uniqueness:
//! two creates in the same millisecond only collide if they also draw the
//! same suffix.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A generated document identifier
///
/// Format: `{unix millis}-{4 lowercase hex chars}`, e.g. `1723459200123-a41f`.
///
/// # Examples
///
/// ```
/// use phonebase_core::DocId;
///
/// let id = DocId::generate();
/// let (millis, suffix) = id.as_str().split_once('-').unwrap();
/// assert!(millis.parse::<i64>().is_ok());
/// assert_eq!(suffix.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Generate a new ID from the current time
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix: u16 = rand::thread_rng().gen();
        DocId(format!("{}-{:04x}", millis, suffix))
    }

    /// The ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId(s)
    }
}

/// Stamp a freshly created document
///
/// Merges `id` and an RFC 3339 `createdAt` into the body. Non-object
/// bodies are wrapped as `{"value": body}` first so the stamps have
/// somewhere to live.
pub fn stamp_created(id: &DocId, body: Value) -> Value {
    let mut obj = match body {
        Value::Object(obj) => obj,
        other => {
            let mut obj = serde_json::Map::new();
            obj.insert("value".to_string(), other);
            obj
        }
    };
    obj.insert("id".to_string(), Value::String(id.to_string()));
    obj.insert(
        "createdAt".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    Value::Object(obj)
}

/// Apply a shallow merge-update to an existing document
///
/// Patch keys overwrite existing keys; everything else is kept. Sets an
/// RFC 3339 `updatedAt`. A non-object patch replaces nothing and only
/// refreshes the timestamp.
pub fn stamp_updated(existing: Value, patch: Value) -> Value {
    let mut obj = match existing {
        Value::Object(obj) => obj,
        other => {
            let mut obj = serde_json::Map::new();
            obj.insert("value".to_string(), other);
            obj
        }
    };
    if let Value::Object(patch) = patch {
        for (key, value) in patch {
            obj.insert(key, value);
        }
    }
    obj.insert(
        "updatedAt".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_format() {
        let id = DocId::generate();
        let (millis, suffix) = id.as_str().split_once('-').expect("dash separator");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_ids_are_distinct() {
        // Probabilistic, but 100 draws colliding would mean a broken RNG
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| DocId::generate().to_string()).collect();
        assert!(ids.len() > 90);
    }

    #[test]
    fn test_id_display_round_trip() {
        let id = DocId::from("1723459200123-a41f".to_string());
        assert_eq!(id.to_string(), "1723459200123-a41f");
    }

    #[test]
    fn test_stamp_created_object_body() {
        let id = DocId::from("t-0001".to_string());
        let doc = stamp_created(&id, json!({"title": "note"}));
        assert_eq!(doc["id"], json!("t-0001"));
        assert_eq!(doc["title"], json!("note"));
        assert!(doc["createdAt"].is_string());
    }

    #[test]
    fn test_stamp_created_wraps_scalar_body() {
        let id = DocId::from("t-0002".to_string());
        let doc = stamp_created(&id, json!(42));
        assert_eq!(doc["value"], json!(42));
        assert_eq!(doc["id"], json!("t-0002"));
    }

    #[test]
    fn test_stamp_updated_merges_shallow() {
        let existing = json!({"a": 1, "b": 2, "createdAt": "x"});
        let updated = stamp_updated(existing, json!({"b": 3, "c": 4}));
        assert_eq!(updated["a"], json!(1));
        assert_eq!(updated["b"], json!(3));
        assert_eq!(updated["c"], json!(4));
        assert_eq!(updated["createdAt"], json!("x"));
        assert!(updated["updatedAt"].is_string());
    }

    #[test]
    fn test_stamp_updated_ignores_scalar_patch() {
        let updated = stamp_updated(json!({"a": 1}), json!("nope"));
        assert_eq!(updated["a"], json!(1));
        assert!(updated["updatedAt"].is_string());
    }
}
