//! Flat collection backend: one JSON file per collection
//!
//! The top-level path segment names a collection, the second segment a
//! document ID. Each collection is an object of id → document, persisted
//! to its own `{collection}.json`, so a write only rewrites the file of
//! the collection it touched.
//!
//! Root paths: `get` returns the full snapshot and `delete` drops every
//! collection (and its file). Other root mutations are rejected, since
//! every document must live inside a named collection.

use crate::DocumentStore;
use parking_lot::RwLock;
use phonebase_core::doc::stamp_updated;
use phonebase_core::{Error, Result, StorePath};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum collection name length in bytes
pub const MAX_COLLECTION_NAME_BYTES: usize = 128;

/// Collection name validation errors
///
/// Collection names become file names, so the rules are stricter than for
/// tree path segments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionNameError {
    /// Name is empty
    #[error("collection name cannot be empty")]
    Empty,

    /// Name contains a path separator or NUL
    #[error("collection name cannot contain '/', '\\', or NUL")]
    InvalidCharacter,

    /// Name starts with a dot (hidden file / traversal ambiguity)
    #[error("collection name cannot start with '.'")]
    LeadingDot,

    /// Name exceeds maximum length
    #[error("collection name too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual name length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}

/// Validate a collection name for use as a file name
pub fn validate_collection_name(name: &str) -> std::result::Result<(), CollectionNameError> {
    if name.is_empty() {
        return Err(CollectionNameError::Empty);
    }
    if name.contains(['/', '\\', '\x00']) {
        return Err(CollectionNameError::InvalidCharacter);
    }
    if name.starts_with('.') {
        return Err(CollectionNameError::LeadingDot);
    }
    if name.len() > MAX_COLLECTION_NAME_BYTES {
        return Err(CollectionNameError::TooLong {
            actual: name.len(),
            max: MAX_COLLECTION_NAME_BYTES,
        });
    }
    Ok(())
}

/// Flat document store with one file per collection
pub struct CollectionStore {
    dir: PathBuf,
    collections: RwLock<HashMap<String, Map<String, Value>>>,
}

impl CollectionStore {
    /// Open a store over the given data directory
    ///
    /// Loads every `*.json` file in the directory as a collection.
    /// Unreadable files are skipped with a warning, matching the lenient
    /// load of the tree backend.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut collections = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) if validate_collection_name(name).is_ok() => name.to_string(),
                _ => continue,
            };
            match fs::read_to_string(&path)
                .ok()
                .and_then(|s| serde_json::from_str::<Value>(&s).ok())
            {
                Some(Value::Object(docs)) => {
                    collections.insert(name, docs);
                }
                _ => {
                    warn!(file = %path.display(), "collection file unreadable, skipping");
                }
            }
        }

        debug!(dir = %dir.display(), count = collections.len(), "opened collection store");
        Ok(CollectionStore {
            dir,
            collections: RwLock::new(collections),
        })
    }

    fn file_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Rewrite one collection's backing file
    fn persist(&self, collection: &str, docs: &Map<String, Value>) -> Result<()> {
        let pretty = serde_json::to_string_pretty(&Value::Object(docs.clone()))?;
        fs::write(self.file_for(collection), pretty)?;
        Ok(())
    }

    /// Split a path into (collection, optional doc id)
    ///
    /// Paths deeper than `collection/id` are rejected: this backend is
    /// flat by design.
    fn split(&self, path: &StorePath) -> Result<(String, Option<String>)> {
        let segments = path.segments();
        if segments.len() > 2 {
            return Err(Error::InvalidOperation(format!(
                "collection store paths are at most 'collection/id', got '{}'",
                path
            )));
        }
        let collection = segments
            .first()
            .ok_or_else(|| Error::InvalidOperation("path must name a collection".to_string()))?;
        validate_collection_name(collection)
            .map_err(|e| Error::InvalidOperation(e.to_string()))?;
        Ok((collection.clone(), segments.get(1).cloned()))
    }
}

impl DocumentStore for CollectionStore {
    fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        if path.is_root() {
            return self.snapshot().map(Some);
        }
        let (collection, id) = self.split(path)?;
        let collections = self.collections.read();
        let docs = match collections.get(&collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        match id {
            Some(id) => Ok(docs.get(&id).cloned()),
            None => Ok(Some(Value::Object(docs.clone()))),
        }
    }

    fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        let (collection, id) = self.split(path)?;
        let id = id.ok_or_else(|| {
            Error::InvalidOperation("set requires a 'collection/id' path".to_string())
        })?;

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.clone()).or_default();
        docs.insert(id, value);
        self.persist(&collection, docs)
    }

    fn create(&self, path: &StorePath, body: Value) -> Result<Value> {
        // Validate before generating an ID so errors surface early
        let (_, id) = self.split(path)?;
        if id.is_some() {
            return Err(Error::InvalidOperation(
                "create targets a collection, not a document".to_string(),
            ));
        }
        crate::create_with_generated_id(self, path, body)
    }

    fn merge(&self, path: &StorePath, patch: Value) -> Result<Option<Value>> {
        let (collection, id) = self.split(path)?;
        let id = id.ok_or_else(|| {
            Error::InvalidOperation("merge targets a document, not a collection".to_string())
        })?;

        // Read-modify-write inside one write-lock critical section
        let mut collections = self.collections.write();
        let docs = match collections.get_mut(&collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        let existing = match docs.get(&id) {
            Some(doc) => doc.clone(),
            None => return Ok(None),
        };
        let updated = stamp_updated(existing, patch);
        docs.insert(id, updated.clone());
        self.persist(&collection, docs)?;
        Ok(Some(updated))
    }

    fn delete(&self, path: &StorePath) -> Result<bool> {
        // Root delete clears everything, like the tree backend
        if path.is_root() {
            let mut collections = self.collections.write();
            let existed = !collections.is_empty();
            for name in collections.keys() {
                let file = self.file_for(name);
                if let Err(e) = fs::remove_file(&file) {
                    warn!(file = %file.display(), error = %e, "failed to remove collection file");
                }
            }
            collections.clear();
            return Ok(existed);
        }

        let (collection, id) = self.split(path)?;
        let mut collections = self.collections.write();

        match id {
            Some(id) => {
                let docs = match collections.get_mut(&collection) {
                    Some(docs) => docs,
                    None => return Ok(false),
                };
                let existed = docs.remove(&id).is_some();
                if existed {
                    self.persist(&collection, docs)?;
                }
                Ok(existed)
            }
            None => {
                // Dropping a whole collection removes its file as well
                let existed = collections.remove(&collection).is_some();
                if existed {
                    let file = self.file_for(&collection);
                    if let Err(e) = fs::remove_file(&file) {
                        warn!(file = %file.display(), error = %e, "failed to remove collection file");
                    }
                }
                Ok(existed)
            }
        }
    }

    fn snapshot(&self) -> Result<Value> {
        let collections = self.collections.read();
        let mut out = Map::new();
        for (name, docs) in collections.iter() {
            out.insert(name.clone(), Value::Object(docs.clone()));
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn path(s: &str) -> StorePath {
        s.parse().unwrap()
    }

    // === Name validation ===

    #[test]
    fn test_valid_names() {
        assert!(validate_collection_name("notes").is_ok());
        assert!(validate_collection_name("user_data-2").is_ok());
    }

    #[test]
    fn test_invalid_empty_name() {
        assert_eq!(
            validate_collection_name(""),
            Err(CollectionNameError::Empty)
        );
    }

    #[test]
    fn test_invalid_separator() {
        assert_eq!(
            validate_collection_name("a\\b"),
            Err(CollectionNameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_invalid_leading_dot() {
        assert_eq!(
            validate_collection_name(".hidden"),
            Err(CollectionNameError::LeadingDot)
        );
    }

    #[test]
    fn test_invalid_too_long() {
        let name = "x".repeat(MAX_COLLECTION_NAME_BYTES + 1);
        assert!(matches!(
            validate_collection_name(&name),
            Err(CollectionNameError::TooLong { .. })
        ));
    }

    // === Store operations ===

    #[test]
    fn test_set_and_get_document() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("notes/1"), json!({"text": "hi"})).unwrap();
        assert_eq!(
            store.get(&path("notes/1")).unwrap(),
            Some(json!({"text": "hi"}))
        );
    }

    #[test]
    fn test_get_whole_collection() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("notes/1"), json!(1)).unwrap();
        store.set(&path("notes/2"), json!(2)).unwrap();
        assert_eq!(
            store.get(&path("notes")).unwrap(),
            Some(json!({"1": 1, "2": 2}))
        );
    }

    #[test]
    fn test_get_missing_collection() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&path("ghost")).unwrap(), None);
        assert_eq!(store.get(&path("ghost/1")).unwrap(), None);
    }

    #[test]
    fn test_deep_path_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert!(store.get(&path("a/b/c")).is_err());
        assert!(store.set(&path("a/b/c"), json!(1)).is_err());
    }

    #[test]
    fn test_set_requires_doc_id() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert!(store.set(&path("notes"), json!({})).is_err());
    }

    #[test]
    fn test_create_into_collection() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        let doc = store.create(&path("notes"), json!({"text": "hi"})).unwrap();
        let id = doc["id"].as_str().unwrap();
        assert_eq!(store.get(&path(&format!("notes/{}", id))).unwrap(), Some(doc.clone()));
    }

    #[test]
    fn test_create_into_document_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert!(store.create(&path("notes/42"), json!({})).is_err());
    }

    #[test]
    fn test_persistence_per_collection_file() {
        let dir = TempDir::new().unwrap();
        {
            let store = CollectionStore::open(dir.path()).unwrap();
            store.set(&path("notes/1"), json!("a")).unwrap();
            store.set(&path("tasks/1"), json!("b")).unwrap();
        }
        assert!(dir.path().join("notes.json").exists());
        assert!(dir.path().join("tasks.json").exists());

        let store = CollectionStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&path("notes/1")).unwrap(), Some(json!("a")));
        assert_eq!(store.get(&path("tasks/1")).unwrap(), Some(json!("b")));
    }

    #[test]
    fn test_delete_document() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("notes/1"), json!(1)).unwrap();
        assert!(store.delete(&path("notes/1")).unwrap());
        assert!(!store.delete(&path("notes/1")).unwrap());
    }

    #[test]
    fn test_delete_collection_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("notes/1"), json!(1)).unwrap();
        assert!(store.delete(&path("notes")).unwrap());
        assert!(!dir.path().join("notes.json").exists());
        assert_eq!(store.get(&path("notes")).unwrap(), None);
    }

    #[test]
    fn test_delete_root_drops_all_collections() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("notes/1"), json!(1)).unwrap();
        store.set(&path("tasks/1"), json!(2)).unwrap();

        assert!(store.delete(&StorePath::root()).unwrap());
        assert_eq!(store.snapshot().unwrap(), json!({}));
        assert!(!dir.path().join("notes.json").exists());
        assert!(!dir.path().join("tasks.json").exists());

        // Nothing left to delete
        assert!(!store.delete(&StorePath::root()).unwrap());
    }

    #[test]
    fn test_root_mutations_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert!(store.set(&StorePath::root(), json!({})).is_err());
        assert!(store.merge(&StorePath::root(), json!({})).is_err());
    }

    #[test]
    fn test_snapshot_groups_by_collection() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("a/1"), json!(1)).unwrap();
        store.set(&path("b/2"), json!(2)).unwrap();
        assert_eq!(
            store.snapshot().unwrap(),
            json!({"a": {"1": 1}, "b": {"2": 2}})
        );
    }

    #[test]
    fn test_merge_document() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        store.set(&path("n/1"), json!({"a": 1})).unwrap();
        let updated = store.merge(&path("n/1"), json!({"b": 2})).unwrap().unwrap();
        assert_eq!(updated["a"], json!(1));
        assert_eq!(updated["b"], json!(2));
    }

    #[test]
    fn test_merge_collection_path_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert!(store.merge(&path("n"), json!({})).is_err());
    }

    #[test]
    fn test_unreadable_collection_file_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), b"{nope").unwrap();
        fs::write(dir.path().join("good.json"), b"{\"1\": true}").unwrap();
        let store = CollectionStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&path("bad")).unwrap(), None);
        assert_eq!(store.get(&path("good/1")).unwrap(), Some(json!(true)));
    }
}
