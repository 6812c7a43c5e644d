//! Whole-tree backend: one JSON file
//!
//! The entire data set is a single nested JSON object held in memory and
//! rewritten to `db.json` on every mutation.

use crate::DocumentStore;
use parking_lot::RwLock;
use phonebase_core::doc::stamp_updated;
use phonebase_core::{delete_at_path, get_at_path, set_at_path, Result, StorePath};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name for the backing tree
pub const DB_FILE: &str = "db.json";

/// Path-addressed store backed by a single JSON file
///
/// # Example
///
/// ```no_run
/// use phonebase_store::{DocumentStore, TreeStore};
/// use serde_json::json;
///
/// let store = TreeStore::open("/data/phonebase")?;
/// let path = "notes/today".parse()?;
/// store.set(&path, json!({"text": "buy milk"}))?;
/// assert!(store.get(&path)?.is_some());
/// # Ok::<(), phonebase_core::Error>(())
/// ```
pub struct TreeStore {
    file: PathBuf,
    tree: RwLock<Value>,
}

impl TreeStore {
    /// Open a store in the given data directory, creating it if needed
    ///
    /// A backing file that exists but fails to parse is treated as empty;
    /// the next mutation overwrites it. (The original deployment target is
    /// a phone that can lose power mid-write.)
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let file = data_dir.join(DB_FILE);

        let tree = match fs::read_to_string(&file) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(value) if value.is_object() => value,
                Ok(_) => {
                    warn!(file = %file.display(), "backing file is not a JSON object, starting empty");
                    Value::Object(serde_json::Map::new())
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "backing file unreadable, starting empty");
                    Value::Object(serde_json::Map::new())
                }
            },
            Err(_) => Value::Object(serde_json::Map::new()),
        };

        debug!(file = %file.display(), "opened tree store");
        Ok(TreeStore {
            file,
            tree: RwLock::new(tree),
        })
    }

    /// Rewrite the backing file from the in-memory tree
    ///
    /// Caller must hold the write lock. Whole-file rewrite, no atomic
    /// replace: a crash mid-write can corrupt the file.
    fn persist(&self, tree: &Value) -> Result<()> {
        let pretty = serde_json::to_string_pretty(tree)?;
        fs::write(&self.file, pretty)?;
        Ok(())
    }
}

impl DocumentStore for TreeStore {
    fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        let tree = self.tree.read();
        Ok(get_at_path(&tree, path).cloned())
    }

    fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        let mut tree = self.tree.write();
        set_at_path(&mut tree, path, value)?;
        self.persist(&tree)
    }

    fn create(&self, path: &StorePath, body: Value) -> Result<Value> {
        crate::create_with_generated_id(self, path, body)
    }

    fn merge(&self, path: &StorePath, patch: Value) -> Result<Option<Value>> {
        // Read-modify-write inside one write-lock critical section
        let mut tree = self.tree.write();
        let existing = match get_at_path(&tree, path) {
            Some(existing) => existing.clone(),
            None => return Ok(None),
        };
        let updated = stamp_updated(existing, patch);
        set_at_path(&mut tree, path, updated.clone())?;
        self.persist(&tree)?;
        Ok(Some(updated))
    }

    fn delete(&self, path: &StorePath) -> Result<bool> {
        let mut tree = self.tree.write();
        let existed = delete_at_path(&mut tree, path)?;
        if existed {
            self.persist(&tree)?;
        }
        Ok(existed)
    }

    fn snapshot(&self) -> Result<Value> {
        Ok(self.tree.read().clone())
    }
}
