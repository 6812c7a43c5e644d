//! Persistence backends for the phonebase document store
//!
//! Two backends implement the same [`DocumentStore`] trait:
//!
//! - [`TreeStore`]: one nested JSON tree mirrored to a single `db.json`.
//!   Paths may be arbitrarily deep (up to the core depth limit).
//! - [`CollectionStore`]: flat collections of documents, one JSON file per
//!   collection. Paths are `collection` or `collection/id`.
//!
//! Both persist synchronously on every mutation by rewriting the affected
//! file whole. There is no journaling or atomic-replace discipline; a
//! crash mid-write can corrupt the file. That is the contract this store
//! ships with, not an accident.

mod collections;
mod tree_store;

pub use collections::CollectionStore;
pub use tree_store::TreeStore;

use phonebase_core::{DocId, Result, StorePath};
use serde_json::Value;

/// A path-addressed JSON document store
///
/// All methods persist synchronously before returning.
pub trait DocumentStore: Send + Sync {
    /// Value at path, or `None` if any segment is absent
    fn get(&self, path: &StorePath) -> Result<Option<Value>>;

    /// Assign the leaf at path, creating intermediate mappings as needed
    fn set(&self, path: &StorePath, value: Value) -> Result<()>;

    /// Create a document under `path` with a generated ID
    ///
    /// Returns the stamped document (with `id` and `createdAt`).
    fn create(&self, path: &StorePath, body: Value) -> Result<Value>;

    /// Shallow-merge a patch over the document at path
    ///
    /// Returns the updated document, or `None` if nothing exists at path.
    /// Read-modify-write runs under a single write lock: concurrent merges
    /// to the same document never lose each other's fields.
    fn merge(&self, path: &StorePath, patch: Value) -> Result<Option<Value>>;

    /// Remove the leaf at path; returns whether it existed
    fn delete(&self, path: &StorePath) -> Result<bool>;

    /// The entire data set
    fn snapshot(&self) -> Result<Value>;
}

/// Default create implementation shared by both backends
pub(crate) fn create_with_generated_id<S: DocumentStore + ?Sized>(
    store: &S,
    path: &StorePath,
    body: Value,
) -> Result<Value> {
    let id = DocId::generate();
    let doc = phonebase_core::doc::stamp_created(&id, body);
    let doc_path = path.child(id.to_string());
    store.set(&doc_path, doc.clone())?;
    Ok(doc)
}
