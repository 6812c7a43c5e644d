//! Path-addressed operations on a JSON tree
//!
//! The document tree is a `serde_json::Value` whose interior nodes are all
//! objects (string-keyed mappings). A [`StorePath`] descends through those
//! mappings one segment at a time; leaves may be any JSON value, including
//! arrays, but paths never index into arrays.

use crate::error::{Error, Result};
use crate::path::StorePath;
use serde_json::Value;

/// Helper to get a JSON type name for error messages
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Get the value at a path within the tree
///
/// Returns `None` if any segment is absent or addresses into a non-object
/// value. The root path returns the entire tree.
///
/// # Examples
///
/// ```
/// use phonebase_core::{get_at_path, StorePath};
/// use serde_json::json;
///
/// let tree = json!({"users": {"42": {"name": "Alice"}}});
/// let path: StorePath = "users/42/name".parse().unwrap();
/// assert_eq!(get_at_path(&tree, &path), Some(&json!("Alice")));
///
/// let missing: StorePath = "users/99".parse().unwrap();
/// assert_eq!(get_at_path(&tree, &missing), None);
/// ```
pub fn get_at_path<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Get a mutable reference to the value at a path
///
/// Same traversal rules as [`get_at_path`]; does not create anything.
fn get_at_path_mut<'a>(root: &'a mut Value, path: &StorePath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Set the value at a path, creating intermediate mappings as needed
///
/// Setting at the root replaces the entire tree; the replacement must be
/// an object so the tree stays traversable. Setting below an existing
/// non-object value is a type-mismatch error rather than a silent
/// overwrite.
///
/// # Examples
///
/// ```
/// use phonebase_core::{get_at_path, set_at_path, StorePath};
/// use serde_json::json;
///
/// let mut tree = json!({});
/// let path: StorePath = "users/42/name".parse().unwrap();
/// set_at_path(&mut tree, &path, json!("Alice")).unwrap();
/// assert_eq!(get_at_path(&tree, &path), Some(&json!("Alice")));
/// ```
pub fn set_at_path(root: &mut Value, path: &StorePath, value: Value) -> Result<()> {
    if path.is_root() {
        if !value.is_object() {
            return Err(Error::TypeMismatch {
                path: path.clone(),
                expected: "object",
                found: value_type_name(&value),
            });
        }
        *root = value;
        return Ok(());
    }

    let segments = path.segments();
    let (parent_segments, last) = segments.split_at(segments.len() - 1);
    let last = &last[0];

    let mut current = root;
    let mut walked = StorePath::root();

    for segment in parent_segments {
        walked = walked.child(segment.clone());
        let found = value_type_name(current);
        let obj = current.as_object_mut().ok_or(Error::TypeMismatch {
            path: walked.clone(),
            expected: "object",
            found,
        })?;
        current = obj
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }

    let found = value_type_name(current);
    let obj = current.as_object_mut().ok_or(Error::TypeMismatch {
        path: path.parent().unwrap_or_default(),
        expected: "object",
        found,
    })?;
    obj.insert(last.clone(), value);
    Ok(())
}

/// Delete the value at a path
///
/// Returns whether the leaf existed. Missing intermediate segments (or
/// non-object intermediates) return `Ok(false)`. Deleting the root resets
/// the tree to an empty mapping and reports whether it held anything.
///
/// # Examples
///
/// ```
/// use phonebase_core::{delete_at_path, StorePath};
/// use serde_json::json;
///
/// let mut tree = json!({"a": {"b": 1}});
/// let path: StorePath = "a/b".parse().unwrap();
/// assert!(delete_at_path(&mut tree, &path).unwrap());
/// assert!(!delete_at_path(&mut tree, &path).unwrap());
/// ```
pub fn delete_at_path(root: &mut Value, path: &StorePath) -> Result<bool> {
    if path.is_root() {
        let had_data = root.as_object().map(|o| !o.is_empty()).unwrap_or(false);
        *root = Value::Object(serde_json::Map::new());
        return Ok(had_data);
    }

    let parent_path = path.parent().unwrap_or_default();
    let leaf = match path.leaf() {
        Some(leaf) => leaf,
        None => return Ok(false),
    };

    let parent = match get_at_path_mut(root, &parent_path) {
        Some(parent) => parent,
        None => return Ok(false),
    };

    match parent.as_object_mut() {
        Some(obj) => Ok(obj.remove(leaf).is_some()),
        None => Ok(false),
    }
}
