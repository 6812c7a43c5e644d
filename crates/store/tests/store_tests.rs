//! Behavior shared by both persistence backends
//!
//! Exercises each backend through the `DocumentStore` trait object, the
//! way the HTTP server holds it.

use phonebase_store::{CollectionStore, DocumentStore, TreeStore};
use serde_json::{json, Value};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn backends(dir: &TempDir) -> Vec<(&'static str, Arc<dyn DocumentStore>)> {
    let tree_dir = dir.path().join("tree");
    let coll_dir = dir.path().join("collections");
    vec![
        ("tree", Arc::new(TreeStore::open(&tree_dir).unwrap())),
        (
            "collections",
            Arc::new(CollectionStore::open(&coll_dir).unwrap()),
        ),
    ]
}

#[test]
fn set_get_delete_cycle() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        let path = "notes/1".parse().unwrap();
        store.set(&path, json!({"text": "hi"})).unwrap();
        assert_eq!(
            store.get(&path).unwrap(),
            Some(json!({"text": "hi"})),
            "backend {}",
            name
        );
        assert!(store.delete(&path).unwrap(), "backend {}", name);
        assert_eq!(store.get(&path).unwrap(), None, "backend {}", name);
        assert!(!store.delete(&path).unwrap(), "backend {}", name);
    }
}

#[test]
fn create_returns_stamped_document() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        let doc = store
            .create(&"notes".parse().unwrap(), json!({"text": "hello"}))
            .unwrap();
        assert!(doc["id"].is_string(), "backend {}", name);
        assert!(doc["createdAt"].is_string(), "backend {}", name);
        assert_eq!(doc["text"], json!("hello"), "backend {}", name);

        let id = doc["id"].as_str().unwrap();
        let doc_path = format!("notes/{}", id).parse().unwrap();
        assert_eq!(store.get(&doc_path).unwrap(), Some(doc), "backend {}", name);
    }
}

#[test]
fn merge_patches_and_stamps() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        let path = "notes/1".parse().unwrap();
        store.set(&path, json!({"a": 1, "b": 2})).unwrap();
        let updated = store.merge(&path, json!({"b": 9})).unwrap().unwrap();
        assert_eq!(updated["a"], json!(1), "backend {}", name);
        assert_eq!(updated["b"], json!(9), "backend {}", name);
        assert!(updated["updatedAt"].is_string(), "backend {}", name);

        // Merge against nothing reports not-found
        let missing = "notes/404".parse().unwrap();
        assert!(
            store.merge(&missing, json!({})).unwrap().is_none(),
            "backend {}",
            name
        );
    }
}

#[test]
fn snapshot_reflects_mutations() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        store.set(&"a/1".parse().unwrap(), json!("x")).unwrap();
        store.set(&"b/2".parse().unwrap(), json!("y")).unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap["a"]["1"], json!("x"), "backend {}", name);
        assert_eq!(snap["b"]["2"], json!("y"), "backend {}", name);
    }
}

#[test]
fn concurrent_merges_keep_all_fields() {
    const WRITERS: usize = 4;
    const ROUNDS: usize = 32;

    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        for round in 0..ROUNDS {
            let path: phonebase_core::StorePath =
                format!("docs/{}", round).parse().unwrap();
            store.set(&path, json!({})).unwrap();

            // All writers patch the same document at once, each with its
            // own key; every key must survive.
            let barrier = Arc::new(Barrier::new(WRITERS));
            let handles: Vec<_> = (0..WRITERS)
                .map(|writer| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    let path = path.clone();
                    thread::spawn(move || {
                        let mut patch = serde_json::Map::new();
                        patch.insert(format!("k{}", writer), json!(writer));
                        barrier.wait();
                        store.merge(&path, Value::Object(patch)).unwrap();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let doc = store.get(&path).unwrap().unwrap();
            for writer in 0..WRITERS {
                assert_eq!(
                    doc[format!("k{}", writer)],
                    json!(writer),
                    "backend {} round {} lost a concurrent merge",
                    name,
                    round
                );
            }
        }
    }
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let tree_dir = dir.path().join("tree");
    let coll_dir = dir.path().join("collections");

    {
        let tree = TreeStore::open(&tree_dir).unwrap();
        tree.set(&"deep/a/b".parse().unwrap(), json!(1)).unwrap();
        let coll = CollectionStore::open(&coll_dir).unwrap();
        coll.set(&"notes/1".parse().unwrap(), json!(2)).unwrap();
    }

    let tree = TreeStore::open(&tree_dir).unwrap();
    assert_eq!(tree.get(&"deep/a/b".parse().unwrap()).unwrap(), Some(json!(1)));
    let coll = CollectionStore::open(&coll_dir).unwrap();
    assert_eq!(coll.get(&"notes/1".parse().unwrap()).unwrap(), Some(json!(2)));
}
