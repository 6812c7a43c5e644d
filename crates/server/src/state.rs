//! Shared server state

use crate::config::{BackendKind, ServerConfig};
use phonebase_core::Result;
use phonebase_store::{CollectionStore, DocumentStore, TreeStore};
use std::sync::Arc;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// The document store backing the HTTP API
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Build state over an existing store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AppState { store }
    }

    /// Open the backend the config asks for
    pub fn open(config: &ServerConfig) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.backend {
            BackendKind::Tree => Arc::new(TreeStore::open(&config.data_dir)?),
            BackendKind::Collections => Arc::new(CollectionStore::open(&config.data_dir)?),
        };
        Ok(AppState { store })
    }
}
