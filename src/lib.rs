//! Phonebase - tiny personal document-store backend that runs on a phone
//!
//! Phonebase turns a device into a path-addressed JSON store with an HTTP
//! API, plus an optional cloud registry that lets a dashboard find the
//! device on the LAN.
//!
//! # Quick Start
//!
//! ```ignore
//! use phonebase::{AppState, ServerConfig, TreeStore};
//! use std::sync::Arc;
//!
//! let config = ServerConfig::load();
//! let store = Arc::new(TreeStore::open(&config.data_dir)?);
//!
//! phonebase::serve(&config, AppState::new(store)).await?;
//! ```
//!
//! # Architecture
//!
//! The store maps URL-style paths (`notes/2024/first`) onto a nested JSON
//! tree; [`DocumentStore`] is the seam between the HTTP layer and the two
//! persistence backends ([`TreeStore`], one file; [`CollectionStore`], one
//! file per top-level collection). The cloud side is a thin Firestore REST
//! client ([`RegistryClient`]) and a heartbeat task.

pub use phonebase_cloud::{
    spawn_heartbeat, PhoneRecord, RegisteredPhone, RegistryClient, RegistryConfig,
};
pub use phonebase_core::{DeviceInfo, DocId, Error, Result, StorePath};
pub use phonebase_server::{build_router, serve, AppState, BackendKind, Profile, ServerConfig};
pub use phonebase_store::{CollectionStore, DocumentStore, TreeStore};
