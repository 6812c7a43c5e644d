//! Core types for phonebase
//!
//! This crate defines the shared vocabulary used by every other crate:
//! errors, store paths, the path-addressed JSON tree operations, document
//! ID generation, and device identity.
//!
//! Nothing here performs I/O except [`device::DeviceInfo::detect`], which
//! probes the local network interface.

pub mod device;
pub mod doc;
pub mod error;
pub mod path;
pub mod tree;

pub use device::DeviceInfo;
pub use doc::DocId;
pub use error::{Error, Result};
pub use path::{StorePath, PathParseError, MAX_PATH_DEPTH};
pub use tree::{delete_at_path, get_at_path, set_at_path};
