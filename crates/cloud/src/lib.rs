//! Cloud registry client for phonebase
//!
//! Devices announce themselves in a shared Firestore collection so a
//! dashboard can list them: register once at startup, then PATCH a
//! `lastSeen` heartbeat on an interval. Everything speaks the Firestore
//! REST API's typed-value JSON encoding; see [`wire`].
//!
//! All calls are best-effort from the caller's point of view: the server
//! keeps running whether or not the registry is reachable.

pub mod heartbeat;
pub mod registry;
pub mod wire;

pub use heartbeat::spawn_heartbeat;
pub use registry::{PhoneRecord, RegisteredPhone, RegistryClient, RegistryConfig};
pub use wire::{FieldValue, WireDocument};
