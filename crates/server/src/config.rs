//! Server configuration
//!
//! Runtime settings come from the environment with sensible defaults; the
//! user profile (`config.json` in the data dir) persists the username
//! given on first connect so later runs don't need it again.

use phonebase_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Profile file name inside the data dir
pub const PROFILE_FILE: &str = "config.json";

/// Which persistence backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// One nested JSON tree in a single file
    #[default]
    Tree,
    /// One JSON file per top-level collection
    Collections,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tree" => Ok(BackendKind::Tree),
            "collections" => Ok(BackendKind::Collections),
            other => Err(format!("unknown backend '{}', expected tree|collections", other)),
        }
    }
}

/// Server runtime settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to bind
    pub port: u16,
    /// Directory holding the store files and profile
    pub data_dir: PathBuf,
    /// Heartbeat period
    pub heartbeat_period: Duration,
    /// Persistence backend
    pub backend: BackendKind,
}

impl ServerConfig {
    /// Load config from the environment, logging each default used
    pub fn load() -> Self {
        ServerConfig {
            port: try_load("PHONEBASE_PORT", "8080"),
            data_dir: env_or_else("PHONEBASE_DATA_DIR", default_data_dir),
            heartbeat_period: Duration::from_secs(try_load("PHONEBASE_HEARTBEAT_SECS", "30")),
            backend: try_load("PHONEBASE_BACKEND", "tree"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 8080,
            data_dir: default_data_dir(),
            heartbeat_period: Duration::from_secs(30),
            backend: BackendKind::Tree,
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| Path::new(&home).join(".phonebase"))
        .unwrap_or_else(|_| PathBuf::from(".phonebase"))
}

fn env_or_else(key: &str, default: fn() -> PathBuf) -> PathBuf {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => PathBuf::from(value),
        _ => default(),
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} value '{raw}': {e}, using default {default}");
            default
                .parse()
                .unwrap_or_else(|e| panic!("default for {key} misconfigured: {e}"))
        }
    }
}

/// Persisted user profile
///
/// Written on first `connect`, read on later runs so the username does
/// not need to be repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Registered username (email local part)
    pub username: String,
    /// When this profile was first created (RFC 3339)
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Profile {
    /// Create a fresh profile stamped with the current time
    pub fn new(username: impl Into<String>) -> Self {
        Profile {
            username: username.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Load the profile from the data dir, if one was saved
    ///
    /// An unreadable profile is treated as absent.
    pub fn load(data_dir: &Path) -> Option<Profile> {
        let raw = fs::read_to_string(data_dir.join(PROFILE_FILE)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "profile file unreadable, ignoring");
                None
            }
        }
    }

    /// Save the profile into the data dir
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let pretty = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(PROFILE_FILE), pretty)?;
        Ok(())
    }
}
