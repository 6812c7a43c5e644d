//! Store paths
//!
//! A [`StorePath`] addresses a location in the document tree using
//! slash-separated string segments, the same way a URL path does. Empty
//! segments are dropped during parsing, so `/a//b/` and `a/b` address the
//! same location, and the empty string (or `/`) is the root.
//!
//! ## Rules
//!
//! - Segments must not contain NUL bytes (\0)
//! - Paths must not exceed [`MAX_PATH_DEPTH`] segments
//!
//! Paths are key-only: the data model is nested string-keyed mappings, so
//! there is no array-index syntax.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum path depth in segments
///
/// Limits traversal depth to keep recursive operations and file layouts
/// bounded.
pub const MAX_PATH_DEPTH: usize = 64;

/// Path parsing/validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// A segment contains a NUL byte
    #[error("path segment contains NUL byte")]
    ContainsNul,

    /// Path exceeds maximum depth
    #[error("path depth {depth} exceeds maximum of {max} segments")]
    TooDeep {
        /// Actual number of segments
        depth: usize,
        /// Maximum allowed segments
        max: usize,
    },
}

/// A slash-separated path into the document tree
///
/// # Examples
///
/// ```
/// use phonebase_core::StorePath;
///
/// let path: StorePath = "/users/42/name".parse().unwrap();
/// assert_eq!(path.segments(), &["users", "42", "name"]);
/// assert_eq!(path.to_string(), "users/42/name");
///
/// let root: StorePath = "/".parse().unwrap();
/// assert!(root.is_root());
///
/// // Empty segments collapse
/// let collapsed: StorePath = "//a//b/".parse().unwrap();
/// assert_eq!(collapsed, "a/b".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root path (no segments)
    pub fn root() -> Self {
        StorePath {
            segments: Vec::new(),
        }
    }

    /// Build a path from pre-validated segments
    pub fn from_segments(segments: Vec<String>) -> Self {
        StorePath { segments }
    }

    /// The path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment, returning a new path
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        StorePath { segments }
    }

    /// The parent path (None if root)
    pub fn parent(&self) -> Option<StorePath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// The last segment (None if root)
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl FromStr for StorePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('\x00') {
            return Err(PathParseError::ContainsNul);
        }

        let segments: Vec<String> = s
            .split('/')
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect();

        if segments.len() > MAX_PATH_DEPTH {
            return Err(PathParseError::TooDeep {
                depth: segments.len(),
                max: MAX_PATH_DEPTH,
            });
        }

        Ok(StorePath { segments })
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
