//! Error types for rig loading and validation.

use std::path::PathBuf;

/// Errors that can occur while building a [`Rig`](crate::Rig).
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    /// Failed to read the rig file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse rig TOML content.
    #[error("rig parse error: {0}")]
    Parse(String),

    /// Two bones share a name.
    #[error("duplicate bone: {0}")]
    DuplicateBone(String),

    /// A bone names a parent that does not exist.
    #[error("bone {bone} references missing parent {parent}")]
    MissingParent { bone: String, parent: String },

    /// Following parents from this bone never reaches a root.
    #[error("parent cycle through bone {0}")]
    Cycle(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
