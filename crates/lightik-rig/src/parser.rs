//! Rig TOML parsing.
//!
//! ```toml
//! name = "arm"
//! transform = { xyz = [0.0, 0.0, 0.0] }
//!
//! [[bones]]
//! name = "shoulder"
//!
//! [[bones]]
//! name = "elbow"
//! parent = "shoulder"
//! rest = { xyz = [0.0, 1.0, 0.0] }
//! ```

use std::path::Path;

use crate::error::RigError;
use crate::types::RigModel;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a rig file from disk into a [`RigModel`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<RigModel, RigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| RigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a rig TOML string into a [`RigModel`].
pub fn parse_string(content: &str) -> Result<RigModel, RigError> {
    toml::from_str(content).map_err(|e| RigError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
