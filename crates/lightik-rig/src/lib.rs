//! Skeleton rigs for LightIK.
//!
//! Provides a declarative rig description ([`RigModel`]), TOML parsing, and
//! [`Rig`], an in-memory skeleton implementing
//! [`SkeletonProvider`](lightik_core::traits::SkeletonProvider) with rest
//! poses, rotation overrides and a world placement.

pub mod error;
pub mod parser;
pub mod skeleton;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::RigError;
pub use parser::{parse_file, parse_string};
pub use skeleton::Rig;
pub use types::{BoneData, Origin, RigModel};
