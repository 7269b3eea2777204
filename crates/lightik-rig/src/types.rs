//! Data types for an in-memory rig description.
//!
//! A [`RigModel`] is the declarative form (what a TOML file holds); a
//! [`Rig`](crate::Rig) is the validated, queryable skeleton built from it.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A 3D pose specified as position + roll-pitch-yaw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    /// Translation `[x, y, z]`.
    #[serde(default)]
    pub xyz: [f32; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    #[serde(default)]
    pub rpy: [f32; 3],
}

impl Origin {
    pub const fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            xyz: [x, y, z],
            rpy: [0.0; 3],
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(
            Translation3::new(self.xyz[0], self.xyz[1], self.xyz[2]),
            UnitQuaternion::from_euler_angles(self.rpy[0], self.rpy[1], self.rpy[2]),
        )
    }
}

// ---------------------------------------------------------------------------
// BoneData
// ---------------------------------------------------------------------------

/// One bone of a rig description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    /// Unique bone name.
    pub name: String,
    /// Parent bone name, `None` for a structural root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Rest pose relative to the parent (or the skeleton for roots).
    #[serde(default)]
    pub rest: Origin,
}

impl BoneData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            rest: Origin::default(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_rest(mut self, rest: Origin) -> Self {
        self.rest = rest;
        self
    }
}

// ---------------------------------------------------------------------------
// RigModel
// ---------------------------------------------------------------------------

/// Declarative description of a skeleton.
///
/// Bone order is preserved: it becomes the skeleton's native enumeration
/// order and the index of each [`BoneId`](lightik_core::types::BoneId).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigModel {
    /// Rig name.
    pub name: String,
    /// Placement of the skeleton in world space.
    #[serde(default)]
    pub transform: Origin,
    /// Bones in skeleton order.
    #[serde(default)]
    pub bones: Vec<BoneData>,
}

impl RigModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bone(mut self, bone: BoneData) -> Self {
        self.bones.push(bone);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Origin) -> Self {
        self.transform = transform;
        self
    }

    /// Get a bone description by name.
    pub fn bone(&self, name: &str) -> Option<&BoneData> {
        self.bones.iter().find(|b| b.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
