//! Queryable skeleton built from a [`RigModel`].

use std::collections::HashMap;

use nalgebra::{Isometry3, UnitQuaternion};

use lightik_core::traits::SkeletonProvider;
use lightik_core::types::BoneId;

use crate::error::RigError;
use crate::types::RigModel;

#[derive(Debug, Clone)]
struct RigBone {
    name: String,
    parent: Option<BoneId>,
    children: Vec<BoneId>,
    rest: Isometry3<f32>,
}

/// Validated skeleton with rest poses and per-bone rotation overrides.
///
/// Global poses are composed on demand by walking the parent links, so an
/// override on one bone is immediately visible in every descendant.
#[derive(Debug, Clone)]
pub struct Rig {
    name: String,
    bones: Vec<RigBone>,
    by_name: HashMap<String, BoneId>,
    overrides: Vec<Option<UnitQuaternion<f32>>>,
    transform: Isometry3<f32>,
}

impl Rig {
    /// Build a rig, validating names and the parent graph.
    pub fn from_model(model: &RigModel) -> Result<Self, RigError> {
        let mut by_name = HashMap::with_capacity(model.bones.len());
        for (i, bone) in model.bones.iter().enumerate() {
            if by_name.insert(bone.name.clone(), BoneId(i)).is_some() {
                return Err(RigError::DuplicateBone(bone.name.clone()));
            }
        }

        let mut bones: Vec<RigBone> = model
            .bones
            .iter()
            .map(|b| RigBone {
                name: b.name.clone(),
                parent: None,
                children: Vec::new(),
                rest: b.rest.to_isometry(),
            })
            .collect();

        for (i, bone) in model.bones.iter().enumerate() {
            let Some(parent_name) = &bone.parent else {
                continue;
            };
            let parent = *by_name
                .get(parent_name)
                .ok_or_else(|| RigError::MissingParent {
                    bone: bone.name.clone(),
                    parent: parent_name.clone(),
                })?;
            bones[i].parent = Some(parent);
            bones[parent.0].children.push(BoneId(i));
        }

        // A walk longer than the bone count can only mean a cycle.
        for (i, bone) in bones.iter().enumerate() {
            let mut current = bone.parent;
            let mut steps = 0;
            while let Some(p) = current {
                steps += 1;
                if steps > bones.len() {
                    return Err(RigError::Cycle(bones[i].name.clone()));
                }
                current = bones[p.0].parent;
            }
        }

        Ok(Self {
            name: model.name.clone(),
            overrides: vec![None; bones.len()],
            bones,
            by_name,
            transform: model.transform.to_isometry(),
        })
    }

    /// Parse and build a rig from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, RigError> {
        Self::from_model(&crate::parser::parse_string(content)?)
    }

    /// Load and build a rig from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RigError> {
        Self::from_model(&crate::parser::parse_file(path)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move the skeleton in world space.
    pub fn set_global_transform(&mut self, transform: Isometry3<f32>) {
        self.transform = transform;
    }

    /// Whether a bone currently has a rotation override.
    pub fn has_override(&self, bone: BoneId) -> bool {
        self.overrides.get(bone.0).is_some_and(Option::is_some)
    }

    fn local_pose(&self, bone: BoneId) -> Isometry3<f32> {
        let Some(data) = self.bones.get(bone.0) else {
            return Isometry3::identity();
        };
        match self.overrides[bone.0] {
            Some(rotation) => Isometry3::from_parts(data.rest.translation, rotation),
            None => data.rest,
        }
    }
}

impl SkeletonProvider for Rig {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    fn bone_name(&self, bone: BoneId) -> Option<&str> {
        self.bones.get(bone.0).map(|b| b.name.as_str())
    }

    fn bone_parent(&self, bone: BoneId) -> Option<BoneId> {
        self.bones.get(bone.0).and_then(|b| b.parent)
    }

    fn bone_children(&self, bone: BoneId) -> &[BoneId] {
        self.bones
            .get(bone.0)
            .map(|b| b.children.as_slice())
            .unwrap_or_default()
    }

    fn bone_global_pose(&self, bone: BoneId) -> Isometry3<f32> {
        let mut pose = self.local_pose(bone);
        let mut current = self.bone_parent(bone);
        while let Some(parent) = current {
            pose = self.local_pose(parent) * pose;
            current = self.bone_parent(parent);
        }
        pose
    }

    fn bone_pose_rotation(&self, bone: BoneId) -> UnitQuaternion<f32> {
        self.local_pose(bone).rotation
    }

    fn set_bone_pose_rotation(&mut self, bone: BoneId, rotation: UnitQuaternion<f32>) {
        if let Some(slot) = self.overrides.get_mut(bone.0) {
            *slot = Some(rotation);
        }
    }

    fn clear_pose_overrides(&mut self) {
        self.overrides.fill(None);
    }

    fn global_transform(&self) -> Isometry3<f32> {
        self.transform
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
