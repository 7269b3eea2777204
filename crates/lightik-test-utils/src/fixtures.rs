//! Ready-made rigs.

use lightik_rig::{BoneData, Origin, Rig, RigModel};

/// A straight chain: each name is the child of the previous one, and every
/// bone sits 1.0 above its parent along +Y.
///
/// Bone ids follow the order of `names`.
///
/// # Panics
///
/// Panics if `names` contains duplicates.
pub fn chain_rig(names: &[&str]) -> Rig {
    let mut model = RigModel::new("chain");
    for (i, name) in names.iter().enumerate() {
        let bone = if i == 0 {
            BoneData::new(*name)
        } else {
            BoneData::new(*name)
                .with_parent(names[i - 1])
                .with_rest(Origin::from_xyz(0.0, 1.0, 0.0))
        };
        model = model.with_bone(bone);
    }
    Rig::from_model(&model).expect("chain fixture must be a valid rig")
}

/// A small humanoid upper body with a branch at `spine`:
///
/// ```text
/// hips ─┬─ spine ─┬─ neck ── head
///       │         ├─ arm_l ── forearm_l ── hand_l
///       │         └─ arm_r ── forearm_r ── hand_r
///       └─ leg_l
/// ```
pub fn branching_rig() -> Rig {
    let bones = [
        ("hips", None, [0.0, 1.0, 0.0]),
        ("spine", Some("hips"), [0.0, 0.5, 0.0]),
        ("neck", Some("spine"), [0.0, 0.6, 0.0]),
        ("head", Some("neck"), [0.0, 0.2, 0.0]),
        ("arm_l", Some("spine"), [-0.2, 0.5, 0.0]),
        ("forearm_l", Some("arm_l"), [0.0, 0.3, 0.0]),
        ("hand_l", Some("forearm_l"), [0.0, 0.25, 0.0]),
        ("arm_r", Some("spine"), [0.2, 0.5, 0.0]),
        ("forearm_r", Some("arm_r"), [0.0, 0.3, 0.0]),
        ("hand_r", Some("forearm_r"), [0.0, 0.25, 0.0]),
        ("leg_l", Some("hips"), [-0.1, -0.5, 0.0]),
    ];

    let mut model = RigModel::new("humanoid");
    for (name, parent, [x, y, z]) in bones {
        let mut bone = BoneData::new(name).with_rest(Origin::from_xyz(x, y, z));
        if let Some(parent) = parent {
            bone = bone.with_parent(parent);
        }
        model = model.with_bone(bone);
    }
    Rig::from_model(&model).expect("branching fixture must be a valid rig")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lightik_core::traits::SkeletonProvider;
    use lightik_core::types::BoneId;

    #[test]
    fn chain_rig_is_linear() {
        let rig = chain_rig(&["A", "B", "C"]);
        assert_eq!(rig.bone_count(), 3);
        assert_eq!(rig.bone_parent(BoneId(2)), Some(BoneId(1)));
        assert!((rig.bone_global_pose(BoneId(2)).translation.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn branching_rig_branches_at_spine() {
        let rig = branching_rig();
        let spine = rig.find_bone("spine").unwrap();
        assert_eq!(rig.bone_children(spine).len(), 3);
        assert_eq!(rig.bone_count(), 11);
    }
}
