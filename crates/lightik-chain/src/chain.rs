//! Bone chain resolved between a root and a tip bone.
//!
//! A [`BoneChain`] is the ordered path of bones from the root down to the
//! tip through direct parent-child links. An empty chain is the reset state:
//! no valid path currently exists.

use lightik_core::error::ChainError;
use lightik_core::traits::SkeletonProvider;
use lightik_core::types::BoneId;

/// Ordered bones from root (first) to tip (last).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneChain {
    bones: Vec<BoneId>,
}

impl BoneChain {
    /// Walk up from `tip` until `root` is reached.
    ///
    /// Fails with [`ChainError::Unselected`] without traversal when either
    /// endpoint is unset, and with [`ChainError::Disjoint`] when the walk runs
    /// out of parents before meeting `root`. No partial chain is returned.
    /// `root == tip` yields a single-bone chain.
    pub fn resolve(
        skeleton: &impl SkeletonProvider,
        root: Option<BoneId>,
        tip: Option<BoneId>,
    ) -> Result<Self, ChainError> {
        let (Some(root), Some(tip)) = (root, tip) else {
            return Err(ChainError::Unselected);
        };

        let mut bones = Vec::new();
        let mut current = Some(tip);
        while let Some(bone) = current {
            bones.push(bone);
            if bone == root {
                bones.reverse();
                return Ok(Self { bones });
            }
            // A malformed provider with a parent cycle must not spin forever.
            if bones.len() > skeleton.bone_count() {
                break;
            }
            current = skeleton.bone_parent(bone);
        }
        Err(ChainError::Disjoint { root, tip })
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Number of joints: one fewer than the bone count, never negative.
    pub fn joint_count(&self) -> usize {
        self.bones.len().saturating_sub(1)
    }

    /// Bones in root-to-tip order.
    pub fn bones(&self) -> &[BoneId] {
        &self.bones
    }

    pub fn root(&self) -> Option<BoneId> {
        self.bones.first().copied()
    }

    pub fn tip(&self) -> Option<BoneId> {
        self.bones.last().copied()
    }

    /// Reset to the empty chain.
    pub fn clear(&mut self) {
        self.bones.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lightik_test_utils::fixtures::{branching_rig, chain_rig};

    fn id(skeleton: &impl SkeletonProvider, name: &str) -> Option<BoneId> {
        skeleton.find_bone(name)
    }

    #[test]
    fn resolve_three_bone_chain() {
        let rig = chain_rig(&["A", "B", "C"]);
        let chain = BoneChain::resolve(&rig, id(&rig, "A"), id(&rig, "C")).unwrap();
        assert_eq!(chain.bones(), &[BoneId(0), BoneId(1), BoneId(2)]);
        assert_eq!(chain.root(), Some(BoneId(0)));
        assert_eq!(chain.tip(), Some(BoneId(2)));
        assert_eq!(chain.joint_count(), 2);
    }

    #[test]
    fn chain_is_parent_to_child_ordered() {
        let rig = branching_rig();
        let chain = BoneChain::resolve(&rig, id(&rig, "spine"), id(&rig, "hand_l")).unwrap();
        for pair in chain.bones().windows(2) {
            assert_eq!(rig.bone_parent(pair[1]), Some(pair[0]));
        }
    }

    #[test]
    fn chain_length_is_depth_difference_plus_one() {
        let rig = branching_rig();
        let depth = |bone: BoneId| {
            let mut d: usize = 0;
            let mut current = rig.bone_parent(bone);
            while let Some(p) = current {
                d += 1;
                current = rig.bone_parent(p);
            }
            d
        };
        let root = id(&rig, "hips").unwrap();
        let tip = id(&rig, "hand_r").unwrap();
        let chain = BoneChain::resolve(&rig, Some(root), Some(tip)).unwrap();
        assert_eq!(chain.len(), depth(tip) - depth(root) + 1);
    }

    #[test]
    fn root_equals_tip_is_single_bone() {
        let rig = chain_rig(&["A", "B"]);
        let chain = BoneChain::resolve(&rig, id(&rig, "B"), id(&rig, "B")).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.joint_count(), 0);
    }

    #[test]
    fn tip_outside_subtree_is_disjoint() {
        let rig = branching_rig();
        let root = id(&rig, "arm_l");
        let tip = id(&rig, "hand_r");
        let err = BoneChain::resolve(&rig, root, tip).unwrap_err();
        assert_eq!(
            err,
            ChainError::Disjoint {
                root: root.unwrap(),
                tip: tip.unwrap()
            }
        );
    }

    #[test]
    fn reversed_endpoints_are_disjoint() {
        let rig = chain_rig(&["A", "B", "C"]);
        assert!(BoneChain::resolve(&rig, id(&rig, "C"), id(&rig, "A")).is_err());
    }

    #[test]
    fn unset_endpoint_is_unselected() {
        let rig = chain_rig(&["A", "B"]);
        assert_eq!(
            BoneChain::resolve(&rig, None, id(&rig, "B")),
            Err(ChainError::Unselected)
        );
        assert_eq!(
            BoneChain::resolve(&rig, id(&rig, "A"), None),
            Err(ChainError::Unselected)
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let rig = branching_rig();
        let a = BoneChain::resolve(&rig, id(&rig, "hips"), id(&rig, "hand_l")).unwrap();
        let b = BoneChain::resolve(&rig, id(&rig, "hips"), id(&rig, "hand_l")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_chain_has_no_joints() {
        let mut chain = BoneChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.joint_count(), 0);
        assert_eq!(chain.root(), None);
        chain.clear();
        assert!(chain.is_empty());
    }
}
