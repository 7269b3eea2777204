use nalgebra::{Isometry3, UnitQuaternion, Vector3};

use crate::types::{BoneId, JointLimits, SolverConstraint};

// ---------------------------------------------------------------------------
// SkeletonProvider
// ---------------------------------------------------------------------------

/// Bone graph access and pose read/write for one skeleton.
///
/// Poses are expressed in skeleton-local space. Lookups with an index the
/// skeleton does not know return `None`, empty slices or identity poses.
pub trait SkeletonProvider {
    /// Number of bones in the skeleton's bone table.
    fn bone_count(&self) -> usize;

    /// Look a bone up by name.
    fn find_bone(&self, name: &str) -> Option<BoneId>;

    /// Name of a bone.
    fn bone_name(&self, bone: BoneId) -> Option<&str>;

    /// Parent of a bone, `None` for structural roots.
    fn bone_parent(&self, bone: BoneId) -> Option<BoneId>;

    /// Direct children of a bone, in skeleton order.
    fn bone_children(&self, bone: BoneId) -> &[BoneId];

    /// Pose of a bone relative to the skeleton origin.
    fn bone_global_pose(&self, bone: BoneId) -> Isometry3<f32>;

    /// Rotation of a bone relative to its parent.
    fn bone_pose_rotation(&self, bone: BoneId) -> UnitQuaternion<f32>;

    /// Override the rotation of a bone relative to its parent.
    fn set_bone_pose_rotation(&mut self, bone: BoneId, rotation: UnitQuaternion<f32>);

    /// Drop every pose override, returning all bones to their rest pose.
    fn clear_pose_overrides(&mut self);

    /// Placement of the skeleton in world space.
    fn global_transform(&self) -> Isometry3<f32>;

    /// All bone names in skeleton order.
    fn all_bone_names(&self) -> Vec<String> {
        (0..self.bone_count())
            .filter_map(|i| self.bone_name(BoneId(i)).map(str::to_owned))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ChainSolver
// ---------------------------------------------------------------------------

/// Call contract of an iterative chain IK solver.
///
/// A chain is described once with [`reset`](Self::reset),
/// [`set_root_position`](Self::set_root_position), one
/// [`add_segment`](Self::add_segment) per joint, optional
/// [`set_constraint`](Self::set_constraint) calls and finally
/// [`complete_chain`](Self::complete_chain). Every frame the target is
/// pushed and [`update_chain_position`](Self::update_chain_position) runs one
/// step; when it reports a change, [`delta_rotations`](Self::delta_rotations)
/// holds one rotation per joint, root first.
pub trait ChainSolver: Send + Sync + 'static {
    /// Forget the current chain description.
    fn reset(&mut self);

    /// Position of the first joint, skeleton-local.
    fn set_root_position(&mut self, position: Vector3<f32>);

    /// Append a segment of `length` whose rest orientation is `reference`.
    fn add_segment(&mut self, length: f32, reference: UnitQuaternion<f32>);

    /// Set or replace the limits of joint `joint`.
    fn set_constraint(&mut self, joint: usize, constraint: &SolverConstraint);

    /// Mark the chain description as complete.
    fn complete_chain(&mut self);

    /// Target point, skeleton-local.
    fn set_target_position(&mut self, target: Vector3<f32>);

    /// Run a single update step. Returns `true` if the pose changed.
    fn update_chain_position(&mut self) -> bool;

    /// Per-joint rotation deltas, root first. Length equals the joint count.
    fn delta_rotations(&self) -> &[UnitQuaternion<f32>];
}

// ---------------------------------------------------------------------------
// ChainVisualizer
// ---------------------------------------------------------------------------

/// Receiver of chain snapshots for debug drawing.
pub trait ChainVisualizer: Send + Sync + 'static {
    /// Constraint slots (one per joint) and global poses of every chain bone.
    fn set_constraints_snapshot(
        &mut self,
        constraints: &[Option<JointLimits>],
        bone_poses: &[Isometry3<f32>],
    );

    /// Skeleton placement and target placement, both in world space.
    fn set_target_snapshot(&mut self, skeleton: &Isometry3<f32>, target: &Isometry3<f32>);
}

/// Headless setups draw nothing.
impl ChainVisualizer for () {
    fn set_constraints_snapshot(&mut self, _: &[Option<JointLimits>], _: &[Isometry3<f32>]) {}

    fn set_target_snapshot(&mut self, _: &Isometry3<f32>, _: &Isometry3<f32>) {}
}
