//! Translation between a resolved chain and a [`ChainSolver`].
//!
//! [`SolverBridge::rebuild`] describes the chain to the solver whenever the
//! chain changes. [`SolverBridge::tick`] runs once per frame: it pushes the
//! target, steps the solver and writes the resulting rotations back onto the
//! skeleton. [`SolverBridge::refresh_constraints`] is the single place that
//! consumes constraint change flags.

use std::f32::consts::PI;

use bevy::log::debug;
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

use lightik_chain::{BoneChain, ConstraintStore};
use lightik_core::traits::{ChainSolver, SkeletonProvider};

/// Owns a solver and keeps it in step with one chain.
#[derive(Debug, Clone, Default)]
pub struct SolverBridge<S> {
    solver: S,
    /// Local rotation of each joint bone when the chain was last rebuilt.
    rest_rotations: Vec<UnitQuaternion<f32>>,
    /// Per joint, the bone-frame rotation taking +Y onto the next bone.
    alignments: Vec<UnitQuaternion<f32>>,
}

impl<S: ChainSolver> SolverBridge<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            rest_rotations: Vec::new(),
            alignments: Vec::new(),
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Local rotations the solver deltas are applied on top of, one per joint.
    pub fn rest_rotations(&self) -> &[UnitQuaternion<f32>] {
        &self.rest_rotations
    }

    /// Describe `chain` to the solver from the skeleton's current pose.
    ///
    /// Segment `i` runs from chain bone `i` to chain bone `i + 1`. Its
    /// reference orientation is bone `i`'s skeleton-space rotation turned so
    /// that its +Y axis points at bone `i + 1`, whatever way the bone itself
    /// is authored. Only
    /// present constraints are pushed, the solver treats the rest as
    /// unconstrained. An empty chain leaves the solver untouched.
    pub fn rebuild(
        &mut self,
        skeleton: &impl SkeletonProvider,
        chain: &BoneChain,
        store: &ConstraintStore,
    ) {
        let bones = chain.bones();
        let Some(&root) = bones.first() else {
            return;
        };

        self.solver.reset();
        self.rest_rotations.clear();
        self.alignments.clear();
        self.solver
            .set_root_position(skeleton.bone_global_pose(root).translation.vector);

        for (joint, pair) in bones.windows(2).enumerate() {
            let parent = skeleton.bone_global_pose(pair[0]);
            let child = skeleton.bone_global_pose(pair[1]);
            let offset = parent.inverse_transform_vector(
                &(child.translation.vector - parent.translation.vector),
            );
            let alignment = segment_alignment(&offset);
            self.solver
                .add_segment(offset.norm(), parent.rotation * alignment);
            if store.get(joint).is_some() {
                self.solver
                    .set_constraint(joint, &store.solver_constraint(joint));
            }
            self.rest_rotations.push(skeleton.bone_pose_rotation(pair[0]));
            self.alignments.push(alignment);
        }

        self.solver.complete_chain();
        debug!(
            "rebuilt solver chain: {} bones, {} joints",
            chain.len(),
            chain.joint_count()
        );
    }

    /// Push every slot of `store` to the solver, empty slots as unconstrained.
    pub fn push_constraints(&mut self, store: &ConstraintStore) {
        for joint in 0..store.len() {
            self.solver
                .set_constraint(joint, &store.solver_constraint(joint));
        }
    }

    /// Run one frame.
    ///
    /// The target is moved into skeleton-local space (the skeleton origin
    /// when there is no target) and pushed. With `simulate` off every pose
    /// override is cleared and the solver is not stepped. Returns `true` when
    /// bone poses were written.
    pub fn tick(
        &mut self,
        skeleton: &mut impl SkeletonProvider,
        chain: &BoneChain,
        target_world: Option<&Isometry3<f32>>,
        simulate: bool,
    ) -> bool {
        if chain.is_empty() {
            return false;
        }

        let target = target_world.map_or_else(Vector3::zeros, |target| {
            skeleton
                .global_transform()
                .inverse_transform_point(&Point3::from(target.translation.vector))
                .coords
        });
        self.solver.set_target_position(target);

        if !simulate {
            skeleton.clear_pose_overrides();
            return false;
        }
        if !self.solver.update_chain_position() {
            return false;
        }

        // Deltas live in the aligned segment frame; conjugate back into the
        // bone's own frame.
        for (((&bone, rest), alignment), delta) in chain
            .bones()
            .iter()
            .zip(&self.rest_rotations)
            .zip(&self.alignments)
            .zip(self.solver.delta_rotations())
        {
            skeleton.set_bone_pose_rotation(bone, rest * alignment * delta * alignment.inverse());
        }
        true
    }

    /// Re-push every constraint that changed since the last call.
    ///
    /// Polls each slot exactly once. Returns `true` when anything changed
    /// and the visualization should be refreshed.
    pub fn refresh_constraints(&mut self, store: &mut ConstraintStore) -> bool {
        let changed = store.drain_changed();
        for &joint in &changed {
            self.solver
                .set_constraint(joint, &store.solver_constraint(joint));
        }
        if !changed.is_empty() {
            debug!("refreshed constraints for joints {changed:?}");
        }
        !changed.is_empty()
    }
}

/// Rotation taking +Y onto `offset`. A zero offset keeps +Y; a -Y offset
/// is a half turn about Z.
fn segment_alignment(offset: &Vector3<f32>) -> UnitQuaternion<f32> {
    if offset.norm() < f32::EPSILON {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(&Vector3::y(), offset)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
