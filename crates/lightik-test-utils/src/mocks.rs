//! Recording implementations of the collaborator traits.
//!
//! Both mocks remember every call so tests can assert on exactly what the
//! IK pipeline asked of its solver and visualizer.

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

use lightik_core::traits::{ChainSolver, ChainVisualizer};
use lightik_core::types::{JointLimits, SolverConstraint};

// ---------------------------------------------------------------------------
// RecordingSolver
// ---------------------------------------------------------------------------

/// One call received by a [`RecordingSolver`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolverCall {
    Reset,
    SetRootPosition(Vector3<f32>),
    AddSegment {
        length: f32,
        reference: UnitQuaternion<f32>,
    },
    SetConstraint {
        joint: usize,
        constraint: SolverConstraint,
    },
    CompleteChain,
    SetTargetPosition(Vector3<f32>),
    Update,
}

/// A solver that records calls and reports a scripted result.
///
/// By default every update reports "no change". [`changing`](Self::changing)
/// makes every update report a change with the same delta on each joint.
#[derive(Debug, Clone, Default)]
pub struct RecordingSolver {
    pub calls: Vec<SolverCall>,
    report_change: bool,
    delta: UnitQuaternion<f32>,
    deltas: Vec<UnitQuaternion<f32>>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a change on every update, with `delta` on every joint.
    pub fn changing(delta: UnitQuaternion<f32>) -> Self {
        Self {
            report_change: true,
            delta,
            ..Self::default()
        }
    }

    /// Forget recorded calls, keeping the chain description.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of segments in the current description.
    pub fn segment_count(&self) -> usize {
        self.deltas.len()
    }

    /// Joints whose constraint was pushed, in call order.
    pub fn constraint_pushes(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SolverCall::SetConstraint { joint, .. } => Some(*joint),
                _ => None,
            })
            .collect()
    }

    /// Last constraint pushed for `joint`.
    pub fn last_constraint(&self, joint: usize) -> Option<SolverConstraint> {
        self.calls.iter().rev().find_map(|c| match c {
            SolverCall::SetConstraint {
                joint: j,
                constraint,
            } if *j == joint => Some(*constraint),
            _ => None,
        })
    }

    /// Last target pushed.
    pub fn last_target(&self) -> Option<Vector3<f32>> {
        self.calls.iter().rev().find_map(|c| match c {
            SolverCall::SetTargetPosition(t) => Some(*t),
            _ => None,
        })
    }

    /// Number of calls matching `call` exactly.
    pub fn count(&self, call: &SolverCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Number of update steps run.
    pub fn updates(&self) -> usize {
        self.count(&SolverCall::Update)
    }
}

impl ChainSolver for RecordingSolver {
    fn reset(&mut self) {
        self.deltas.clear();
        self.calls.push(SolverCall::Reset);
    }

    fn set_root_position(&mut self, position: Vector3<f32>) {
        self.calls.push(SolverCall::SetRootPosition(position));
    }

    fn add_segment(&mut self, length: f32, reference: UnitQuaternion<f32>) {
        self.deltas.push(self.delta);
        self.calls.push(SolverCall::AddSegment { length, reference });
    }

    fn set_constraint(&mut self, joint: usize, constraint: &SolverConstraint) {
        self.calls.push(SolverCall::SetConstraint {
            joint,
            constraint: *constraint,
        });
    }

    fn complete_chain(&mut self) {
        self.calls.push(SolverCall::CompleteChain);
    }

    fn set_target_position(&mut self, target: Vector3<f32>) {
        self.calls.push(SolverCall::SetTargetPosition(target));
    }

    fn update_chain_position(&mut self) -> bool {
        self.calls.push(SolverCall::Update);
        self.report_change
    }

    fn delta_rotations(&self) -> &[UnitQuaternion<f32>] {
        &self.deltas
    }
}

// ---------------------------------------------------------------------------
// RecordingVisualizer
// ---------------------------------------------------------------------------

/// A visualizer that keeps every snapshot it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingVisualizer {
    pub constraint_snapshots: Vec<(Vec<Option<JointLimits>>, Vec<Isometry3<f32>>)>,
    pub target_snapshots: Vec<(Isometry3<f32>, Isometry3<f32>)>,
}

impl RecordingVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraint slots of the most recent snapshot.
    pub fn last_constraints(&self) -> Option<&[Option<JointLimits>]> {
        self.constraint_snapshots.last().map(|(c, _)| c.as_slice())
    }

    /// Bone poses of the most recent snapshot.
    pub fn last_bone_poses(&self) -> Option<&[Isometry3<f32>]> {
        self.constraint_snapshots.last().map(|(_, p)| p.as_slice())
    }
}

impl ChainVisualizer for RecordingVisualizer {
    fn set_constraints_snapshot(
        &mut self,
        constraints: &[Option<JointLimits>],
        bone_poses: &[Isometry3<f32>],
    ) {
        self.constraint_snapshots
            .push((constraints.to_vec(), bone_poses.to_vec()));
    }

    fn set_target_snapshot(&mut self, skeleton: &Isometry3<f32>, target: &Isometry3<f32>) {
        self.target_snapshots.push((*skeleton, *target));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_defaults_to_no_change() {
        let mut solver = RecordingSolver::new();
        solver.reset();
        solver.add_segment(1.0, UnitQuaternion::identity());
        solver.complete_chain();
        assert!(!solver.update_chain_position());
        assert_eq!(solver.updates(), 1);
        assert_eq!(solver.delta_rotations().len(), 1);
    }

    #[test]
    fn changing_solver_reports_scripted_delta() {
        let delta = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3);
        let mut solver = RecordingSolver::changing(delta);
        solver.add_segment(1.0, UnitQuaternion::identity());
        solver.add_segment(1.0, UnitQuaternion::identity());
        assert!(solver.update_chain_position());
        assert_eq!(solver.delta_rotations(), &[delta, delta]);
    }

    #[test]
    fn reset_drops_segments() {
        let mut solver = RecordingSolver::new();
        solver.add_segment(1.0, UnitQuaternion::identity());
        solver.reset();
        assert_eq!(solver.segment_count(), 0);
    }

    #[test]
    fn constraint_pushes_are_recorded_in_order() {
        let mut solver = RecordingSolver::new();
        solver.set_constraint(1, &SolverConstraint::unconstrained());
        solver.set_constraint(0, &SolverConstraint::unconstrained());
        assert_eq!(solver.constraint_pushes(), vec![1, 0]);
        assert!(solver.last_constraint(0).is_some());
        assert!(solver.last_constraint(2).is_none());
    }

    #[test]
    fn visualizer_records_snapshots() {
        let mut viz = RecordingVisualizer::new();
        viz.set_constraints_snapshot(&[None], &[Isometry3::identity(), Isometry3::identity()]);
        viz.set_target_snapshot(&Isometry3::identity(), &Isometry3::identity());
        assert_eq!(viz.last_constraints(), Some(&[None][..]));
        assert_eq!(viz.last_bone_poses().map(<[_]>::len), Some(2));
        assert_eq!(viz.target_snapshots.len(), 1);
    }
}
