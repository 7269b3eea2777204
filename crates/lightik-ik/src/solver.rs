//! Cyclic Coordinate Descent (CCD) chain solver.
//!
//! Each segment extends along the local +Y axis of its reference
//! orientation; [`SolverBridge`](crate::bridge::SolverBridge) turns bone
//! rotations into such references. Every update step sweeps the joints
//! tip-to-root, rotating each one so the end effector swings toward the
//! target. Joint output is a delta rotation in the segment's local frame,
//! relative to the reference pose captured when the chain was described.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use lightik_core::config::SolverConfig;
use lightik_core::traits::ChainSolver;
use lightik_core::types::SolverConstraint;

/// Vectors shorter than this carry no usable direction.
const MIN_DIRECTION: f32 = 1e-6;

#[derive(Debug, Clone)]
struct Segment {
    length: f32,
    reference: UnitQuaternion<f32>,
    constraint: SolverConstraint,
}

/// CCD solver implementing [`ChainSolver`].
#[derive(Debug, Clone)]
pub struct CcdSolver {
    config: SolverConfig,
    root: Vector3<f32>,
    target: Vector3<f32>,
    segments: Vec<Segment>,
    /// Rotation of each segment relative to the previous segment's
    /// reference, the first one relative to the skeleton.
    rest_locals: Vec<UnitQuaternion<f32>>,
    deltas: Vec<UnitQuaternion<f32>>,
    complete: bool,
}

impl CcdSolver {
    /// Create a new solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            root: Vector3::zeros(),
            target: Vector3::zeros(),
            segments: Vec::new(),
            rest_locals: Vec::new(),
            deltas: Vec::new(),
            complete: false,
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of segments in the current chain description.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Joint positions under the current deltas, root first, end effector
    /// last. One more entry than there are segments.
    pub fn joint_positions(&self) -> Vec<Vector3<f32>> {
        let rotations = self.global_rotations();
        let mut positions = Vec::with_capacity(self.segments.len() + 1);
        let mut current = self.root;
        positions.push(current);
        for (segment, rotation) in self.segments.iter().zip(&rotations) {
            current += rotation * Vector3::new(0.0, segment.length, 0.0);
            positions.push(current);
        }
        positions
    }

    /// End effector position under the current deltas.
    pub fn end_effector(&self) -> Vector3<f32> {
        self.joint_positions().last().copied().unwrap_or(self.root)
    }

    /// Posed orientation of every segment.
    fn global_rotations(&self) -> Vec<UnitQuaternion<f32>> {
        let mut rotations = Vec::with_capacity(self.segments.len());
        let mut parent = UnitQuaternion::identity();
        for (rest, delta) in self.rest_locals.iter().zip(&self.deltas) {
            parent = parent * rest * delta;
            rotations.push(parent);
        }
        rotations
    }

    /// One tip-to-root sweep over every joint.
    fn sweep(&mut self) {
        for joint in (0..self.segments.len()).rev() {
            let positions = self.joint_positions();
            let Some(&end) = positions.last() else {
                return;
            };
            let pivot = positions[joint];
            let to_end = end - pivot;
            let to_target = self.target - pivot;
            if to_end.norm() < MIN_DIRECTION || to_target.norm() < MIN_DIRECTION {
                continue;
            }

            // atan2 keeps small angles precise where acos of the dot would not.
            let cross = to_end.cross(&to_target);
            let angle = cross.norm().atan2(to_end.dot(&to_target));
            let Some(axis) = Unit::try_new(cross, f32::EPSILON) else {
                continue;
            };
            let constraint = &self.segments[joint].constraint;
            let angle = angle * (1.0 - constraint.stiffness);
            if angle < f32::EPSILON {
                continue;
            }
            let swing = UnitQuaternion::from_axis_angle(&axis, angle);

            // Move the world-space swing into the joint's local frame.
            let base = self.joint_base(joint);
            let delta = base.inverse() * swing * base * self.deltas[joint];
            self.deltas[joint] = clamp_euler(&delta, constraint);
        }
    }

    fn distance_to_target(&self) -> f32 {
        (self.end_effector() - self.target).norm()
    }

    /// Orientation the joint's delta is applied on top of.
    fn joint_base(&self, joint: usize) -> UnitQuaternion<f32> {
        let parent = if joint == 0 {
            UnitQuaternion::identity()
        } else {
            self.global_rotations()[joint - 1]
        };
        parent * self.rest_locals[joint]
    }
}

impl Default for CcdSolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Clamp a rotation's roll/pitch/yaw into the constraint's range.
///
/// Rotations already inside the range are returned untouched so repeated
/// decomposition does not accumulate drift.
fn clamp_euler(
    rotation: &UnitQuaternion<f32>,
    constraint: &SolverConstraint,
) -> UnitQuaternion<f32> {
    let (roll, pitch, yaw) = rotation.euler_angles();
    let angles = Vector3::new(roll, pitch, yaw);
    let clamped = angles.zip_zip_map(&constraint.min_angle, &constraint.max_angle, |a, lo, hi| {
        a.max(lo.min(hi)).min(hi.max(lo))
    });
    if clamped == angles {
        return *rotation;
    }
    UnitQuaternion::from_euler_angles(clamped.x, clamped.y, clamped.z)
}

/// Angle between two rotations, precise near zero.
fn rotation_between_angle(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
    2.0 * (a.inverse() * b).imag().norm().min(1.0).asin()
}

impl ChainSolver for CcdSolver {
    fn reset(&mut self) {
        self.segments.clear();
        self.rest_locals.clear();
        self.deltas.clear();
        self.complete = false;
    }

    fn set_root_position(&mut self, position: Vector3<f32>) {
        self.root = position;
    }

    fn add_segment(&mut self, length: f32, reference: UnitQuaternion<f32>) {
        self.segments.push(Segment {
            length: length.max(0.0),
            reference,
            constraint: SolverConstraint::unconstrained(),
        });
        self.complete = false;
    }

    fn set_constraint(&mut self, joint: usize, constraint: &SolverConstraint) {
        if let Some(segment) = self.segments.get_mut(joint) {
            segment.constraint = *constraint;
        }
    }

    fn complete_chain(&mut self) {
        let mut parent = UnitQuaternion::identity();
        self.rest_locals = self
            .segments
            .iter()
            .map(|segment| {
                let local = parent.inverse() * segment.reference;
                parent = segment.reference;
                local
            })
            .collect();
        self.deltas = vec![UnitQuaternion::identity(); self.segments.len()];
        self.complete = true;
    }

    fn set_target_position(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    fn update_chain_position(&mut self) -> bool {
        if !self.complete || self.segments.is_empty() {
            return false;
        }

        let before = self.deltas.clone();
        for _ in 0..self.config.max_iterations {
            if self.distance_to_target() < self.config.tolerance {
                break;
            }
            self.sweep();
        }

        before
            .iter()
            .zip(&self.deltas)
            .any(|(old, new)| rotation_between_angle(old, new) > self.config.min_angle_step)
    }

    fn delta_rotations(&self) -> &[UnitQuaternion<f32>] {
        &self.deltas
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
