use std::f32::consts::PI;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Index of a bone in a skeleton's bone table.
///
/// Only meaningful for the skeleton that produced it. "Unset" is expressed
/// as `Option<BoneId>::None` rather than a sentinel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(pub usize);

impl BoneId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bone#{}", self.0)
    }
}

/// Identifier of an IK-driven rig inside an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RigId(pub u32);

// ---------------------------------------------------------------------------
// Stiffness
// ---------------------------------------------------------------------------

/// Lower bound of the per-joint stiffness scalar.
pub const STIFFNESS_MIN: f32 = 0.0;
/// Upper bound of the per-joint stiffness scalar.
pub const STIFFNESS_MAX: f32 = 1.0;

/// Clamp a stiffness value into `[STIFFNESS_MIN, STIFFNESS_MAX]`.
///
/// NaN maps to `STIFFNESS_MIN` so a bad input never reaches the solver.
pub fn clamp_stiffness(value: f32) -> f32 {
    if value.is_nan() {
        return STIFFNESS_MIN;
    }
    value.clamp(STIFFNESS_MIN, STIFFNESS_MAX)
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Authored limits of one joint, in degrees.
///
/// This is the plain value carried by a constraint slot. Conversion to
/// radians only happens in [`SolverConstraint::from_limits`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Per-axis lower bound (degrees).
    #[serde(default)]
    pub min_angle: Vector3<f32>,
    /// Per-axis upper bound (degrees).
    #[serde(default)]
    pub max_angle: Vector3<f32>,
    /// Resistance to rotation, `0.0` = free, `1.0` = rigid.
    #[serde(default)]
    pub stiffness: f32,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            min_angle: Vector3::zeros(),
            max_angle: Vector3::zeros(),
            stiffness: STIFFNESS_MIN,
        }
    }
}

impl JointLimits {
    /// Symmetric limits of `degrees` on every axis.
    pub fn symmetric(degrees: f32, stiffness: f32) -> Self {
        Self {
            min_angle: Vector3::repeat(-degrees),
            max_angle: Vector3::repeat(degrees),
            stiffness: clamp_stiffness(stiffness),
        }
    }
}

// ---------------------------------------------------------------------------
// SolverConstraint
// ---------------------------------------------------------------------------

/// Solver-facing limits of one joint, in radians with clamped stiffness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConstraint {
    pub stiffness: f32,
    pub min_angle: Vector3<f32>,
    pub max_angle: Vector3<f32>,
}

impl SolverConstraint {
    /// Full ±180° range on every axis with zero stiffness.
    pub fn unconstrained() -> Self {
        Self {
            stiffness: STIFFNESS_MIN,
            min_angle: Vector3::repeat(-PI),
            max_angle: Vector3::repeat(PI),
        }
    }

    /// Convert authored limits (degrees) into solver units.
    pub fn from_limits(limits: &JointLimits) -> Self {
        Self {
            stiffness: clamp_stiffness(limits.stiffness),
            min_angle: limits.min_angle.map(f32::to_radians),
            max_angle: limits.max_angle.map(f32::to_radians),
        }
    }

    /// Convert an optional slot; an empty slot is unconstrained.
    pub fn from_slot(slot: Option<&JointLimits>) -> Self {
        slot.map_or_else(Self::unconstrained, Self::from_limits)
    }
}

impl Default for SolverConstraint {
    fn default() -> Self {
        Self::unconstrained()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bone_id_display() {
        assert_eq!(BoneId(7).to_string(), "bone#7");
        assert_eq!(BoneId(3).index(), 3);
    }

    #[test]
    fn clamp_stiffness_bounds() {
        assert_relative_eq!(clamp_stiffness(5.0), STIFFNESS_MAX);
        assert_relative_eq!(clamp_stiffness(-3.0), STIFFNESS_MIN);
        assert_relative_eq!(clamp_stiffness(0.25), 0.25);
        assert_relative_eq!(clamp_stiffness(f32::NAN), STIFFNESS_MIN);
    }

    #[test]
    fn unconstrained_is_full_range() {
        let c = SolverConstraint::unconstrained();
        assert_relative_eq!(c.stiffness, 0.0);
        assert_relative_eq!(c.min_angle.x, -PI);
        assert_relative_eq!(c.max_angle.z, PI);
        assert_eq!(SolverConstraint::from_slot(None), c);
    }

    #[test]
    fn from_limits_converts_degrees() {
        let limits = JointLimits {
            min_angle: Vector3::new(-90.0, -45.0, 0.0),
            max_angle: Vector3::new(90.0, 180.0, 30.0),
            stiffness: 0.5,
        };
        let c = SolverConstraint::from_limits(&limits);
        assert_relative_eq!(c.min_angle.x, -PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(c.min_angle.y, -PI / 4.0, epsilon = 1e-6);
        assert_relative_eq!(c.max_angle.y, PI, epsilon = 1e-6);
        assert_relative_eq!(c.max_angle.z, PI / 6.0, epsilon = 1e-6);
        assert_relative_eq!(c.stiffness, 0.5);
    }

    #[test]
    fn from_limits_clamps_out_of_range_stiffness() {
        let limits = JointLimits {
            stiffness: 4.0,
            ..JointLimits::default()
        };
        assert_relative_eq!(SolverConstraint::from_limits(&limits).stiffness, 1.0);
    }

    #[test]
    fn symmetric_limits() {
        let limits = JointLimits::symmetric(45.0, 2.0);
        assert_relative_eq!(limits.min_angle.y, -45.0);
        assert_relative_eq!(limits.max_angle.y, 45.0);
        assert_relative_eq!(limits.stiffness, 1.0);
    }

    #[test]
    fn joint_limits_from_toml() {
        let limits: JointLimits = toml::from_str(
            r"
            min_angle = [-10.0, -20.0, -30.0]
            max_angle = [10.0, 20.0, 30.0]
            stiffness = 0.3
            ",
        )
        .unwrap();
        assert_relative_eq!(limits.min_angle.z, -30.0);
        assert_relative_eq!(limits.max_angle.y, 20.0);
        assert_relative_eq!(limits.stiffness, 0.3);
    }
}
