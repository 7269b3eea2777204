//! Helper geometry for one IK chain.
//!
//! [`VisualHelper`] receives chain snapshots through [`ChainVisualizer`] and
//! turns them into polylines: a square marker on the root, one limit arc
//! per rotation axis on every joint, an arrow on the tip, and a dashed line
//! from the root toward the target. Geometry is regenerated only when a
//! snapshot actually changed something.

use std::f32::consts::PI;

use nalgebra::{Isometry3, Point3, Vector3};

use lightik_core::config::HelperConfig;
use lightik_core::traits::ChainVisualizer;
use lightik_core::types::JointLimits;

/// Unit square in the bone's XZ plane, scaled by the root radius.
const ROOT_MARKER: [[f32; 3]; 5] = [
    [1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
];

/// Two crossed triangles pointing along +Y, scaled by the root radius.
const TIP_MARKER: [[f32; 3]; 9] = [
    [0.0, 0.0, 0.0],
    [0.5, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [-0.5, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.5],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, -0.5],
    [0.0, 0.0, 0.0],
];

// ---------------------------------------------------------------------------
// Geometry types
// ---------------------------------------------------------------------------

/// What a polyline depicts; the draw layer picks colors from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    RootMarker,
    /// Limit arc around rotation axis 0 (X), 1 (Y) or 2 (Z).
    LimitArc(usize),
    TipMarker,
    TargetLine,
}

/// How consecutive points are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Every point joins the next.
    Strip,
    /// Points pair up into separate segments.
    Segments,
}

/// One drawable polyline, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub kind: HelperKind,
    pub mode: LineMode,
    pub points: Vec<Point3<f32>>,
}

/// A chain bone as the helper draws it. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneInfo {
    pub pose: Isometry3<f32>,
    pub min_angle: Vector3<f32>,
    pub max_angle: Vector3<f32>,
    pub stiffness: f32,
    pub constrained: bool,
}

impl BoneInfo {
    fn joint(pose: Isometry3<f32>, limits: Option<&JointLimits>) -> Self {
        match limits {
            Some(limits) => Self {
                pose,
                min_angle: limits.min_angle.map(f32::to_radians),
                max_angle: limits.max_angle.map(f32::to_radians),
                stiffness: limits.stiffness,
                constrained: true,
            },
            None => Self {
                pose,
                min_angle: Vector3::repeat(-PI),
                max_angle: Vector3::repeat(PI),
                stiffness: 0.0,
                constrained: false,
            },
        }
    }

    fn tip(pose: Isometry3<f32>) -> Self {
        Self {
            pose,
            min_angle: Vector3::zeros(),
            max_angle: Vector3::zeros(),
            stiffness: 0.0,
            constrained: false,
        }
    }
}

// ---------------------------------------------------------------------------
// VisualHelper
// ---------------------------------------------------------------------------

/// Debug geometry generator for one chain.
#[derive(Debug, Clone)]
pub struct VisualHelper {
    config: HelperConfig,
    /// One entry per joint, then the tip.
    bones: Vec<BoneInfo>,
    skeleton: Isometry3<f32>,
    target: Isometry3<f32>,
    geometry: Vec<Polyline>,
    update_required: bool,
}

impl Default for VisualHelper {
    fn default() -> Self {
        Self::new(HelperConfig::default())
    }
}

impl VisualHelper {
    pub fn new(config: HelperConfig) -> Self {
        Self {
            config,
            bones: Vec::new(),
            skeleton: Isometry3::identity(),
            target: Isometry3::identity(),
            geometry: Vec::new(),
            update_required: false,
        }
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Bones of the last accepted snapshot: one per joint, then the tip.
    pub fn bones(&self) -> &[BoneInfo] {
        &self.bones
    }

    /// Whether the next [`update`](Self::update) will regenerate geometry.
    pub fn update_required(&self) -> bool {
        self.update_required
    }

    /// Geometry from the last [`update`](Self::update).
    pub fn geometry(&self) -> &[Polyline] {
        &self.geometry
    }

    /// Regenerate geometry if a snapshot changed anything since the last
    /// call. Returns whether it did.
    pub fn update(&mut self) -> bool {
        if !self.update_required {
            return false;
        }
        self.update_required = false;
        self.geometry.clear();
        if self.bones.len() < 2 {
            return true;
        }

        self.add_root_marker();
        for joint in 0..self.bones.len() - 1 {
            self.add_limit_arcs(joint);
        }
        self.add_tip_marker();
        self.add_target_line();

        let placement = self.skeleton;
        for line in &mut self.geometry {
            for point in &mut line.points {
                *point = placement * *point;
            }
        }
        true
    }

    fn add_marker(&mut self, kind: HelperKind, vertices: &[[f32; 3]], pose: &Isometry3<f32>) {
        let scale = self.config.root_radius;
        let points = vertices
            .iter()
            .map(|&[x, y, z]| pose * Point3::new(x * scale, y * scale, z * scale))
            .collect();
        self.geometry.push(Polyline {
            kind,
            mode: LineMode::Strip,
            points,
        });
    }

    fn add_root_marker(&mut self) {
        let pose = self.bones[0].pose;
        self.add_marker(HelperKind::RootMarker, &ROOT_MARKER, &pose);
    }

    /// Tip position, oriented like the last joint's bone.
    fn add_tip_marker(&mut self) {
        let n = self.bones.len();
        let pose = Isometry3::from_parts(
            self.bones[n - 1].pose.translation,
            self.bones[n - 2].pose.rotation,
        );
        self.add_marker(HelperKind::TipMarker, &TIP_MARKER, &pose);
    }

    fn add_limit_arcs(&mut self, joint: usize) {
        let bone = self.bones[joint].clone();
        let count = self.config.points_per_marker.max(2);
        let radius = self.config.joint_radius;
        #[allow(clippy::cast_precision_loss)]
        let last = (count - 1) as f32;

        for axis in 0..3 {
            let (lo, hi) = (bone.min_angle[axis], bone.max_angle[axis]);
            let points = (0..count)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let t = i as f32 / last;
                    let angle = lo * t + hi * (1.0 - t);
                    let (sin, cos) = angle.sin_cos();
                    // The bone's +Y swept around the arc's axis.
                    let local = match axis {
                        0 => Point3::new(0.0, cos, sin),
                        1 => Point3::new(sin, 0.0, cos),
                        _ => Point3::new(-sin, cos, 0.0),
                    };
                    bone.pose * (local * radius)
                })
                .collect();
            self.geometry.push(Polyline {
                kind: HelperKind::LimitArc(axis),
                mode: LineMode::Strip,
                points,
            });
        }
    }

    /// Dashed line from the root toward the target, with a bounded number
    /// of dashes however far the target is.
    fn add_target_line(&mut self) {
        let start = self.bones[0].pose.translation.vector;
        let end = self
            .skeleton
            .inverse_transform_point(&Point3::from(self.target.translation.vector))
            .coords;
        let offset = end - start;
        let distance = offset.norm();
        if distance <= f32::EPSILON {
            return;
        }
        let direction = offset / distance;

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let steps = ((distance / self.config.dash_size + 1.0) as usize)
            .clamp(1, self.config.max_dashes.max(1));
        #[allow(clippy::cast_precision_loss)]
        let dash = distance / (steps as f32 - 0.5);

        let mut points = Vec::with_capacity(steps * 2);
        for i in 0..steps {
            #[allow(clippy::cast_precision_loss)]
            let from = dash * i as f32;
            points.push(Point3::from(start + direction * from));
            points.push(Point3::from(
                start + direction * (from + dash / 2.0).min(distance),
            ));
        }
        self.geometry.push(Polyline {
            kind: HelperKind::TargetLine,
            mode: LineMode::Segments,
            points,
        });
    }
}

impl ChainVisualizer for VisualHelper {
    /// Accepts the snapshot only when there is one constraint slot per
    /// joint; anything else clears the helper.
    fn set_constraints_snapshot(
        &mut self,
        constraints: &[Option<JointLimits>],
        bone_poses: &[Isometry3<f32>],
    ) {
        self.bones.clear();
        self.update_required = true;
        let Some(&tip) = bone_poses.last() else {
            return;
        };
        if constraints.is_empty() || constraints.len() != bone_poses.len() - 1 {
            return;
        }

        self.bones.extend(
            constraints
                .iter()
                .zip(bone_poses)
                .map(|(limits, &pose)| BoneInfo::joint(pose, limits.as_ref())),
        );
        self.bones.push(BoneInfo::tip(tip));
    }

    fn set_target_snapshot(&mut self, skeleton: &Isometry3<f32>, target: &Isometry3<f32>) {
        if self.skeleton != *skeleton || self.target != *target {
            self.update_required = true;
        }
        self.skeleton = *skeleton;
        self.target = *target;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[allow(clippy::cast_precision_loss)]
    fn poses(n: usize) -> Vec<Isometry3<f32>> {
        (0..n)
            .map(|i| Isometry3::translation(0.0, i as f32, 0.0))
            .collect()
    }

    fn count(helper: &VisualHelper, kind: HelperKind) -> usize {
        helper.geometry().iter().filter(|l| l.kind == kind).count()
    }

    #[test]
    fn snapshot_converts_degrees_and_adds_tip() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(
            &[Some(JointLimits::symmetric(90.0, 0.5)), None],
            &poses(3),
        );
        let bones = helper.bones();
        assert_eq!(bones.len(), 3);
        assert!(bones[0].constrained);
        assert_relative_eq!(bones[0].max_angle.x, PI / 2.0, epsilon = 1e-6);
        assert!(!bones[1].constrained);
        assert_relative_eq!(bones[1].min_angle.y, -PI);
        assert_relative_eq!(bones[2].pose.translation.y, 2.0);
    }

    #[test]
    fn mismatched_snapshot_clears_helper() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(&[None], &poses(2));
        assert_eq!(helper.bones().len(), 2);

        helper.set_constraints_snapshot(&[None, None], &poses(2));
        assert!(helper.bones().is_empty());
        assert!(helper.update());
        assert!(helper.geometry().is_empty());
    }

    #[test]
    fn geometry_has_every_marker() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(&[None, None], &poses(3));
        helper.set_target_snapshot(
            &Isometry3::identity(),
            &Isometry3::translation(3.0, 0.0, 0.0),
        );
        assert!(helper.update());

        assert_eq!(count(&helper, HelperKind::RootMarker), 1);
        assert_eq!(count(&helper, HelperKind::TipMarker), 1);
        assert_eq!(count(&helper, HelperKind::TargetLine), 1);
        for axis in 0..3 {
            assert_eq!(count(&helper, HelperKind::LimitArc(axis)), 2);
        }
        let arc = helper
            .geometry()
            .iter()
            .find(|l| l.kind == HelperKind::LimitArc(0))
            .unwrap();
        assert_eq!(arc.points.len(), helper.config().points_per_marker);
    }

    #[test]
    fn update_only_when_required() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(&[None], &poses(2));
        assert!(helper.update());
        assert!(!helper.update());

        let target = Isometry3::translation(1.0, 0.0, 0.0);
        helper.set_target_snapshot(&Isometry3::identity(), &target);
        assert!(helper.update());
        helper.set_target_snapshot(&Isometry3::identity(), &target);
        assert!(!helper.update_required());
    }

    #[test]
    fn target_line_dash_count_is_bounded() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(&[None], &poses(2));
        helper.set_target_snapshot(
            &Isometry3::identity(),
            &Isometry3::translation(1000.0, 0.0, 0.0),
        );
        helper.update();
        let line = helper
            .geometry()
            .iter()
            .find(|l| l.kind == HelperKind::TargetLine)
            .unwrap();
        assert_eq!(line.mode, LineMode::Segments);
        assert_eq!(line.points.len(), helper.config().max_dashes * 2);
        let far = line.points.iter().map(|p| p.x).fold(0.0_f32, f32::max);
        assert!(far <= 1000.0 + 1e-3);
    }

    #[test]
    fn geometry_follows_skeleton_placement() {
        let mut helper = VisualHelper::default();
        helper.set_constraints_snapshot(&[None], &poses(2));
        let placement = Isometry3::translation(0.0, 0.0, 10.0);
        helper.set_target_snapshot(&placement, &placement);
        helper.update();
        let root = &helper.geometry()[0];
        assert_eq!(root.kind, HelperKind::RootMarker);
        assert!(root.points.iter().all(|p| (p.z - 10.0).abs() <= 0.5 + 1e-6));
        // Target sits on the root, so there is no line.
        assert_eq!(count(&helper, HelperKind::TargetLine), 0);
    }
}
