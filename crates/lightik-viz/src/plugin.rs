//! Gizmo drawing for helper geometry.
//!
//! [`LightIkVizPlugin`] owns the [`HelperDrawList`] resource and draws it
//! with Bevy gizmos every frame, after [`LightIkSet::Visualize`] has filled
//! it. Requires Bevy's gizmo plugin (part of `DefaultPlugins`).

use bevy::prelude::*;
use nalgebra::Point3;

use lightik_core::LightIkSet;

use crate::helper::{HelperKind, LineMode, Polyline};

/// Helper polylines to draw this frame, in world space.
#[derive(Resource, Debug, Default, Clone)]
pub struct HelperDrawList {
    pub lines: Vec<Polyline>,
}

impl HelperDrawList {
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn extend_from_slice(&mut self, lines: &[Polyline]) {
        self.lines.extend_from_slice(lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Bevy plugin that draws [`HelperDrawList`] with gizmos.
pub struct LightIkVizPlugin;

impl Plugin for LightIkVizPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HelperDrawList>()
            .add_systems(Update, draw_helpers_system.after(LightIkSet::Visualize));
    }
}

/// Color of each helper kind.
pub fn helper_color(kind: HelperKind) -> Color {
    match kind {
        HelperKind::RootMarker => Color::srgb(1.0, 0.13, 1.0),
        HelperKind::LimitArc(0) => Color::srgb(1.0, 0.0, 0.0),
        HelperKind::LimitArc(1) => Color::srgb(0.33, 1.0, 0.33),
        HelperKind::LimitArc(_) => Color::srgb(0.0, 0.0, 1.0),
        HelperKind::TipMarker => Color::srgb(0.13, 1.0, 0.13),
        HelperKind::TargetLine => Color::srgb(1.0, 0.67, 0.33),
    }
}

pub fn to_vec3(point: &Point3<f32>) -> Vec3 {
    Vec3::new(point.x, point.y, point.z)
}

fn draw_helpers_system(mut gizmos: Gizmos, draw_list: Res<HelperDrawList>) {
    for line in &draw_list.lines {
        let color = helper_color(line.kind);
        match line.mode {
            LineMode::Strip => gizmos.linestrip(line.points.iter().map(to_vec3), color),
            LineMode::Segments => {
                for pair in line.points.chunks_exact(2) {
                    gizmos.line(to_vec3(&pair[0]), to_vec3(&pair[1]), color);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
