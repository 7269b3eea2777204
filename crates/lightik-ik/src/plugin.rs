//! Bevy ECS integration for IK-driven rigs.
//!
//! Provides [`LightIkPlugin`] which ticks every registered rig's modifier
//! each frame and publishes helper geometry for the gizmo layer.
//!
//! # Usage
//!
//! 1. Add [`LightIkCorePlugin`](lightik_core::LightIkCorePlugin) and
//!    [`LightIkPlugin`] to your app.
//! 2. Build an [`IkRigEntry`] from a [`Rig`] and select its chain.
//! 3. Register it with [`IkRigs::insert`] and point it at a target entity.
//!
//! Solving runs in [`LightIkSet::Solve`], publishing in
//! [`LightIkSet::Visualize`].

use std::collections::HashMap;

use bevy::prelude::*;
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};

use lightik_core::LightIkSet;
use lightik_core::config::LightIkConfig;
use lightik_core::types::RigId;
use lightik_rig::Rig;
use lightik_viz::{HelperDrawList, VisualHelper};

use crate::modifier::IkModifier;
use crate::solver::CcdSolver;

/// Modifier type driven by the plugin.
pub type RigModifier = IkModifier<CcdSolver, VisualHelper>;

/// Bevy plugin that adds IK solving each frame.
pub struct LightIkPlugin;

impl Plugin for LightIkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IkRigs>()
            .init_resource::<HelperDrawList>()
            .add_systems(Update, ik_modifier_system.in_set(LightIkSet::Solve))
            .add_systems(Update, publish_helpers_system.in_set(LightIkSet::Visualize));
    }
}

/// One skeleton with its modifier and target.
pub struct IkRigEntry {
    pub rig: Rig,
    pub modifier: RigModifier,
    /// Entity whose [`GlobalTransform`] is the IK target. `None` aims at the
    /// skeleton origin.
    pub target: Option<Entity>,
}

impl IkRigEntry {
    /// Wrap a rig with a modifier configured from `config`.
    pub fn new(rig: Rig, config: &LightIkConfig) -> Self {
        let modifier = IkModifier::with_visualizer(
            CcdSolver::new(config.solver.clone()),
            VisualHelper::new(config.helpers.clone()),
        )
        .with_config(&config.modifier);
        Self {
            rig,
            modifier,
            target: None,
        }
    }

    /// Select root and tip by name and resolve the chain. Returns whether a
    /// chain exists.
    pub fn select(&mut self, root: &str, tip: &str) -> bool {
        self.modifier.set_root_name(root);
        self.modifier.set_tip_name(tip);
        self.modifier.skeleton_ready(&self.rig)
    }

    #[must_use]
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }
}

/// Resource mapping [`RigId`] to IK rig data.
#[derive(Resource, Default)]
pub struct IkRigs {
    rigs: HashMap<RigId, IkRigEntry>,
}

impl IkRigs {
    pub fn insert(&mut self, id: RigId, entry: IkRigEntry) {
        self.rigs.insert(id, entry);
    }

    pub fn remove(&mut self, id: RigId) -> Option<IkRigEntry> {
        self.rigs.remove(&id)
    }

    pub fn get(&self, id: RigId) -> Option<&IkRigEntry> {
        self.rigs.get(&id)
    }

    pub fn get_mut(&mut self, id: RigId) -> Option<&mut IkRigEntry> {
        self.rigs.get_mut(&id)
    }

    /// Point a rig at a target entity.
    pub fn set_target(&mut self, id: RigId, target: Entity) {
        if let Some(entry) = self.rigs.get_mut(&id) {
            entry.target = Some(target);
        }
    }

    /// Aim a rig at its skeleton origin.
    pub fn clear_target(&mut self, id: RigId) {
        if let Some(entry) = self.rigs.get_mut(&id) {
            entry.target = None;
        }
    }

    pub fn len(&self) -> usize {
        self.rigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }
}

/// Convert a Bevy transform into a nalgebra isometry, dropping scale.
pub fn isometry_from_global(transform: &GlobalTransform) -> Isometry3<f32> {
    let (_, r, t) = transform.to_scale_rotation_translation();
    Isometry3::from_parts(
        Translation3::new(t.x, t.y, t.z),
        UnitQuaternion::from_quaternion(Quaternion::new(r.w, r.x, r.y, r.z)),
    )
}

/// System that runs one frame of every rig.
///
/// A target entity without a [`GlobalTransform`] counts as no target.
pub fn ik_modifier_system(mut rigs: ResMut<IkRigs>, targets: Query<&GlobalTransform>) {
    for entry in rigs.rigs.values_mut() {
        let target = entry
            .target
            .and_then(|e| targets.get(e).ok())
            .map(isometry_from_global);
        entry.modifier.process(&mut entry.rig, target);
    }
}

/// System that regenerates helper geometry and copies it into
/// [`HelperDrawList`].
pub fn publish_helpers_system(mut rigs: ResMut<IkRigs>, mut draw_list: ResMut<HelperDrawList>) {
    draw_list.clear();
    for entry in rigs.rigs.values_mut() {
        if !entry.modifier.show_helpers {
            continue;
        }
        entry.modifier.visualizer_mut().update();
        draw_list.extend_from_slice(entry.modifier.visualizer().geometry());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lightik_core::traits::SkeletonProvider;
    use lightik_test_utils::{chain_rig, test_app_with};

    fn build_test_app() -> App {
        test_app_with(LightIkPlugin)
    }

    fn insert_abc(app: &mut App, target: Option<Entity>) -> RigId {
        let config = app.world().resource::<LightIkConfig>().clone();
        let mut entry = IkRigEntry::new(chain_rig(&["A", "B", "C"]), &config);
        assert!(entry.select("A", "C"));
        entry.target = target;
        let id = RigId(0);
        app.world_mut().resource_mut::<IkRigs>().insert(id, entry);
        id
    }

    #[test]
    fn plugin_registers_resources() {
        let app = build_test_app();
        assert!(app.world().get_resource::<IkRigs>().is_some());
        assert!(app.world().get_resource::<HelperDrawList>().is_some());
    }

    #[test]
    fn rig_follows_target_entity() {
        let mut app = build_test_app();
        let target = app
            .world_mut()
            .spawn(GlobalTransform::from_translation(Vec3::new(1.0, 1.0, 0.0)))
            .id();
        let id = insert_abc(&mut app, Some(target));

        for _ in 0..30 {
            app.update();
        }

        let rigs = app.world().resource::<IkRigs>();
        let entry = rigs.get(id).unwrap();
        let tip = entry.rig.find_bone("C").unwrap();
        let reached = entry.rig.bone_global_pose(tip).translation.vector;
        assert!((reached - nalgebra::Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-2);
    }

    #[test]
    fn simulate_off_leaves_rest_pose() {
        let mut app = build_test_app();
        let target = app
            .world_mut()
            .spawn(GlobalTransform::from_translation(Vec3::new(1.0, 1.0, 0.0)))
            .id();
        let id = insert_abc(&mut app, Some(target));
        app.world_mut()
            .resource_mut::<IkRigs>()
            .get_mut(id)
            .unwrap()
            .modifier
            .simulate = false;

        app.update();
        let rigs = app.world().resource::<IkRigs>();
        let entry = rigs.get(id).unwrap();
        let tip = entry.rig.find_bone("C").unwrap();
        assert!((entry.rig.bone_global_pose(tip).translation.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn helpers_published_only_when_shown() {
        let mut app = build_test_app();
        let id = insert_abc(&mut app, None);
        app.update();
        assert!(app.world().resource::<HelperDrawList>().is_empty());

        app.world_mut()
            .resource_mut::<IkRigs>()
            .get_mut(id)
            .unwrap()
            .modifier
            .show_helpers = true;
        app.update();
        assert!(!app.world().resource::<HelperDrawList>().is_empty());
    }

    #[test]
    fn swapped_rig_without_chain_drops_helper_bones() {
        let config = LightIkConfig::default();
        let mut entry = IkRigEntry::new(chain_rig(&["A", "B", "C"]), &config);
        assert!(entry.select("A", "C"));
        assert_eq!(entry.modifier.visualizer().bones().len(), 3);

        entry.rig = chain_rig(&["C", "B", "A"]);
        assert!(!entry.modifier.skeleton_ready(&entry.rig));
        assert!(entry.modifier.visualizer().bones().is_empty());
    }

    #[test]
    fn global_transform_conversion_drops_scale() {
        let transform = GlobalTransform::from(
            Transform::from_xyz(1.0, 2.0, 3.0)
                .with_rotation(Quat::from_rotation_z(0.5))
                .with_scale(Vec3::splat(2.0)),
        );
        let iso = isometry_from_global(&transform);
        assert!((iso.translation.vector - nalgebra::Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-6);
        assert!((iso.rotation.angle() - 0.5).abs() < 1e-5);
    }
}
