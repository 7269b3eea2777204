// lightik-core: Types, collaborator traits, config and errors for LightIK chains.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// LightIkSet
// ---------------------------------------------------------------------------

/// System ordering for the per-frame IK pipeline.
///
/// `Solve` pushes targets, runs the solver and writes poses back to the
/// skeleton. `Visualize` publishes helper geometry from the state `Solve`
/// left behind, so it always runs afterwards.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LightIkSet {
    Solve,
    Visualize,
}

// ---------------------------------------------------------------------------
// LightIkCorePlugin
// ---------------------------------------------------------------------------

/// Registers [`LightIkSet`] ordering and the default [`config::LightIkConfig`].
pub struct LightIkCorePlugin;

impl Plugin for LightIkCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::LightIkConfig>().configure_sets(
            Update,
            (LightIkSet::Solve, LightIkSet::Visualize).chain(),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::LightIkCorePlugin;
    pub use crate::LightIkSet;
    pub use crate::config::{HelperConfig, LightIkConfig, ModifierConfig, SolverConfig};
    pub use crate::error::{ChainError, ConfigError, LightIkError};
    pub use crate::traits::{ChainSolver, ChainVisualizer, SkeletonProvider};
    pub use crate::types::{BoneId, JointLimits, RigId, SolverConstraint};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_plugin_inserts_config() {
        let mut app = App::new();
        app.add_plugins(LightIkCorePlugin);
        app.update();
        assert!(app.world().get_resource::<config::LightIkConfig>().is_some());
    }
}
