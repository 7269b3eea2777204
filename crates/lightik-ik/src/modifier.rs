//! Root/tip selection, constraint authoring and the per-frame pipeline.
//!
//! An [`IkModifier`] is what an editor or a scene drives: it stores the
//! selected bone names, resolves the chain whenever a selection changes,
//! keeps the constraint slots aligned to the chain, and runs the solver
//! bridge every frame.
//!
//! Selection setters that fail to produce a chain clear the *other*
//! endpoint: a root change that breaks the chain drops the tip, a tip change
//! drops the root.

use bevy::log::warn;
use nalgebra::Isometry3;

use lightik_chain::{BoneChain, ConstraintStore, JointConstraint, enumerate};
use lightik_core::config::ModifierConfig;
use lightik_core::error::ChainError;
use lightik_core::traits::{ChainSolver, ChainVisualizer, SkeletonProvider};
use lightik_core::types::{BoneId, JointLimits};

use crate::bridge::SolverBridge;

/// Which endpoint a selection change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Root,
    Tip,
}

/// A selected bone: the authored name and its index once resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Selection {
    name: String,
    bone: Option<BoneId>,
}

impl Selection {
    fn clear(&mut self) {
        self.name.clear();
        self.bone = None;
    }

    /// Look the name up; an empty name is unset.
    fn resolve(&mut self, skeleton: &impl SkeletonProvider) {
        self.bone = if self.name.is_empty() {
            None
        } else {
            skeleton.find_bone(&self.name)
        };
    }
}

/// IK-driven bone chain on one skeleton.
pub struct IkModifier<S, V = ()> {
    root: Selection,
    tip: Selection,
    chain: BoneChain,
    constraints: ConstraintStore,
    bridge: SolverBridge<S>,
    visualizer: V,
    /// Run the solver every frame. When off, pose overrides are cleared.
    pub simulate: bool,
    /// Send target snapshots to the visualizer every frame.
    pub show_helpers: bool,
}

impl<S: ChainSolver> IkModifier<S, ()> {
    /// Create a modifier without visualization.
    pub fn new(solver: S) -> Self {
        Self::with_visualizer(solver, ())
    }
}

impl<S: ChainSolver, V: ChainVisualizer> IkModifier<S, V> {
    pub fn with_visualizer(solver: S, visualizer: V) -> Self {
        let config = ModifierConfig::default();
        Self {
            root: Selection::default(),
            tip: Selection::default(),
            chain: BoneChain::default(),
            constraints: ConstraintStore::default(),
            bridge: SolverBridge::new(solver),
            visualizer,
            simulate: config.simulate,
            show_helpers: config.show_helpers,
        }
    }

    /// Apply the toggles of a [`ModifierConfig`].
    #[must_use]
    pub fn with_config(mut self, config: &ModifierConfig) -> Self {
        self.simulate = config.simulate;
        self.show_helpers = config.show_helpers;
        self
    }

    // -- selection -------------------------------------------------------

    /// Store a root name without touching the chain. It is resolved by the
    /// next [`skeleton_ready`](Self::skeleton_ready).
    pub fn set_root_name(&mut self, name: impl Into<String>) {
        self.root.name = name.into();
    }

    /// Store a tip name without touching the chain.
    pub fn set_tip_name(&mut self, name: impl Into<String>) {
        self.tip.name = name.into();
    }

    /// Select the root bone and re-resolve the chain.
    ///
    /// On failure the tip selection is cleared. Returns whether a chain
    /// exists afterwards.
    pub fn set_root_bone(&mut self, skeleton: &impl SkeletonProvider, name: &str) -> bool {
        self.root.name = name.to_owned();
        self.root.resolve(skeleton);
        self.reselect(skeleton, Endpoint::Root)
    }

    /// Select the tip bone and re-resolve the chain.
    ///
    /// On failure the root selection is cleared. Returns whether a chain
    /// exists afterwards.
    pub fn set_tip_bone(&mut self, skeleton: &impl SkeletonProvider, name: &str) -> bool {
        self.tip.name = name.to_owned();
        self.tip.resolve(skeleton);
        self.reselect(skeleton, Endpoint::Tip)
    }

    /// The skeleton became available: resolve stored names and the chain.
    ///
    /// Unlike the selection setters this never clears an endpoint and a
    /// failure leaves the constraint slots alone, so data authored before
    /// the skeleton existed survives. The visualizer is emptied on failure.
    pub fn skeleton_ready(&mut self, skeleton: &impl SkeletonProvider) -> bool {
        self.root.resolve(skeleton);
        self.tip.resolve(skeleton);
        let resolved = self.resolve_chain(skeleton).is_ok();
        if resolved {
            self.sync_chain(skeleton);
        } else {
            self.visualizer.set_constraints_snapshot(&[], &[]);
        }
        resolved
    }

    fn reselect(&mut self, skeleton: &impl SkeletonProvider, changed: Endpoint) -> bool {
        let resolved = match self.resolve_chain(skeleton) {
            Ok(()) => true,
            Err(err) => {
                if let Some(message) = self.failure_message(err, changed) {
                    warn!("{message}");
                }
                match changed {
                    Endpoint::Root => self.tip.clear(),
                    Endpoint::Tip => self.root.clear(),
                }
                false
            }
        };
        self.sync_chain(skeleton);
        resolved
    }

    /// Why a selection change produced no chain, or `None` while the user is
    /// still picking the first endpoint.
    fn failure_message(&self, err: ChainError, changed: Endpoint) -> Option<String> {
        let (picked, other, cleared) = match changed {
            Endpoint::Root => (&self.root, &self.tip, "tip"),
            Endpoint::Tip => (&self.tip, &self.root, "root"),
        };
        match err {
            ChainError::Disjoint { .. } => Some(format!(
                "bones '{}' and '{}' are not on the same branch, clearing {cleared} bone",
                self.root.name, self.tip.name
            )),
            ChainError::Unselected if !picked.name.is_empty() && picked.bone.is_none() => {
                Some(format!(
                    "bone '{}' not found in skeleton, clearing {cleared} bone",
                    picked.name
                ))
            }
            ChainError::Unselected if !other.name.is_empty() => Some(format!(
                "{cleared} bone '{}' not found in skeleton, clearing it",
                other.name
            )),
            ChainError::Unselected => None,
        }
    }

    fn resolve_chain(&mut self, skeleton: &impl SkeletonProvider) -> Result<(), ChainError> {
        match BoneChain::resolve(skeleton, self.root.bone, self.tip.bone) {
            Ok(chain) => {
                self.chain = chain;
                Ok(())
            }
            Err(err) => {
                self.chain.clear();
                Err(err)
            }
        }
    }

    /// Resize the constraint slots to the chain, rebuild the solver and
    /// refresh the visualization.
    fn sync_chain(&mut self, skeleton: &impl SkeletonProvider) {
        self.constraints.resize(self.chain.joint_count());
        self.bridge.rebuild(skeleton, &self.chain, &self.constraints);
        self.send_constraints_snapshot(skeleton);
    }

    // -- constraints -----------------------------------------------------

    /// Replace the whole constraint array.
    ///
    /// With a chain the array is fitted to the joint count and every slot is
    /// pushed to the solver. Without one it is kept as given until the chain
    /// resolves. The chain itself is never re-resolved here.
    pub fn set_constraints(
        &mut self,
        skeleton: &impl SkeletonProvider,
        slots: Vec<Option<JointLimits>>,
    ) {
        self.constraints
            .assign(slots.into_iter().map(|s| s.map(JointConstraint::new)).collect());
        if !self.chain.is_empty() {
            self.constraints.resize(self.chain.joint_count());
            self.bridge.push_constraints(&self.constraints);
        }
        self.send_constraints_snapshot(skeleton);
    }

    /// Builder form of [`set_constraints`](Self::set_constraints) for use
    /// before a skeleton exists.
    #[must_use]
    pub fn with_constraints(mut self, slots: Vec<Option<JointLimits>>) -> Self {
        self.constraints
            .assign(slots.into_iter().map(|s| s.map(JointConstraint::new)).collect());
        self
    }

    /// Put limits into (or clear) one joint slot. The solver picks the
    /// change up on the next [`process`](Self::process). Returns `false` for
    /// an index outside the chain.
    pub fn set_constraint(&mut self, joint: usize, limits: Option<JointLimits>) -> bool {
        self.constraints
            .set_slot(joint, limits.map(JointConstraint::new))
    }

    /// Edit one joint's constraint in place.
    pub fn constraint_mut(&mut self, joint: usize) -> Option<&mut JointConstraint> {
        self.constraints.get_mut(joint)
    }

    pub fn constraint(&self, joint: usize) -> Option<&JointConstraint> {
        self.constraints.get(joint)
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    // -- frame -----------------------------------------------------------

    /// Run one frame against `skeleton`, aiming at `target_world`.
    ///
    /// Steps the solver, then polls constraint changes once and re-sends the
    /// constraint snapshot if any changed. Does nothing without a chain.
    pub fn process(
        &mut self,
        skeleton: &mut impl SkeletonProvider,
        target_world: Option<Isometry3<f32>>,
    ) {
        if self.chain.is_empty() {
            return;
        }

        self.bridge
            .tick(skeleton, &self.chain, target_world.as_ref(), self.simulate);
        if self.bridge.refresh_constraints(&mut self.constraints) {
            self.send_constraints_snapshot(skeleton);
        }

        if self.show_helpers {
            let placement = skeleton.global_transform();
            self.visualizer
                .set_target_snapshot(&placement, &target_world.unwrap_or(placement));
        }
    }

    fn send_constraints_snapshot(&mut self, skeleton: &impl SkeletonProvider) {
        let poses: Vec<Isometry3<f32>> = self
            .chain
            .bones()
            .iter()
            .map(|&bone| skeleton.bone_global_pose(bone))
            .collect();
        self.visualizer
            .set_constraints_snapshot(&self.constraints.limits_snapshot(), &poses);
    }

    // -- pickers ---------------------------------------------------------

    /// Valid root names given the current tip.
    pub fn root_candidates(&self, skeleton: &impl SkeletonProvider) -> Vec<String> {
        enumerate::root_candidates(skeleton, self.tip.bone)
    }

    /// Valid tip names given the current root.
    pub fn tip_candidates(&self, skeleton: &impl SkeletonProvider) -> Vec<String> {
        enumerate::tip_candidates(skeleton, self.root.bone)
    }

    // -- accessors -------------------------------------------------------

    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    pub fn tip_name(&self) -> &str {
        &self.tip.name
    }

    pub fn root_bone(&self) -> Option<BoneId> {
        self.root.bone
    }

    pub fn tip_bone(&self) -> Option<BoneId> {
        self.tip.bone
    }

    pub fn chain(&self) -> &BoneChain {
        &self.chain
    }

    pub fn solver(&self) -> &S {
        self.bridge.solver()
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn visualizer_mut(&mut self) -> &mut V {
        &mut self.visualizer
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
