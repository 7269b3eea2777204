//! Per-joint constraints and the store that keeps them aligned to a chain.
//!
//! Slot `i` of a [`ConstraintStore`] describes the joint between chain bone
//! `i` and chain bone `i + 1`. An empty slot means the joint is
//! unconstrained. Angles stay in degrees here; conversion to radians happens
//! when a slot is handed to a solver.

use nalgebra::Vector3;

use lightik_core::types::{JointLimits, SolverConstraint, clamp_stiffness};

// ---------------------------------------------------------------------------
// JointConstraint
// ---------------------------------------------------------------------------

/// Authored limits of one joint plus change tracking.
///
/// Every setter compares against the current value and only records a
/// change when the value actually differs. A change raises a one-shot flag
/// (consumed by [`poll_changed`](Self::poll_changed)) and bumps a revision
/// counter that observers can compare without consuming anything.
#[derive(Debug, Clone, PartialEq)]
pub struct JointConstraint {
    limits: JointLimits,
    changed: bool,
    revision: u64,
}

impl JointConstraint {
    /// Create a constraint; stiffness is clamped. Starts unchanged.
    pub fn new(limits: JointLimits) -> Self {
        Self {
            limits: JointLimits {
                stiffness: clamp_stiffness(limits.stiffness),
                ..limits
            },
            changed: false,
            revision: 0,
        }
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    pub fn min_angle(&self) -> Vector3<f32> {
        self.limits.min_angle
    }

    pub fn max_angle(&self) -> Vector3<f32> {
        self.limits.max_angle
    }

    pub fn stiffness(&self) -> f32 {
        self.limits.stiffness
    }

    /// Lower per-axis bound, in degrees.
    pub fn set_min_angle(&mut self, degrees: Vector3<f32>) {
        if self.limits.min_angle != degrees {
            self.limits.min_angle = degrees;
            self.mark_changed();
        }
    }

    /// Upper per-axis bound, in degrees.
    pub fn set_max_angle(&mut self, degrees: Vector3<f32>) {
        if self.limits.max_angle != degrees {
            self.limits.max_angle = degrees;
            self.mark_changed();
        }
    }

    /// Clamped before comparing, so an out-of-range value that clamps to
    /// the current one is not a change.
    #[allow(clippy::float_cmp)]
    pub fn set_stiffness(&mut self, stiffness: f32) {
        let clamped = clamp_stiffness(stiffness);
        if self.limits.stiffness != clamped {
            self.limits.stiffness = clamped;
            self.mark_changed();
        }
    }

    /// Return the change flag and clear it.
    pub fn poll_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Number of changes since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a change happened after an observer saw `seen`.
    pub fn changed_since(&self, seen: u64) -> bool {
        self.revision > seen
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.revision += 1;
    }
}

impl From<JointLimits> for JointConstraint {
    fn from(limits: JointLimits) -> Self {
        Self::new(limits)
    }
}

// ---------------------------------------------------------------------------
// ConstraintStore
// ---------------------------------------------------------------------------

/// Ordered constraint slots, one per chain joint.
#[derive(Debug, Clone, Default)]
pub struct ConstraintStore {
    slots: Vec<Option<JointConstraint>>,
    /// Joints whose slot was replaced wholesale since the last drain.
    replaced: Vec<usize>,
}

impl ConstraintStore {
    pub fn new(slots: Vec<Option<JointConstraint>>) -> Self {
        Self {
            slots,
            replaced: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Truncate or extend to `joint_count` slots. Surviving slots keep their
    /// index; new slots are empty.
    pub fn resize(&mut self, joint_count: usize) {
        self.slots.resize_with(joint_count, || None);
        self.replaced.retain(|&joint| joint < joint_count);
    }

    /// Replace every slot. Length is not adjusted here.
    pub fn assign(&mut self, slots: Vec<Option<JointConstraint>>) {
        self.slots = slots;
        self.replaced.clear();
    }

    pub fn slots(&self) -> &[Option<JointConstraint>] {
        &self.slots
    }

    pub fn get(&self, joint: usize) -> Option<&JointConstraint> {
        self.slots.get(joint).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, joint: usize) -> Option<&mut JointConstraint> {
        self.slots.get_mut(joint).and_then(Option::as_mut)
    }

    /// Put a constraint into (or clear) one slot. Returns `false` when the
    /// joint index is outside the store.
    pub fn set_slot(&mut self, joint: usize, constraint: Option<JointConstraint>) -> bool {
        let Some(slot) = self.slots.get_mut(joint) else {
            return false;
        };
        *slot = constraint;
        if !self.replaced.contains(&joint) {
            self.replaced.push(joint);
        }
        true
    }

    /// Solver units for one joint; empty or missing slots are unconstrained.
    pub fn solver_constraint(&self, joint: usize) -> SolverConstraint {
        SolverConstraint::from_slot(self.get(joint).map(JointConstraint::limits))
    }

    /// Authored limits of every slot, for visualization.
    pub fn limits_snapshot(&self) -> Vec<Option<JointLimits>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map(|c| *c.limits()))
            .collect()
    }

    /// Poll one slot's change flag. Empty slots never report a change.
    pub fn poll_changed(&mut self, joint: usize) -> bool {
        self.get_mut(joint).is_some_and(JointConstraint::poll_changed)
    }

    /// Poll every slot once and return the joints that changed, ascending.
    ///
    /// Consumes the one-shot flags, so there must be a single caller per
    /// frame. Other observers should use [`JointConstraint::changed_since`].
    pub fn drain_changed(&mut self) -> Vec<usize> {
        let mut changed = std::mem::take(&mut self.replaced);
        for joint in 0..self.slots.len() {
            // Poll every slot even if already listed, so no flag lingers.
            if self.poll_changed(joint) && !changed.contains(&joint) {
                changed.push(joint);
            }
        }
        changed.sort_unstable();
        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn limited(degrees: f32) -> JointConstraint {
        JointConstraint::new(JointLimits::symmetric(degrees, 0.2))
    }

    // -- JointConstraint --

    #[test]
    fn new_constraint_is_unchanged() {
        let mut c = limited(30.0);
        assert!(!c.poll_changed());
        assert_eq!(c.revision(), 0);
    }

    #[test]
    fn new_constraint_clamps_stiffness() {
        let c = JointConstraint::new(JointLimits {
            stiffness: 7.0,
            ..JointLimits::default()
        });
        assert_relative_eq!(c.stiffness(), 1.0);
    }

    #[test]
    fn change_flag_is_consumed_once() {
        let mut c = limited(30.0);
        c.set_max_angle(Vector3::new(45.0, 30.0, 30.0));
        assert!(c.poll_changed());
        assert!(!c.poll_changed());
    }

    #[test]
    fn identical_value_is_not_a_change() {
        let mut c = limited(30.0);
        c.set_min_angle(Vector3::repeat(-30.0));
        c.set_max_angle(Vector3::repeat(30.0));
        c.set_stiffness(0.2);
        assert!(!c.poll_changed());
        assert_eq!(c.revision(), 0);
    }

    #[test]
    fn stiffness_clamped_to_range() {
        let mut c = limited(10.0);
        c.set_stiffness(5.0);
        assert_relative_eq!(c.stiffness(), 1.0);
        c.set_stiffness(-3.0);
        assert_relative_eq!(c.stiffness(), 0.0);
    }

    #[test]
    fn clamped_identical_stiffness_is_not_a_change() {
        let mut c = limited(10.0);
        c.set_stiffness(1.0);
        assert!(c.poll_changed());
        c.set_stiffness(2.0);
        assert!(!c.poll_changed());
    }

    #[test]
    fn revision_counts_every_change() {
        let mut c = limited(10.0);
        c.set_stiffness(0.9);
        c.set_min_angle(Vector3::zeros());
        assert_eq!(c.revision(), 2);
        assert!(c.changed_since(0));
        assert!(c.changed_since(1));
        assert!(!c.changed_since(2));

        // Polling the flag leaves the revision untouched.
        assert!(c.poll_changed());
        assert!(c.changed_since(1));
    }

    #[test]
    fn angles_stay_in_degrees() {
        let mut c = limited(10.0);
        c.set_max_angle(Vector3::new(90.0, 0.0, 0.0));
        assert_relative_eq!(c.max_angle().x, 90.0);
    }

    // -- ConstraintStore --

    #[test]
    fn resize_extends_with_empty_slots() {
        let mut store = ConstraintStore::default();
        store.resize(3);
        assert_eq!(store.len(), 3);
        assert!(store.slots().iter().all(Option::is_none));
    }

    #[test]
    fn resize_preserves_entries_by_index() {
        let mut store = ConstraintStore::new(vec![Some(limited(10.0)), None, Some(limited(30.0))]);
        store.resize(2);
        assert_eq!(store.len(), 2);
        assert_relative_eq!(store.get(0).unwrap().max_angle().x, 10.0);
        assert!(store.get(1).is_none());

        store.resize(4);
        assert_eq!(store.len(), 4);
        assert_relative_eq!(store.get(0).unwrap().max_angle().x, 10.0);
        assert!(store.get(2).is_none());
    }

    #[test]
    fn resize_to_zero_clears() {
        let mut store = ConstraintStore::new(vec![Some(limited(10.0))]);
        store.resize(0);
        assert!(store.is_empty());
    }

    #[test]
    fn empty_slot_is_unconstrained() {
        let store = ConstraintStore::new(vec![None]);
        assert_eq!(store.solver_constraint(0), SolverConstraint::unconstrained());
        assert_eq!(store.solver_constraint(5), SolverConstraint::unconstrained());
    }

    #[test]
    fn solver_constraint_in_radians() {
        let store = ConstraintStore::new(vec![Some(limited(90.0))]);
        let c = store.solver_constraint(0);
        assert_relative_eq!(c.max_angle.x, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(c.stiffness, 0.2);
    }

    #[test]
    fn drain_reports_field_changes_once() {
        let mut store = ConstraintStore::new(vec![Some(limited(10.0)), None, Some(limited(20.0))]);
        store.get_mut(2).unwrap().set_stiffness(0.7);
        assert_eq!(store.drain_changed(), vec![2]);
        assert!(store.drain_changed().is_empty());
    }

    #[test]
    fn drain_reports_replaced_slots() {
        let mut store = ConstraintStore::default();
        store.resize(3);
        assert!(store.set_slot(1, Some(limited(5.0))));
        assert!(store.set_slot(0, None));
        assert!(!store.set_slot(9, None));
        assert_eq!(store.drain_changed(), vec![0, 1]);
        assert!(store.drain_changed().is_empty());
    }

    #[test]
    fn drain_merges_replaced_and_edited() {
        let mut store = ConstraintStore::default();
        store.resize(2);
        store.set_slot(1, Some(limited(5.0)));
        store.get_mut(1).unwrap().set_stiffness(0.0);
        assert_eq!(store.drain_changed(), vec![1]);
        assert!(!store.poll_changed(1));
    }

    #[test]
    fn shrinking_drops_pending_replacements() {
        let mut store = ConstraintStore::default();
        store.resize(3);
        store.set_slot(2, Some(limited(5.0)));
        store.resize(1);
        assert!(store.drain_changed().is_empty());
    }

    #[test]
    fn limits_snapshot_mirrors_slots() {
        let store = ConstraintStore::new(vec![None, Some(limited(15.0))]);
        let snapshot = store.limits_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].is_none());
        assert_relative_eq!(snapshot[1].unwrap().max_angle.y, 15.0);
    }
}
