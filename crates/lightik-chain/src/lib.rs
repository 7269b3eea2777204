//! Bone chain resolution and per-joint constraint storage for LightIK.
//!
//! # Architecture
//!
//! ```text
//! SkeletonProvider ──► BoneChain ──► ConstraintStore ──► SolverConstraint
//! ```
//!
//! A [`BoneChain`] is resolved between a root and a tip bone by walking
//! parent links up from the tip. The [`ConstraintStore`] owns one optional
//! [`JointConstraint`] per joint and reports which ones changed since the
//! last poll. The [`enumerate`] helpers list valid root and tip picks.

pub mod chain;
pub mod constraints;
pub mod enumerate;

pub use chain::BoneChain;
pub use constraints::{ConstraintStore, JointConstraint};
pub use enumerate::{enum_hint, root_candidates, tip_candidates};
