//! Inverse kinematics pipeline for LightIK bone chains.
//!
//! Provides the solver bridge that feeds a resolved chain into a
//! [`ChainSolver`](lightik_core::traits::ChainSolver), the [`IkModifier`]
//! that owns root/tip selection and constraints, a reference CCD solver, and
//! Bevy integration.
//!
//! # Architecture
//!
//! ```text
//! names ──► BoneChain ──► ConstraintStore ──► SolverBridge ──► ChainSolver
//!                                                  │
//!                               skeleton poses ◄───┘
//! ```
//!
//! Selection changes resolve the chain and rebuild the solver description
//! synchronously; every frame [`IkModifier::process`] pushes the target,
//! steps the solver, writes rotations back and refreshes changed
//! constraints.

pub mod bridge;
pub mod modifier;
pub mod plugin;
pub mod solver;

pub use bridge::SolverBridge;
pub use modifier::IkModifier;
pub use plugin::{IkRigEntry, IkRigs, LightIkPlugin, RigModifier};
pub use solver::CcdSolver;
