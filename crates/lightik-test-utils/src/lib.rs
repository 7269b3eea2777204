//! Shared test fixtures and utilities for LightIK crates.
//!
//! Provides ready-made rigs, recording stand-ins for the solver and
//! visualizer collaborators, and Bevy test app builders.

pub mod app;
pub mod fixtures;
pub mod mocks;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{minimal_test_app, test_app_with};
pub use fixtures::{branching_rig, chain_rig};
pub use mocks::{RecordingSolver, RecordingVisualizer, SolverCall};
