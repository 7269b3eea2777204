//! Debug helpers for LightIK chains.
//!
//! [`VisualHelper`] implements
//! [`ChainVisualizer`](lightik_core::traits::ChainVisualizer) and turns chain
//! snapshots into world-space polylines. [`LightIkVizPlugin`] draws whatever
//! ends up in the [`HelperDrawList`] resource with Bevy gizmos.
//!
//! # Usage
//!
//! ```no_run
//! use bevy::prelude::*;
//! use lightik_viz::LightIkVizPlugin;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(lightik_core::LightIkCorePlugin)
//!     .add_plugins(LightIkVizPlugin)
//!     .run();
//! ```

pub mod helper;
pub mod plugin;

pub use helper::{BoneInfo, HelperKind, LineMode, Polyline, VisualHelper};
pub use plugin::{HelperDrawList, LightIkVizPlugin};
