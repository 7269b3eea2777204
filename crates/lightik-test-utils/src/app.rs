//! Bevy test app builders.

use bevy::app::Plugins;
use bevy::prelude::*;

/// Create a minimal test app with only the core plugin.
///
/// Provides `LightIkSet` ordering and the default `LightIkConfig` but no
/// solve or visualize systems; add those plugins manually when needed.
pub fn minimal_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(lightik_core::LightIkCorePlugin);
    app.finish();
    app.cleanup();
    app
}

/// Create a test app with the core plugin plus `plugins`.
///
/// Plugins cannot be added once an app is finished, so anything a test
/// needs beyond the core goes in here.
pub fn test_app_with<M>(plugins: impl Plugins<M>) -> App {
    let mut app = App::new();
    app.add_plugins(lightik_core::LightIkCorePlugin);
    app.add_plugins(plugins);
    app.finish();
    app.cleanup();
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
