use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}
const fn default_max_iterations() -> u32 {
    10
}
const fn default_tolerance() -> f32 {
    1e-3
}
const fn default_min_angle_step() -> f32 {
    1e-5
}
const fn default_points_per_marker() -> usize {
    32
}
const fn default_joint_radius() -> f32 {
    0.2
}
const fn default_root_radius() -> f32 {
    0.5
}
const fn default_dash_size() -> f32 {
    0.2
}
const fn default_max_dashes() -> usize {
    25
}

// ---------------------------------------------------------------------------
// ModifierConfig
// ---------------------------------------------------------------------------

/// Initial toggles of a newly created IK modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfig {
    /// Run the solver every frame. When off, pose overrides are cleared.
    #[serde(default = "default_true")]
    pub simulate: bool,

    /// Publish debug helper geometry.
    #[serde(default)]
    pub show_helpers: bool,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            simulate: true,
            show_helpers: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Settings of the reference CCD solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// CCD sweeps per update step.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Distance from the target at which the solver stops early.
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Smallest per-joint change (radians) that counts as a pose change.
    #[serde(default = "default_min_angle_step")]
    pub min_angle_step: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            min_angle_step: default_min_angle_step(),
        }
    }
}

// ---------------------------------------------------------------------------
// HelperConfig
// ---------------------------------------------------------------------------

/// Geometry settings of the debug helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Vertices per angle-limit arc.
    #[serde(default = "default_points_per_marker")]
    pub points_per_marker: usize,

    /// Radius of the angle-limit arcs drawn at each joint.
    #[serde(default = "default_joint_radius")]
    pub joint_radius: f32,

    /// Half extent of the root and tip markers.
    #[serde(default = "default_root_radius")]
    pub root_radius: f32,

    /// Length of one dash on the root-to-target line.
    #[serde(default = "default_dash_size")]
    pub dash_size: f32,

    /// Upper bound on dashes, however far the target is.
    #[serde(default = "default_max_dashes")]
    pub max_dashes: usize,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            points_per_marker: default_points_per_marker(),
            joint_radius: default_joint_radius(),
            root_radius: default_root_radius(),
            dash_size: default_dash_size(),
            max_dashes: default_max_dashes(),
        }
    }
}

// ---------------------------------------------------------------------------
// LightIkConfig
// ---------------------------------------------------------------------------

/// Complete LightIK configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Resource)]
pub struct LightIkConfig {
    #[serde(default)]
    pub modifier: ModifierConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub helpers: HelperConfig,
}

impl LightIkConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::invalid("solver.max_iterations", "must be > 0"));
        }
        if !is_positive(self.solver.tolerance) {
            return Err(ConfigError::invalid("solver.tolerance", "must be > 0"));
        }
        if self.solver.min_angle_step.is_nan() || self.solver.min_angle_step < 0.0 {
            return Err(ConfigError::invalid("solver.min_angle_step", "must be >= 0"));
        }
        if self.helpers.points_per_marker < 2 {
            return Err(ConfigError::invalid("helpers.points_per_marker", "must be >= 2"));
        }
        if !is_positive(self.helpers.joint_radius) || !is_positive(self.helpers.root_radius) {
            return Err(ConfigError::invalid("helpers", "marker radii must be > 0"));
        }
        if !is_positive(self.helpers.dash_size) {
            return Err(ConfigError::invalid("helpers.dash_size", "must be > 0"));
        }
        if self.helpers.max_dashes == 0 {
            return Err(ConfigError::invalid("helpers.max_dashes", "must be > 0"));
        }
        Ok(())
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// `false` for NaN, zero and negatives.
fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_is_valid() {
        assert!(LightIkConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_helper_geometry() {
        let helpers = HelperConfig::default();
        assert_eq!(helpers.points_per_marker, 32);
        assert_relative_eq!(helpers.joint_radius, 0.2);
        assert_relative_eq!(helpers.root_radius, 0.5);
        assert_relative_eq!(helpers.dash_size, 0.2);
        assert_eq!(helpers.max_dashes, 25);
    }

    #[test]
    fn modifier_defaults() {
        let m = ModifierConfig::default();
        assert!(m.simulate);
        assert!(!m.show_helpers);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = LightIkConfig::from_toml_str("").unwrap();
        assert_eq!(config, LightIkConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = LightIkConfig::from_toml_str(
            r"
            [modifier]
            show_helpers = true

            [solver]
            max_iterations = 4
            ",
        )
        .unwrap();
        assert!(config.modifier.simulate);
        assert!(config.modifier.show_helpers);
        assert_eq!(config.solver.max_iterations, 4);
        assert_relative_eq!(config.solver.tolerance, 1e-3);
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = LightIkConfig::from_toml_str("[solver]\nmax_iterations = 0").unwrap_err();
        assert!(err.to_string().contains("solver.max_iterations"));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let mut config = LightIkConfig::default();
        config.solver.tolerance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_tolerance_rejected() {
        let mut config = LightIkConfig::default();
        config.solver.tolerance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn single_marker_point_rejected() {
        let mut config = LightIkConfig::default();
        config.helpers.points_per_marker = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_dashes_rejected() {
        let mut config = LightIkConfig::default();
        config.helpers.max_dashes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = LightIkConfig::from_toml_str("[solver\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LightIkConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
