use thiserror::Error;

use crate::types::BoneId;

/// Top-level error type for lightik-core.
#[derive(Debug, Error)]
pub enum LightIkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: &str) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a root/tip pair does not form a bone chain.
///
/// Copy + no payload allocation: produced on every selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("root or tip bone is not selected")]
    Unselected,

    #[error("{root} is not an ancestor of {tip}")]
    Disjoint { root: BoneId, tip: BoneId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightik_error_from_config_error() {
        let err = ConfigError::invalid("solver.tolerance", "must be > 0");
        let top: LightIkError = err.into();
        assert!(matches!(top, LightIkError::Config(_)));
        assert!(top.to_string().contains("solver.tolerance"));
    }

    #[test]
    fn lightik_error_from_chain_error() {
        let top: LightIkError = ChainError::Unselected.into();
        assert!(matches!(top, LightIkError::Chain(_)));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn chain_error_display_messages() {
        assert_eq!(
            ChainError::Unselected.to_string(),
            "root or tip bone is not selected"
        );
        assert_eq!(
            ChainError::Disjoint {
                root: BoneId(0),
                tip: BoneId(4)
            }
            .to_string(),
            "bone#0 is not an ancestor of bone#4"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidValue {
                field: "helpers.dash_size".into(),
                message: "must be > 0".into()
            }
            .to_string(),
            "Invalid value for helpers.dash_size: must be > 0"
        );
    }

    #[test]
    fn chain_error_is_copy() {
        let err = ChainError::Unselected;
        let err2 = err;
        assert_eq!(err, err2);
    }
}
