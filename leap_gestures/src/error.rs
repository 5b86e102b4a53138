//! Error types for the tracker host.

use std::path::PathBuf;

use pose_filter::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid finger filter: {0}")]
    Filter(#[from] FilterError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_passes_through_unchanged() {
        let err = AppError::from(ConfigError::Invalid("frames_to_skip must be at least 1".into()));
        assert_eq!(err.to_string(), "invalid config: frames_to_skip must be at least 1");
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }
}
