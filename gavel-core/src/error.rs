//! Structured error types for gavel-core.
//!
//! Uses `thiserror` so consumers get composable, matchable errors rather
//! than opaque strings.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// The config file is not valid YAML or carries unknown keys.
    #[error("cannot parse config file: {source}")]
    Parse {
        #[from]
        source: serde_yaml::Error,
    },

    /// A validation constraint was violated.
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Result type alias for gavel-core operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a read error with the offending path attached.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error naming the violated constraint.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_names_the_constraint() {
        let err = ConfigError::invalid("no 'url'");
        assert_eq!(err.to_string(), "invalid configuration: no 'url'");
    }

    #[test]
    fn read_display_carries_the_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::read("/etc/gavel/missing.yml", io_err);
        assert!(err.to_string().contains("/etc/gavel/missing.yml"));
    }
}
