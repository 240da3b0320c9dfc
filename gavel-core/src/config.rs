//! Configuration value objects for services backed by the gavel store.
//!
//! The config source is a YAML file owned by the deploying service; this
//! module only defines the shape, strict decoding, and the validation
//! contract. Unknown keys are rejected so typos fail loudly at startup.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Top-level configuration for a service using the gavel store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub postgres: PgConfig,
}

/// Connection settings for the Postgres-backed store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PgConfig {
    pub url: String,
    #[serde(rename = "maxIdleConnection")]
    pub max_idle: u32,
    #[serde(rename = "maxOpenConnection")]
    pub max_open: u32,
}

impl ServerConfig {
    /// Load configuration from a YAML file, rejecting unknown keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config: Self = serde_yaml::from_str(&content)?;

        Ok(config)
    }

    /// Validate every section.
    pub fn check(&self) -> Result<()> {
        self.postgres.check()
    }
}

impl PgConfig {
    /// Validate the connection settings.
    ///
    /// Constraints are checked in a fixed order and the first violation is
    /// reported: url presence, idle lower bound, open lower bound, idle not
    /// exceeding open.
    pub fn check(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ConfigError::invalid("no 'url'"));
        }
        if self.max_idle < 1 {
            return Err(ConfigError::invalid("'maxIdleConnection' must be >= 1"));
        }
        if self.max_open < 1 {
            return Err(ConfigError::invalid("'maxOpenConnection' must be >= 1"));
        }
        if self.max_idle > self.max_open {
            return Err(ConfigError::invalid(
                "'maxIdleConnection' must be <= 'maxOpenConnection'",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn pg(url: &str, max_idle: u32, max_open: u32) -> PgConfig {
        PgConfig {
            url: url.to_owned(),
            max_idle,
            max_open,
        }
    }

    #[test]
    fn check_accepts_valid_settings() {
        assert!(pg("x", 2, 4).check().is_ok());
    }

    #[test]
    fn check_rejects_empty_url() {
        let err = pg("", 2, 4).check().unwrap_err();
        assert!(err.to_string().contains("no 'url'"));
    }

    #[test]
    fn check_rejects_zero_idle() {
        let err = pg("x", 0, 4).check().unwrap_err();
        assert!(err.to_string().contains("'maxIdleConnection' must be >= 1"));
    }

    #[test]
    fn check_rejects_zero_open() {
        let err = pg("x", 1, 0).check().unwrap_err();
        // idle bound is checked first; use a passing idle value
        assert!(err.to_string().contains("'maxOpenConnection' must be >= 1"));
    }

    #[test]
    fn check_rejects_idle_above_open() {
        let err = pg("x", 4, 2).check().unwrap_err();
        assert!(err
            .to_string()
            .contains("'maxIdleConnection' must be <= 'maxOpenConnection'"));
    }

    #[test]
    fn load_missing_file_fails_with_read_error() {
        let err = ServerConfig::load("shouldNotExist").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_rejects_non_yaml_content() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{{{ this is not yaml").expect("write");

        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            b"postgres:\n  url: \"x\"\n  maxIdleConnection: 2\n  maxOpenConnection: 4\n  typoKey: 1\n",
        )
        .expect("write");

        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_parses_the_test_template() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.d/test.server.yml");
        let config = ServerConfig::load(path).expect("template should parse");

        assert_eq!(config.postgres.max_idle, 2);
        assert_eq!(config.postgres.max_open, 4);
        assert!(config.postgres.url.contains("HOST:PORT"));
        config.check().expect("template should validate");
    }
}
