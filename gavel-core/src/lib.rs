//! gavel-core: configuration for the gavel data-access layer.
//!
//! Holds the value objects deserialized from the declarative config source
//! and the validation contract the store crate relies on.

pub mod config;
pub mod error;

pub use config::{PgConfig, ServerConfig};
pub use error::{ConfigError, Result};
