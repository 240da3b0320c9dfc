//! Database connection pool management.
//!
//! Uses sqlx `PgPool` with explicit connection limits taken from the
//! validated [`PgConfig`].

use gavel_core::PgConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{Result, StoreError};

/// Create a PostgreSQL connection pool bounded by the config's settings.
///
/// `max_open` caps the pool; `max_idle` connections are kept warm as the
/// pool floor (sqlx exposes no separate idle ceiling). The first connection
/// is established eagerly, so an unreachable database fails here rather than
/// on first use.
///
/// # Errors
///
/// Returns [`StoreError::Connection`] if the database cannot be reached.
pub async fn create_pool(config: &PgConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_open)
        .min_connections(config.max_idle)
        .connect(&config.url)
        .await
        .map_err(|source| StoreError::Connection { source })
}
