//! Structured error types for the gavel store.
//!
//! Callers branch on these: at minimum [`StoreError::NotFound`] must be
//! distinguishable from every other failure, so "absent" is never conflated
//! with "broken". No variant triggers an automatic retry; retry policy
//! belongs to the caller.

use std::time::Duration;

use thiserror::Error;

/// Main error type for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be reached.
    #[error("cannot connect to database: {source}")]
    Connection { source: sqlx::Error },

    /// A table-creation statement failed, including "already exists".
    #[error("cannot create table '{table}': {source}")]
    Schema {
        table: &'static str,
        source: sqlx::Error,
    },

    /// A statement failed to execute or its result failed to decode.
    #[error("{context}: {source}")]
    Query {
        context: &'static str,
        source: sqlx::Error,
    },

    /// No row matched the lookup.
    #[error("not found")]
    NotFound,

    /// The unit of work exceeded its wall-clock bound.
    #[error("operation timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// A transaction could not be rolled back after a failed statement.
    ///
    /// The connection is in an unknown state; callers are expected to treat
    /// this as unrecoverable and terminate the affected worker.
    #[error("cannot roll back transaction: {source}")]
    RollbackFailed { source: sqlx::Error },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn query(context: &'static str, source: sqlx::Error) -> Self {
        Self::Query { context, source }
    }
}
