//! Schema creation for the three store tables.
//!
//! Creation carries no `IF NOT EXISTS` guard: each logical deployment (and
//! each test namespace) starts from a clean database, and re-provisioning an
//! existing schema must fail loudly instead of silently reusing stale
//! tables.

use sqlx::PgPool;

use crate::error::{Result, StoreError};

/// Create `test_cases`, `problems`, and `test_case_assignments`, in that
/// order (the foreign keys require it).
pub async fn create_tables(pool: &PgPool) -> Result<()> {
    tracing::info!("creating store tables");

    sqlx::query(
        r#"
        CREATE TABLE test_cases (
            id SERIAL PRIMARY KEY,
            input text NOT NULL,
            output text NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|source| StoreError::Schema {
        table: "test_cases",
        source,
    })?;

    sqlx::query(
        r#"
        CREATE TABLE problems (
            id SERIAL PRIMARY KEY,
            description text NOT NULL,
            example_test_case_id integer REFERENCES test_cases(id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|source| StoreError::Schema {
        table: "problems",
        source,
    })?;

    sqlx::query(
        r#"
        CREATE TABLE test_case_assignments (
            problem_id integer REFERENCES problems(id),
            test_case_id integer REFERENCES test_cases(id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|source| StoreError::Schema {
        table: "test_case_assignments",
        source,
    })?;

    tracing::info!("store tables created");
    Ok(())
}
