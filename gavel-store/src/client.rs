//! The typed data client: problems, test cases, and their assignments.
//!
//! Every public operation is a bounded unit of work: the whole call,
//! including waiting for a pooled connection, runs under a wall-clock
//! deadline. Multi-statement writes execute inside a single transaction and
//! roll back as a unit on failure.

use std::future::Future;
use std::time::Duration;

use gavel_core::PgConfig;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};

use crate::error::{Result, StoreError};
use crate::{pool, schema};

/// Upper bound on each unit of work.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An input/output pair used to validate a solution.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TestCase {
    pub id: i32,
    pub input: String,
    pub output: String,
}

/// A judging exercise with a description and a designated example test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: i32,
    pub description: String,
    pub example_test_case: TestCase,
}

/// Typed client over the `problems`, `test_cases`, and
/// `test_case_assignments` tables.
///
/// Safe to call from multiple tasks; concurrency is bounded by the
/// underlying pool, and ordering between concurrent calls is whatever the
/// database's transaction isolation provides.
pub struct Client {
    pool: PgPool,
    timeout: Duration,
}

impl Client {
    /// Open a pooled connection and provision the schema.
    ///
    /// Table creation is not idempotent: connecting against a database that
    /// already holds the tables fails with [`StoreError::Schema`].
    pub async fn connect(config: &PgConfig) -> Result<Self> {
        let pool = pool::create_pool(config).await?;
        schema::create_tables(&pool).await?;

        Ok(Self {
            pool,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Close the pool. Consuming `self` makes release happen exactly once.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create a problem together with its example test case and the
    /// assignment row linking them, in one transaction.
    ///
    /// Returns the fully populated problem, identities included.
    pub async fn new_problem(
        &self,
        description: &str,
        sample_input: &str,
        sample_output: &str,
    ) -> Result<Problem> {
        self.unit_of_work(async {
            let mut tx = begin(&self.pool).await?;
            let result = insert_problem(&mut tx, description, sample_input, sample_output).await;
            finish(tx, result).await
        })
        .await
    }

    /// Look up a problem and its example test case.
    pub async fn find_problem_by_id(&self, id: i32) -> Result<Problem> {
        self.unit_of_work(async {
            let row = sqlx::query(
                r#"
                SELECT pl.id, pl.description, tc.id AS tc_id, tc.input, tc.output
                FROM problems AS pl
                    INNER JOIN test_cases AS tc ON pl.example_test_case_id = tc.id
                WHERE pl.id = $1
                LIMIT 1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::query("cannot find problem", e))?
            .ok_or(StoreError::NotFound)?;

            Ok(Problem {
                id: row.get("id"),
                description: row.get("description"),
                example_test_case: TestCase {
                    id: row.get("tc_id"),
                    input: row.get("input"),
                    output: row.get("output"),
                },
            })
        })
        .await
    }

    /// Insert a test case and assign it to an existing problem, in one
    /// transaction.
    ///
    /// The problem's existence is not checked up front; a dangling
    /// `problem_id` violates the assignment's foreign key and surfaces as
    /// [`StoreError::Query`].
    pub async fn new_test_case(
        &self,
        problem_id: i32,
        input: &str,
        output: &str,
    ) -> Result<TestCase> {
        self.unit_of_work(async {
            let mut tx = begin(&self.pool).await?;

            let result = async {
                let tc = insert_test_case(&mut tx, input, output).await?;
                assign_test_case(&mut tx, problem_id, tc.id).await?;
                Ok(tc)
            }
            .await;

            finish(tx, result).await
        })
        .await
    }

    /// Direct lookup of a test case.
    pub async fn find_test_case_by_id(&self, id: i32) -> Result<TestCase> {
        self.unit_of_work(async {
            sqlx::query_as::<_, TestCase>(
                "SELECT id, input, output FROM test_cases WHERE id = $1 LIMIT 1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::query("cannot find test case", e))?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    /// All test cases assigned to a problem, ordered by ascending id.
    ///
    /// Returns an empty Vec when the problem has no assignments or does not
    /// exist.
    pub async fn find_test_cases_by_problem_id(&self, problem_id: i32) -> Result<Vec<TestCase>> {
        self.unit_of_work(async {
            sqlx::query_as::<_, TestCase>(
                r#"
                SELECT tc.id, tc.input, tc.output
                FROM problems AS pl
                    INNER JOIN test_case_assignments AS asg ON pl.id = asg.problem_id
                    INNER JOIN test_cases AS tc ON tc.id = asg.test_case_id
                WHERE pl.id = $1
                ORDER BY tc.id
                "#,
            )
            .bind(problem_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query("cannot list test cases", e))
        })
        .await
    }

    /// Run one operation under the client's wall-clock bound.
    async fn unit_of_work<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| StoreError::Timeout {
                limit: self.timeout,
            })?
    }
}

async fn begin(pool: &PgPool) -> Result<Transaction<'_, Postgres>> {
    pool.begin()
        .await
        .map_err(|e| StoreError::query("cannot begin transaction", e))
}

/// Commit on success; roll back and propagate the original error otherwise.
///
/// A failed rollback leaves the connection in an unknown state and is
/// surfaced as [`StoreError::RollbackFailed`] instead of the original error.
async fn finish<T>(tx: Transaction<'_, Postgres>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| StoreError::query("cannot commit transaction", e))?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback()
                .await
                .map_err(|source| StoreError::RollbackFailed { source })?;
            Err(err)
        }
    }
}

async fn insert_problem(
    tx: &mut Transaction<'_, Postgres>,
    description: &str,
    sample_input: &str,
    sample_output: &str,
) -> Result<Problem> {
    let example = insert_test_case(tx, sample_input, sample_output).await?;

    let description = sanitize(description);
    let row = sqlx::query(
        "INSERT INTO problems (description, example_test_case_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(description)
    .bind(example.id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| StoreError::query("cannot insert problem", e))?;

    let problem_id: i32 = row.get("id");
    assign_test_case(tx, problem_id, example.id).await?;

    Ok(Problem {
        id: problem_id,
        description: description.to_owned(),
        example_test_case: example,
    })
}

async fn insert_test_case(
    tx: &mut Transaction<'_, Postgres>,
    input: &str,
    output: &str,
) -> Result<TestCase> {
    let input = sanitize(input);
    let output = sanitize(output);

    let row = sqlx::query("INSERT INTO test_cases (input, output) VALUES ($1, $2) RETURNING id")
        .bind(input)
        .bind(output)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| StoreError::query("cannot insert test case", e))?;

    Ok(TestCase {
        id: row.get("id"),
        input: input.to_owned(),
        output: output.to_owned(),
    })
}

async fn assign_test_case(
    tx: &mut Transaction<'_, Postgres>,
    problem_id: i32,
    test_case_id: i32,
) -> Result<()> {
    sqlx::query("INSERT INTO test_case_assignments (problem_id, test_case_id) VALUES ($1, $2)")
        .bind(problem_id)
        .bind(test_case_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::query("cannot assign test case to problem", e))?;

    Ok(())
}

// TODO: escape statement parameters beyond relying on bind placeholders.
fn sanitize(s: &str) -> &str {
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_is_a_pass_through() {
        // Known gap: bind placeholders are the only injection protection.
        assert_eq!(sanitize("'; DROP TABLE problems; --"), "'; DROP TABLE problems; --");
    }
}
