//! Throwaway per-test database provisioning.
//!
//! Schema creation is deliberately not idempotent, so every integration
//! test gets its own role and database and always starts from a clean
//! namespace. Enabled via the `testenv` feature; see `compose.yml` at the
//! workspace root for the matching local Postgres.

use rand::Rng;
use sqlx::{Connection, PgConnection};
use thiserror::Error;

use gavel_core::{ConfigError, PgConfig, ServerConfig};

// Admin credentials exposed by compose.yml.
const ADMIN_ADDR: &str = "localhost:5432";
const ADMIN_USER: &str = "pgadmin";
const ADMIN_PASSWORD: &str = "pgpassword";

/// Postgres identifiers are capped well below this, and short names keep
/// logs readable.
const NAMESPACE_LIMIT: usize = 40;

/// Errors from test-environment provisioning.
#[derive(Error, Debug)]
pub enum TestEnvError {
    #[error("invalid template config: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot connect to database as admin: {source}")]
    Admin { source: sqlx::Error },

    #[error("cannot create {what} '{name}': {source}")]
    Provision {
        what: &'static str,
        name: String,
        source: sqlx::Error,
    },
}

/// A provisioned test namespace: a fresh role and database named after the
/// calling test, plus the config pointing at them.
pub struct TestEnv {
    pub config: ServerConfig,
}

impl TestEnv {
    /// Provision a namespace from the checked-in template
    /// `config.d/test.server.yml`.
    pub async fn new(test_name: &str) -> Result<Self, TestEnvError> {
        let template_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.d/test.server.yml");
        let template = ServerConfig::load(template_path)?;

        let namespace = rand_namespace(test_name);
        let postgres = provision(&template.postgres, &namespace).await?;

        Ok(Self {
            config: ServerConfig { postgres },
        })
    }
}

/// Create a role and database named `namespace`, owned by that role, and
/// return the template config rewritten to point at them.
///
/// Identifiers cannot be bound as statement parameters, so the names are
/// interpolated; they come from [`rand_namespace`], never from free-form
/// input.
pub async fn provision(template: &PgConfig, namespace: &str) -> Result<PgConfig, TestEnvError> {
    let admin_url = template
        .url
        .replace("HOST:PORT", ADMIN_ADDR)
        .replace("USER", ADMIN_USER)
        .replace("PASSWORD", ADMIN_PASSWORD)
        .replace("&dbname=DBNAME", "");

    let mut conn = PgConnection::connect(&admin_url)
        .await
        .map_err(|source| TestEnvError::Admin { source })?;

    let create_role = format!("CREATE ROLE {namespace} WITH LOGIN PASSWORD '{namespace}'");
    sqlx::query(&create_role)
        .execute(&mut conn)
        .await
        .map_err(|source| TestEnvError::Provision {
            what: "role",
            name: namespace.to_owned(),
            source,
        })?;

    let create_db = format!("CREATE DATABASE {namespace} WITH OWNER {namespace} CONNECTION LIMIT 10");
    sqlx::query(&create_db)
        .execute(&mut conn)
        .await
        .map_err(|source| TestEnvError::Provision {
            what: "database",
            name: namespace.to_owned(),
            source,
        })?;

    tracing::debug!(namespace, "created test role and database");

    let url = template
        .url
        .replace("HOST:PORT", ADMIN_ADDR)
        .replace("USER", namespace)
        .replace("PASSWORD", namespace)
        .replace("DBNAME", namespace);

    Ok(PgConfig {
        url,
        max_idle: template.max_idle,
        max_open: template.max_open,
    })
}

/// Build a namespace for a test: four random digits wrapped in underscores,
/// then the test name with path separators flattened, lower-cased, the
/// whole thing capped at [`NAMESPACE_LIMIT`] bytes.
pub fn rand_namespace(name: &str) -> String {
    let mut rng = rand::thread_rng();

    let mut ns = String::from("_");
    for _ in 0..4 {
        let digit: u8 = rng.gen_range(0..10);
        ns.push(char::from(b'0' + digit));
    }
    ns.push('_');
    ns.push_str(&name.replace('/', "_").to_lowercase());

    // Byte cap, backed off to a char boundary so non-ASCII names don't
    // panic the truncation.
    let mut limit = NAMESPACE_LIMIT.min(ns.len());
    while !ns.is_char_boundary(limit) {
        limit -= 1;
    }
    ns.truncate(limit);
    ns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_has_digit_prefix() {
        let ns = rand_namespace("some_test");
        let bytes = ns.as_bytes();

        assert_eq!(bytes[0], b'_');
        assert!(bytes[1..5].iter().all(u8::is_ascii_digit));
        assert_eq!(bytes[5], b'_');
        assert!(ns.ends_with("some_test"));
    }

    #[test]
    fn namespace_flattens_separators_and_case() {
        let ns = rand_namespace("Suite/WithSlash");
        assert!(ns.ends_with("suite_withslash"));
    }

    #[test]
    fn namespace_is_truncated() {
        let ns = rand_namespace("this_is_a_super_long_test_name_that_will_need_truncating");
        assert_eq!(ns.len(), 40);
    }

    #[test]
    fn namespace_truncation_respects_char_boundaries() {
        // "_DDDD_x" is 7 bytes, then two-byte chars land the 40-byte cap
        // mid-character; truncation must back off instead of panicking.
        let name = format!("x{}", "é".repeat(30));
        let ns = rand_namespace(&name);

        assert_eq!(ns.len(), 39);
        assert!(ns.is_char_boundary(ns.len()));
    }

    #[test]
    fn short_namespace_is_kept_whole() {
        let ns = rand_namespace("ok");
        assert_eq!(ns.len(), "_0000_ok".len());
    }
}
