//! Common test utilities for integration tests.
//!
//! These tests run against a real PostgreSQL database. Point them at one
//! with `CDB_TEST_HOST` (plus optionally `CDB_TEST_PORT`,
//! `CDB_TEST_DATABASE`, `CDB_TEST_USER`, `CDB_TEST_PASSWORD`); every test
//! skips itself when `CDB_TEST_HOST` is unset. Each test provisions its own
//! schema so tests can run in parallel against one database.

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use persistence::config::DatabaseConfig;
use persistence::db;
use persistence::repositories::CustomerRepository;

/// Reads the test database configuration from the environment.
///
/// Returns `None` when `CDB_TEST_HOST` is unset, in which case the calling
/// test should return early.
pub fn test_database_config() -> Option<DatabaseConfig> {
    dotenvy::dotenv().ok();

    let host = std::env::var("CDB_TEST_HOST").ok()?;
    let port = std::env::var("CDB_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5432);
    let database =
        std::env::var("CDB_TEST_DATABASE").unwrap_or_else(|_| "customers_test".to_string());
    let user = std::env::var("CDB_TEST_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("CDB_TEST_PASSWORD").unwrap_or_else(|_| "postgres".to_string());

    Some(DatabaseConfig {
        host,
        port,
        database,
        user,
        password,
        default_schema: "public".to_string(),
    })
}

/// Generate a schema name unique to this test run.
pub fn unique_schema() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("cdb_test_{nanos}")
}

/// A repository opened against an isolated, freshly provisioned schema.
pub struct TestDb {
    pub repo: CustomerRepository,
    schema: String,
    config: DatabaseConfig,
}

impl TestDb {
    /// Provisions an isolated schema with fresh tables.
    ///
    /// Returns `None` when no test database is configured.
    pub async fn setup() -> Option<TestDb> {
        let config = test_database_config()?;
        let schema = unique_schema();

        execute(&config, &format!("CREATE SCHEMA \"{schema}\"")).await;

        let mut repo = CustomerRepository::open(&config)
            .await
            .expect("Failed to open repository");
        repo.set_schema(Some(&schema))
            .await
            .expect("Failed to select test schema");
        repo.create_tables()
            .await
            .expect("Failed to create tables");

        Some(TestDb {
            repo,
            schema,
            config,
        })
    }

    /// Drops the test schema and closes the connection.
    pub async fn teardown(self) {
        let TestDb {
            repo,
            schema,
            config,
        } = self;
        repo.close().await.ok();
        execute(&config, &format!("DROP SCHEMA \"{schema}\" CASCADE")).await;
    }
}

/// Runs one DDL statement over a short-lived admin connection.
async fn execute(config: &DatabaseConfig, sql: &str) {
    let mut conn = db::connect(config)
        .await
        .expect("Failed to connect to test database");
    sqlx::query(sql)
        .execute(&mut conn)
        .await
        .expect("Failed to run test DDL");
}
