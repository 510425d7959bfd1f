#![allow(dead_code)]

use std::sync::Arc;

use careslot_domain::{CalendarConfig, Config, DatabaseConfig, PaymentsConfig};
use careslot_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated database in a fresh temp dir.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("careslot.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn calendar_config(base_url: &str) -> CalendarConfig {
    CalendarConfig {
        api_base_url: base_url.to_string(),
        calendar_id: "clinic@example.com".to_string(),
        access_token: "test-token".to_string(),
        timeout_secs: 5,
    }
}

pub fn payments_config(base_url: &str) -> PaymentsConfig {
    PaymentsConfig {
        api_base_url: base_url.to_string(),
        secret_key: "sk_test_123".to_string(),
        timeout_secs: 5,
    }
}

/// Config pointing at a database inside `dir`, with no remote services.
pub fn local_config(dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: dir.path().join("careslot.db").to_string_lossy().into_owned(),
            pool_size: 2,
        },
        ..Config::default()
    }
}
