//! Database module for handling SQLite connections and operations
//!
//! This module provides connection pooling, configuration, health checks,
//! and the smoke-test table bootstrap for the SQLite database backing the
//! application.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::env;
use tracing::info;

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    pub fn from_env() -> DatabaseResult<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data.db?mode=rwc".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

/// Initialize a SQLite connection pool
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<SqlitePool>` - SQLite connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(DatabaseError::Connection)?;

    Ok(pool)
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - SQLite connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if connection is successful, false otherwise
pub async fn health_check(pool: &SqlitePool) -> DatabaseResult<bool> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DatabaseError::Query)?;

    Ok(true)
}

/// Create the smoke-test table and insert its marker record when empty
///
/// The table exists so the API can verify end-to-end database access at
/// runtime. Initialization is idempotent across restarts.
pub async fn init_smoke_table(pool: &SqlitePool) -> DatabaseResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS test_table (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DatabaseError::Query)?;

    let row = sqlx::query("SELECT COUNT(*) as count FROM test_table")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::Query)?;
    let count: i64 = row.get("count");

    if count == 0 {
        info!("Seeding smoke-test table");
        sqlx::query("INSERT INTO test_table (message) VALUES (?)")
            .bind("Database initialized successfully")
            .execute(pool)
            .await
            .map_err(DatabaseError::Query)?;
    }

    Ok(())
}
