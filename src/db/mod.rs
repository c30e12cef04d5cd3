//! Database layer for the reviewer store.
//!
//! This module handles:
//! - Connection pool management with WAL mode
//! - Schema migrations
//! - Per-pull-request locking and the row-level queries the assignment
//!   engine runs inside its transactions

pub mod directory;
pub mod locks;
pub mod pool;
pub mod pull_requests;

use std::path::Path;
use thiserror::Error;

use locks::PrLockRegistry;
use pool::{DbPool, PoolSettings};

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Persistence handle passed to every engine operation.
///
/// Bundles the connection pool with the lock registry that serializes work
/// on a single pull request. Cloning is cheap and clones share both.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    pr_locks: PrLockRegistry,
}

impl Database {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            pr_locks: PrLockRegistry::new(),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn pr_locks(&self) -> &PrLockRegistry {
        &self.pr_locks
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Initialize the database: create the file if needed and run migrations.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
///
/// # Returns
/// A connection pool configured with WAL mode
pub async fn initialize(db_path: &Path) -> Result<DbPool, DbError> {
    initialize_with(db_path, &PoolSettings::default()).await
}

/// Like [`initialize`] with explicit pool settings.
pub async fn initialize_with(db_path: &Path, settings: &PoolSettings) -> Result<DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::Migration(format!("Failed to create database directory: {}", e))
            })?;
        }
    }

    let pool = pool::create_pool(db_path, settings).await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Migrations in application order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Run all pending database migrations.
async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        if applied.is_some() {
            continue;
        }

        log::info!("[db] Applying migration {}", name);

        for statement in parse_sql_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *conn)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Split a migration file into statements.
///
/// Skips `--` comments and only treats a semicolon as a terminator outside
/// parentheses, so `strftime('%s', 'now')` style defaults survive.
fn parse_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for line in sql.lines() {
        let code = match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        };

        for ch in code.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ';' if depth == 0 => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            current.push(' ');
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}
