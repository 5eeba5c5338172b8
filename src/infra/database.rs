// Shared SQLite pool. Every store borrows short-lived connections from it.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Open (creating if needed) the database file at `path`.
pub async fn connect(path: &str) -> anyhow::Result<Pool<Sqlite>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // sqlx turns foreign keys on for every connection by default.
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}?mode=rwc", path))
        .await?;

    Ok(pool)
}

/// Single-connection in-memory pool for tests.
#[cfg(test)]
pub async fn memory_pool() -> Pool<Sqlite> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}
