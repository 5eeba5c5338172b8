use crate::core::logging::ServerSettingsStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

impl SqliteSettingsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS server_settings (
                guild_id INTEGER PRIMARY KEY,
                log_channel_id INTEGER,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ServerSettingsStore for SqliteSettingsStore {
    async fn get_log_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        let row = sqlx::query("SELECT log_channel_id FROM server_settings WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .and_then(|row| row.get::<Option<i64>, _>("log_channel_id"))
            .map(|id| id as u64))
    }

    async fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO server_settings (guild_id, log_channel_id, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                log_channel_id = excluded.log_channel_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(guild_id as i64)
        .bind(channel_id as i64)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::memory_pool;

    #[tokio::test]
    async fn test_log_channel_upsert() {
        let store = SqliteSettingsStore::new(memory_pool().await);
        store.migrate().await.unwrap();

        assert_eq!(store.get_log_channel(10).await.unwrap(), None);

        store.set_log_channel(10, 555).await.unwrap();
        store.set_log_channel(10, 556).await.unwrap();
        assert_eq!(store.get_log_channel(10).await.unwrap(), Some(556));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM server_settings")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = SqliteSettingsStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }
}
