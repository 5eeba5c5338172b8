// SQLite-backed reaction-role registry.

use crate::core::reaction_roles::{ReactionRoleError, ReactionRoleMapping, ReactionRoleStore};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteReactionRoleStore {
    pool: Pool<Sqlite>,
}

fn storage_err(e: sqlx::Error) -> ReactionRoleError {
    ReactionRoleError::StorageError(e.to_string())
}

impl SqliteReactionRoleStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), ReactionRoleError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reaction_roles (
                reaction_id TEXT PRIMARY KEY,
                message_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                emoji TEXT NOT NULL,
                role_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_reaction_message
            ON reaction_roles(message_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl ReactionRoleStore for SqliteReactionRoleStore {
    async fn reaction_id_exists(&self, reaction_id: &str) -> Result<bool, ReactionRoleError> {
        let row = sqlx::query("SELECT 1 FROM reaction_roles WHERE reaction_id = ?")
            .bind(reaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.is_some())
    }

    async fn insert_mapping(&self, mapping: &ReactionRoleMapping) -> Result<(), ReactionRoleError> {
        sqlx::query(
            r#"
            INSERT INTO reaction_roles
                (reaction_id, message_id, channel_id, emoji, role_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&mapping.reaction_id)
        .bind(mapping.message_id as i64)
        .bind(mapping.channel_id as i64)
        .bind(&mapping.emoji)
        .bind(mapping.role_id as i64)
        .bind(mapping.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn delete_mapping(&self, reaction_id: &str) -> Result<bool, ReactionRoleError> {
        let result = sqlx::query("DELETE FROM reaction_roles WHERE reaction_id = ?")
            .bind(reaction_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_mapping(
        &self,
        reaction_id: &str,
    ) -> Result<Option<ReactionRoleMapping>, ReactionRoleError> {
        let row = sqlx::query("SELECT * FROM reaction_roles WHERE reaction_id = ?")
            .bind(reaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_mapping))
    }

    async fn role_for(&self, message_id: u64, emoji: &str) -> Result<Option<u64>, ReactionRoleError> {
        let row = sqlx::query(
            "SELECT role_id FROM reaction_roles WHERE message_id = ? AND emoji = ? LIMIT 1",
        )
        .bind(message_id as i64)
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(|row| row.get::<i64, _>(0) as u64))
    }

    async fn is_tracked_message(&self, message_id: u64) -> Result<bool, ReactionRoleError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reaction_roles WHERE message_id = ?")
            .bind(message_id as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(count > 0)
    }

    async fn all_mappings(&self) -> Result<Vec<ReactionRoleMapping>, ReactionRoleError> {
        let rows = sqlx::query("SELECT * FROM reaction_roles ORDER BY reaction_id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_mapping).collect())
    }
}

fn row_to_mapping(row: &sqlx::sqlite::SqliteRow) -> ReactionRoleMapping {
    ReactionRoleMapping {
        reaction_id: row.get("reaction_id"),
        message_id: row.get::<i64, _>("message_id") as u64,
        channel_id: row.get::<i64, _>("channel_id") as u64,
        emoji: row.get("emoji"),
        role_id: row.get::<i64, _>("role_id") as u64,
        created_at: row.get("created_at"),
    }
}
