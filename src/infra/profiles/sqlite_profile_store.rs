// SQLite-backed profile store.
//
// Tables:
// - user_profiles: one row per registered user
// - admin_info: warning count and memo, created alongside the profile

use crate::core::profiles::{
    AdminInfo, ProfileError, ProfileInput, ProfileStore, RegistrationOutcome, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteProfileStore {
    pool: Pool<Sqlite>,
}

fn storage_err(e: sqlx::Error) -> ProfileError {
    ProfileError::StorageError(e.to_string())
}

impl SqliteProfileStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ProfileError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                display_name TEXT NOT NULL,
                birth_year TEXT NOT NULL,
                gender TEXT NOT NULL,
                region TEXT NOT NULL,
                registered_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admin_info (
                user_id INTEGER PRIMARY KEY,
                warning_count INTEGER NOT NULL DEFAULT 0,
                admin_memo TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES user_profiles (user_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn upsert_profile(
        &self,
        user_id: u64,
        input: &ProfileInput,
    ) -> Result<RegistrationOutcome, ProfileError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let updated = sqlx::query(
            r#"
            UPDATE user_profiles
            SET username = ?, display_name = ?, birth_year = ?, gender = ?, region = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&input.username)
        .bind(&input.display_name)
        .bind(&input.birth_year)
        .bind(&input.gender)
        .bind(&input.region)
        .bind(now)
        .bind(user_id as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .rows_affected();

        let outcome = if updated > 0 {
            RegistrationOutcome::Updated
        } else {
            sqlx::query(
                r#"
                INSERT INTO user_profiles
                    (user_id, username, display_name, birth_year, gender, region, registered_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id as i64)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(&input.birth_year)
            .bind(&input.gender)
            .bind(&input.region)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

            sqlx::query(
                r#"
                INSERT OR IGNORE INTO admin_info (user_id, warning_count, admin_memo, updated_at)
                VALUES (?, 0, '', ?)
                "#,
            )
            .bind(user_id as i64)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

            RegistrationOutcome::Created
        };

        tx.commit().await.map_err(storage_err)?;
        Ok(outcome)
    }

    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, ProfileError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, ProfileError> {
        let rows = sqlx::query("SELECT * FROM user_profiles ORDER BY display_name ASC, user_id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn get_admin_info(&self, user_id: u64) -> Result<Option<AdminInfo>, ProfileError> {
        let row = sqlx::query("SELECT * FROM admin_info WHERE user_id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.map(|row| AdminInfo {
            user_id,
            warning_count: row.get::<i64, _>("warning_count").max(0) as u32,
            admin_memo: row.get("admin_memo"),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn apply_warning_delta(
        &self,
        user_id: u64,
        delta: i64,
    ) -> Result<Option<u32>, ProfileError> {
        let row = sqlx::query(
            r#"
            UPDATE admin_info
            SET warning_count = MAX(0, warning_count + ?), updated_at = ?
            WHERE user_id = ?
            RETURNING warning_count
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(|row| row.get::<i64, _>(0) as u32))
    }

    async fn set_memo(&self, user_id: u64, memo: &str) -> Result<bool, ProfileError> {
        let result = sqlx::query(
            "UPDATE admin_info SET admin_memo = ?, updated_at = ? WHERE user_id = ?",
        )
        .bind(memo)
        .bind(Utc::now())
        .bind(user_id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> UserProfile {
    UserProfile {
        user_id: row.get::<i64, _>("user_id") as u64,
        username: row.get("username"),
        display_name: row.get("display_name"),
        birth_year: row.get("birth_year"),
        gender: row.get("gender"),
        region: row.get("region"),
        registered_at: row.get("registered_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::{connect, memory_pool};

    async fn store() -> SqliteProfileStore {
        let store = SqliteProfileStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    fn input(name: &str, region: &str) -> ProfileInput {
        ProfileInput::new(&format!("{}#0", name), name, "2000", "Other", region).unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_then_updates() {
        let store = store().await;

        let created = store.upsert_profile(1, &input("alice", "Seoul")).await.unwrap();
        let first = store.get_profile(1).await.unwrap().unwrap();
        let updated = store.upsert_profile(1, &input("alice2", "Busan")).await.unwrap();
        let second = store.get_profile(1).await.unwrap().unwrap();

        assert_eq!(created, RegistrationOutcome::Created);
        assert_eq!(updated, RegistrationOutcome::Updated);
        assert_eq!(second.display_name, "alice2");
        assert_eq!(second.region, "Busan");
        assert_eq!(second.registered_at, first.registered_at);
        assert_eq!(store.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_info_created_with_profile() {
        let store = store().await;
        store.upsert_profile(5, &input("bob", "Seoul")).await.unwrap();

        let info = store.get_admin_info(5).await.unwrap().unwrap();
        assert_eq!(info.warning_count, 0);
        assert_eq!(info.admin_memo, "");
    }

    #[tokio::test]
    async fn test_warning_delta_floors_at_zero() {
        let store = store().await;
        store.upsert_profile(5, &input("bob", "Seoul")).await.unwrap();

        assert_eq!(store.apply_warning_delta(5, 3).await.unwrap(), Some(3));
        assert_eq!(store.apply_warning_delta(5, -10).await.unwrap(), Some(0));
        assert_eq!(store.apply_warning_delta(5, 2).await.unwrap(), Some(2));
        assert_eq!(store.apply_warning_delta(99, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memo_requires_admin_row() {
        let store = store().await;
        store.upsert_profile(5, &input("bob", "Seoul")).await.unwrap();

        assert!(store.set_memo(5, "late to events").await.unwrap());
        assert!(!store.set_memo(6, "nobody").await.unwrap());
        assert_eq!(
            store.get_admin_info(5).await.unwrap().unwrap().admin_memo,
            "late to events"
        );
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_display_name() {
        let store = store().await;
        store.upsert_profile(1, &input("charlie", "Seoul")).await.unwrap();
        store.upsert_profile(2, &input("alice", "Seoul")).await.unwrap();
        store.upsert_profile(3, &input("bob", "Seoul")).await.unwrap();

        let names: Vec<_> = store
            .list_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
    }

    #[tokio::test]
    async fn test_profiles_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bot.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteProfileStore::new(connect(path).await.unwrap());
            store.migrate().await.unwrap();
            store.upsert_profile(8, &input("dana", "Daegu")).await.unwrap();
        }

        let store = SqliteProfileStore::new(connect(path).await.unwrap());
        store.migrate().await.unwrap();
        let profile = store.get_profile(8).await.unwrap().unwrap();
        assert_eq!(profile.region, "Daegu");
    }
}
