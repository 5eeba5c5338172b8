// Profile service - registration plus the admin-only warning/memo metadata.
//
// NO Discord dependencies here. The Discord layer resolves users into ids
// and hands them to this service.

use super::profile_models::{
    AdminInfo, ProfileInput, ProfilePage, RegistrationOutcome, UserProfile,
};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("No profile registered for user {0}")]
    NotFound(u64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or update a profile. New profiles get an AdminInfo row with
    /// zero warnings in the same transaction.
    async fn upsert_profile(
        &self,
        user_id: u64,
        input: &ProfileInput,
    ) -> Result<RegistrationOutcome, ProfileError>;

    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, ProfileError>;

    /// All profiles ordered by display name.
    async fn list_profiles(&self) -> Result<Vec<UserProfile>, ProfileError>;

    async fn get_admin_info(&self, user_id: u64) -> Result<Option<AdminInfo>, ProfileError>;

    /// Apply `delta` to the warning count, flooring at zero.
    /// Returns the new count, or `None` if the user has no admin row.
    async fn apply_warning_delta(&self, user_id: u64, delta: i64)
        -> Result<Option<u32>, ProfileError>;

    /// Returns `false` if the user has no admin row.
    async fn set_memo(&self, user_id: u64, memo: &str) -> Result<bool, ProfileError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ProfileService<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn register_profile(
        &self,
        user_id: u64,
        input: ProfileInput,
    ) -> Result<RegistrationOutcome, ProfileError> {
        let outcome = self.store.upsert_profile(user_id, &input).await?;
        tracing::info!(user_id, ?outcome, "Profile registered");
        Ok(outcome)
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, ProfileError> {
        self.store.get_profile(user_id).await
    }

    pub async fn get_admin_info(&self, user_id: u64) -> Result<Option<AdminInfo>, ProfileError> {
        self.store.get_admin_info(user_id).await
    }

    pub async fn profile_page(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<ProfilePage, ProfileError> {
        let profiles = self.store.list_profiles().await?;
        Ok(ProfilePage::paginate(profiles, page, per_page))
    }

    /// Add `count` warnings. Returns the new total.
    pub async fn add_warning(&self, user_id: u64, count: u32) -> Result<u32, ProfileError> {
        self.change_warnings(user_id, count, 1).await
    }

    /// Remove `count` warnings, never going below zero. Returns the new total.
    pub async fn remove_warning(&self, user_id: u64, count: u32) -> Result<u32, ProfileError> {
        self.change_warnings(user_id, count, -1).await
    }

    async fn change_warnings(
        &self,
        user_id: u64,
        count: u32,
        sign: i64,
    ) -> Result<u32, ProfileError> {
        if count == 0 {
            return Err(ProfileError::Validation(
                "warning count must be at least 1".to_string(),
            ));
        }

        self.require_profile(user_id).await?;

        let total = self
            .store
            .apply_warning_delta(user_id, sign * i64::from(count))
            .await?
            .ok_or(ProfileError::NotFound(user_id))?;

        tracing::info!(user_id, delta = sign * i64::from(count), total, "Warnings updated");
        Ok(total)
    }

    pub async fn set_memo(&self, user_id: u64, memo: &str) -> Result<(), ProfileError> {
        self.require_profile(user_id).await?;

        if !self.store.set_memo(user_id, memo.trim()).await? {
            return Err(ProfileError::NotFound(user_id));
        }
        Ok(())
    }

    async fn require_profile(&self, user_id: u64) -> Result<UserProfile, ProfileError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(ProfileError::NotFound(user_id))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use dashmap::DashMap;

    /// In-memory store for testing
    #[derive(Default)]
    pub(crate) struct MockProfileStore {
        profiles: DashMap<u64, UserProfile>,
        admin: DashMap<u64, AdminInfo>,
    }

    #[async_trait]
    impl ProfileStore for MockProfileStore {
        async fn upsert_profile(
            &self,
            user_id: u64,
            input: &ProfileInput,
        ) -> Result<RegistrationOutcome, ProfileError> {
            let now = Utc::now();
            if let Some(mut existing) = self.profiles.get_mut(&user_id) {
                existing.username = input.username.clone();
                existing.display_name = input.display_name.clone();
                existing.birth_year = input.birth_year.clone();
                existing.gender = input.gender.clone();
                existing.region = input.region.clone();
                existing.updated_at = now;
                return Ok(RegistrationOutcome::Updated);
            }

            self.profiles.insert(
                user_id,
                UserProfile {
                    user_id,
                    username: input.username.clone(),
                    display_name: input.display_name.clone(),
                    birth_year: input.birth_year.clone(),
                    gender: input.gender.clone(),
                    region: input.region.clone(),
                    registered_at: now,
                    updated_at: now,
                },
            );
            self.admin.insert(
                user_id,
                AdminInfo {
                    user_id,
                    warning_count: 0,
                    admin_memo: String::new(),
                    updated_at: now,
                },
            );
            Ok(RegistrationOutcome::Created)
        }

        async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, ProfileError> {
            Ok(self.profiles.get(&user_id).map(|p| p.clone()))
        }

        async fn list_profiles(&self) -> Result<Vec<UserProfile>, ProfileError> {
            let mut all: Vec<_> = self.profiles.iter().map(|p| p.clone()).collect();
            all.sort_by(|a, b| a.display_name.cmp(&b.display_name));
            Ok(all)
        }

        async fn get_admin_info(&self, user_id: u64) -> Result<Option<AdminInfo>, ProfileError> {
            Ok(self.admin.get(&user_id).map(|a| a.clone()))
        }

        async fn apply_warning_delta(
            &self,
            user_id: u64,
            delta: i64,
        ) -> Result<Option<u32>, ProfileError> {
            Ok(self.admin.get_mut(&user_id).map(|mut info| {
                info.warning_count = (i64::from(info.warning_count) + delta).max(0) as u32;
                info.warning_count
            }))
        }

        async fn set_memo(&self, user_id: u64, memo: &str) -> Result<bool, ProfileError> {
            Ok(self
                .admin
                .get_mut(&user_id)
                .map(|mut info| info.admin_memo = memo.to_string())
                .is_some())
        }
    }

    pub(crate) fn input(name: &str) -> ProfileInput {
        ProfileInput::new(&format!("{}#0001", name), name, "2001", "Other", "Seoul").unwrap()
    }

    #[tokio::test]
    async fn test_register_twice_updates_in_place() {
        let service = ProfileService::new(MockProfileStore::default());

        let first = service.register_profile(7, input("alpha")).await.unwrap();
        let second = service.register_profile(7, input("beta")).await.unwrap();

        assert_eq!(first, RegistrationOutcome::Created);
        assert_eq!(second, RegistrationOutcome::Updated);

        let page = service.profile_page(1, 15).await.unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].display_name, "beta");
    }

    #[tokio::test]
    async fn test_warning_count_floors_at_zero() {
        let service = ProfileService::new(MockProfileStore::default());
        service.register_profile(1, input("w")).await.unwrap();

        // (op, count, expected running total)
        let steps: [(i8, u32, u32); 6] = [
            (1, 2, 2),
            (-1, 5, 0),
            (1, 1, 1),
            (1, 3, 4),
            (-1, 1, 3),
            (-1, 10, 0),
        ];

        for (sign, count, expected) in steps {
            let total = if sign > 0 {
                service.add_warning(1, count).await.unwrap()
            } else {
                service.remove_warning(1, count).await.unwrap()
            };
            assert_eq!(total, expected);
        }
    }

    #[tokio::test]
    async fn test_warnings_require_profile() {
        let service = ProfileService::new(MockProfileStore::default());

        let err = service.add_warning(42, 1).await.unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(42)));

        let err = service.set_memo(42, "note").await.unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(42)));

        // No profile was created as a side effect
        assert!(service.get_profile(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_warning_count_rejected() {
        let service = ProfileService::new(MockProfileStore::default());
        service.register_profile(1, input("z")).await.unwrap();

        let err = service.add_warning(1, 0).await.unwrap_err();
        assert!(matches!(err, ProfileError::Validation(_)));
    }

    #[tokio::test]
    async fn test_memo_is_stored() {
        let service = ProfileService::new(MockProfileStore::default());
        service.register_profile(3, input("m")).await.unwrap();

        service.set_memo(3, "  watch this one  ").await.unwrap();

        let info = service.get_admin_info(3).await.unwrap().unwrap();
        assert_eq!(info.admin_memo, "watch this one");
    }
}
