// Reaction-role registry - maps (message, emoji) pairs to roles.
//
// Admins refer to mappings by a short generated id instead of the raw
// message id, so one message can carry several emoji -> role mappings.
//
// Granting and revoking roles goes through the `MemberRoles` port so the
// registry never touches Discord types directly.

use super::reaction_role_models::{generate_reaction_id, normalize_emoji, ReactionRoleMapping};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ReactionRoleError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Role {0} does not exist")]
    RoleNotFound(u64),

    #[error("Member {0} is not in the server")]
    MemberNotFound(u64),

    #[error("Missing permission to manage role {0}")]
    Forbidden(u64),

    #[error("Discord API error: {0}")]
    Api(String),
}

// ============================================================================
// PORTS
// ============================================================================

#[async_trait]
pub trait ReactionRoleStore: Send + Sync {
    async fn reaction_id_exists(&self, reaction_id: &str) -> Result<bool, ReactionRoleError>;

    async fn insert_mapping(&self, mapping: &ReactionRoleMapping) -> Result<(), ReactionRoleError>;

    /// Returns whether a row was deleted.
    async fn delete_mapping(&self, reaction_id: &str) -> Result<bool, ReactionRoleError>;

    async fn get_mapping(
        &self,
        reaction_id: &str,
    ) -> Result<Option<ReactionRoleMapping>, ReactionRoleError>;

    async fn role_for(&self, message_id: u64, emoji: &str) -> Result<Option<u64>, ReactionRoleError>;

    async fn is_tracked_message(&self, message_id: u64) -> Result<bool, ReactionRoleError>;

    async fn all_mappings(&self) -> Result<Vec<ReactionRoleMapping>, ReactionRoleError>;
}

/// Role membership operations for a single guild member.
#[async_trait]
pub trait MemberRoles: Send + Sync {
    async fn has_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<bool, RoleError>;
    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError>;
    async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    AlreadyHeld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NotHeld,
}

/// Grant `role_id` unless the member already has it.
pub async fn grant_role<G: MemberRoles + ?Sized>(
    gate: &G,
    guild_id: u64,
    user_id: u64,
    role_id: u64,
) -> Result<GrantOutcome, RoleError> {
    if gate.has_role(guild_id, user_id, role_id).await? {
        return Ok(GrantOutcome::AlreadyHeld);
    }

    gate.add_role(guild_id, user_id, role_id).await?;
    tracing::info!(guild_id, user_id, role_id, "Reaction role granted");
    Ok(GrantOutcome::Granted)
}

/// Revoke `role_id` if the member currently has it.
pub async fn revoke_role<G: MemberRoles + ?Sized>(
    gate: &G,
    guild_id: u64,
    user_id: u64,
    role_id: u64,
) -> Result<RevokeOutcome, RoleError> {
    if !gate.has_role(guild_id, user_id, role_id).await? {
        return Ok(RevokeOutcome::NotHeld);
    }

    gate.remove_role(guild_id, user_id, role_id).await?;
    tracing::info!(guild_id, user_id, role_id, "Reaction role revoked");
    Ok(RevokeOutcome::Revoked)
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ReactionRoleService<S: ReactionRoleStore> {
    store: S,
}

impl<S: ReactionRoleStore> ReactionRoleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a mapping and return its generated id.
    pub async fn add_mapping(
        &self,
        message_id: u64,
        channel_id: u64,
        emoji: &str,
        role_id: u64,
    ) -> Result<String, ReactionRoleError> {
        let reaction_id = loop {
            let candidate = generate_reaction_id(&mut rand::thread_rng());
            if !self.store.reaction_id_exists(&candidate).await? {
                break candidate;
            }
            tracing::debug!(candidate, "Reaction id collision, regenerating");
        };

        let mapping = ReactionRoleMapping {
            reaction_id: reaction_id.clone(),
            message_id,
            channel_id,
            emoji: normalize_emoji(emoji),
            role_id,
            created_at: chrono::Utc::now(),
        };
        self.store.insert_mapping(&mapping).await?;

        tracing::info!(
            reaction_id = %mapping.reaction_id,
            message_id,
            emoji = %mapping.emoji,
            role_id,
            "Reaction role mapping added"
        );
        Ok(reaction_id)
    }

    /// Returns `false` when no mapping had that id.
    pub async fn remove_mapping(&self, reaction_id: &str) -> Result<bool, ReactionRoleError> {
        let removed = self.store.delete_mapping(reaction_id.trim()).await?;
        if removed {
            tracing::info!(reaction_id, "Reaction role mapping removed");
        }
        Ok(removed)
    }

    pub async fn get_mapping(
        &self,
        reaction_id: &str,
    ) -> Result<Option<ReactionRoleMapping>, ReactionRoleError> {
        self.store.get_mapping(reaction_id.trim()).await
    }

    pub async fn role_for(&self, message_id: u64, emoji: &str) -> Result<Option<u64>, ReactionRoleError> {
        self.store.role_for(message_id, &normalize_emoji(emoji)).await
    }

    pub async fn is_tracked_message(&self, message_id: u64) -> Result<bool, ReactionRoleError> {
        self.store.is_tracked_message(message_id).await
    }

    /// Role to act on for a reaction event, or `None` if the reaction is not
    /// one we manage.
    pub async fn resolve_reaction(
        &self,
        message_id: u64,
        emoji: &str,
    ) -> Result<Option<u64>, ReactionRoleError> {
        if !self.is_tracked_message(message_id).await? {
            return Ok(None);
        }
        self.role_for(message_id, emoji).await
    }

    pub async fn list_all(&self) -> Result<BTreeMap<String, ReactionRoleMapping>, ReactionRoleError> {
        Ok(self
            .store
            .all_mappings()
            .await?
            .into_iter()
            .map(|m| (m.reaction_id.clone(), m))
            .collect())
    }

    /// Mappings grouped by channel, each group ordered by reaction id.
    pub async fn mappings_by_channel(
        &self,
    ) -> Result<BTreeMap<u64, Vec<ReactionRoleMapping>>, ReactionRoleError> {
        let mut grouped: BTreeMap<u64, Vec<ReactionRoleMapping>> = BTreeMap::new();
        for mapping in self.list_all().await?.into_values() {
            grouped.entry(mapping.channel_id).or_default().push(mapping);
        }
        Ok(grouped)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::profiles::profile_service::tests::{input, MockProfileStore};
    use crate::core::profiles::ProfileService;
    use dashmap::{DashMap, DashSet};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store for testing
    #[derive(Default)]
    pub(crate) struct MockReactionStore {
        mappings: DashMap<String, ReactionRoleMapping>,
        /// Pretend this many freshly generated ids already exist.
        forced_collisions: AtomicUsize,
        exists_calls: AtomicUsize,
    }

    #[async_trait]
    impl ReactionRoleStore for MockReactionStore {
        async fn reaction_id_exists(&self, reaction_id: &str) -> Result<bool, ReactionRoleError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            let forced = self
                .forced_collisions
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            Ok(forced || self.mappings.contains_key(reaction_id))
        }

        async fn insert_mapping(&self, mapping: &ReactionRoleMapping) -> Result<(), ReactionRoleError> {
            self.mappings
                .insert(mapping.reaction_id.clone(), mapping.clone());
            Ok(())
        }

        async fn delete_mapping(&self, reaction_id: &str) -> Result<bool, ReactionRoleError> {
            Ok(self.mappings.remove(reaction_id).is_some())
        }

        async fn get_mapping(
            &self,
            reaction_id: &str,
        ) -> Result<Option<ReactionRoleMapping>, ReactionRoleError> {
            Ok(self.mappings.get(reaction_id).map(|m| m.clone()))
        }

        async fn role_for(&self, message_id: u64, emoji: &str) -> Result<Option<u64>, ReactionRoleError> {
            Ok(self
                .mappings
                .iter()
                .find(|m| m.message_id == message_id && m.emoji == emoji)
                .map(|m| m.role_id))
        }

        async fn is_tracked_message(&self, message_id: u64) -> Result<bool, ReactionRoleError> {
            Ok(self.mappings.iter().any(|m| m.message_id == message_id))
        }

        async fn all_mappings(&self) -> Result<Vec<ReactionRoleMapping>, ReactionRoleError> {
            Ok(self.mappings.iter().map(|m| m.clone()).collect())
        }
    }

    /// In-memory guild members for testing the grant/revoke flow.
    #[derive(Default)]
    pub(crate) struct MockMemberRoles {
        held: DashSet<(u64, u64, u64)>,
        known_roles: DashSet<u64>,
    }

    impl MockMemberRoles {
        pub(crate) fn with_roles(roles: &[u64]) -> Self {
            let gate = Self::default();
            for role in roles {
                gate.known_roles.insert(*role);
            }
            gate
        }
    }

    #[async_trait]
    impl MemberRoles for MockMemberRoles {
        async fn has_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<bool, RoleError> {
            Ok(self.held.contains(&(guild_id, user_id, role_id)))
        }

        async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError> {
            if !self.known_roles.contains(&role_id) {
                return Err(RoleError::RoleNotFound(role_id));
            }
            self.held.insert((guild_id, user_id, role_id));
            Ok(())
        }

        async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError> {
            self.held.remove(&(guild_id, user_id, role_id));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ids_unique_over_many_allocations() {
        let service = ReactionRoleService::new(MockReactionStore::default());

        let mut seen = HashSet::new();
        for i in 0..10_000u64 {
            let id = service.add_mapping(i, 1, "✅", 5).await.unwrap();
            assert!(seen.insert(id), "duplicate reaction id at allocation {}", i);
        }
        assert_eq!(service.list_all().await.unwrap().len(), 10_000);
    }

    #[tokio::test]
    async fn test_collision_triggers_regeneration() {
        let store = MockReactionStore::default();
        store.forced_collisions.store(3, Ordering::SeqCst);
        let service = ReactionRoleService::new(store);

        let id = service.add_mapping(1, 2, "✅", 3).await.unwrap();

        assert_eq!(service.store.exists_calls.load(Ordering::SeqCst), 4);
        assert!(service.get_mapping(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_returns_false() {
        let service = ReactionRoleService::new(MockReactionStore::default());

        assert!(!service.remove_mapping("ZZZZZZ").await.unwrap());

        let id = service.add_mapping(1, 2, "✅", 3).await.unwrap();
        assert!(service.remove_mapping(&id).await.unwrap());
        assert!(!service.remove_mapping(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_reaction_normalizes_custom_emoji() {
        let service = ReactionRoleService::new(MockReactionStore::default());
        service.add_mapping(10, 1, "<:party:42>", 7).await.unwrap();
        service.add_mapping(10, 1, "✅", 8).await.unwrap();

        assert_eq!(service.resolve_reaction(10, "<a:party:42>").await.unwrap(), Some(7));
        assert_eq!(service.resolve_reaction(10, "✅").await.unwrap(), Some(8));
        assert_eq!(service.resolve_reaction(10, "❌").await.unwrap(), None);
        assert_eq!(service.resolve_reaction(11, "✅").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mappings_grouped_by_channel() {
        let service = ReactionRoleService::new(MockReactionStore::default());
        service.add_mapping(1, 100, "✅", 1).await.unwrap();
        service.add_mapping(2, 200, "✅", 2).await.unwrap();
        service.add_mapping(3, 100, "👍", 3).await.unwrap();

        let grouped = service.mappings_by_channel().await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&100].len(), 2);
        assert_eq!(grouped[&200].len(), 1);
    }

    #[tokio::test]
    async fn test_grant_then_revoke_leaves_member_without_role() {
        let registry = ReactionRoleService::new(MockReactionStore::default());
        let profiles = ProfileService::new(MockProfileStore::default());
        let gate = MockMemberRoles::with_roles(&[55]);
        let (guild, user, message) = (1, 2, 3);

        registry.add_mapping(message, 9, "✅", 55).await.unwrap();

        // Reaction added: resolve, register the profile, grant
        let role = registry.resolve_reaction(message, "✅").await.unwrap().unwrap();
        profiles.register_profile(user, input("member")).await.unwrap();
        assert_eq!(grant_role(&gate, guild, user, role).await.unwrap(), GrantOutcome::Granted);
        assert_eq!(
            grant_role(&gate, guild, user, role).await.unwrap(),
            GrantOutcome::AlreadyHeld
        );
        assert!(gate.has_role(guild, user, role).await.unwrap());

        // Reaction removed: resolve again, revoke
        let role = registry.resolve_reaction(message, "✅").await.unwrap().unwrap();
        assert_eq!(revoke_role(&gate, guild, user, role).await.unwrap(), RevokeOutcome::Revoked);
        assert!(!gate.has_role(guild, user, role).await.unwrap());
        assert_eq!(revoke_role(&gate, guild, user, role).await.unwrap(), RevokeOutcome::NotHeld);
    }

    #[tokio::test]
    async fn test_grant_unknown_role_errors() {
        let gate = MockMemberRoles::with_roles(&[]);
        let err = grant_role(&gate, 1, 2, 3).await.unwrap_err();
        assert!(matches!(err, RoleError::RoleNotFound(3)));
    }
}
