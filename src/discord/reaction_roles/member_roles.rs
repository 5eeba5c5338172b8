// `MemberRoles` over the Discord REST API.

use crate::core::reaction_roles::{MemberRoles, RoleError};
use crate::discord::api_errors::{classify, ApiFailure};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const AUDIT_REASON: &str = "Reaction role";

pub struct SerenityMemberRoles {
    http: Arc<serenity::Http>,
}

impl SerenityMemberRoles {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

fn role_error(err: serenity::Error, role_id: u64) -> RoleError {
    match classify(&err) {
        ApiFailure::NotFound => RoleError::RoleNotFound(role_id),
        ApiFailure::Forbidden => RoleError::Forbidden(role_id),
        ApiFailure::Other => RoleError::Api(err.to_string()),
    }
}

#[async_trait]
impl MemberRoles for SerenityMemberRoles {
    async fn has_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<bool, RoleError> {
        let member = self
            .http
            .get_member(serenity::GuildId::new(guild_id), serenity::UserId::new(user_id))
            .await
            .map_err(|e| match classify(&e) {
                ApiFailure::NotFound => RoleError::MemberNotFound(user_id),
                _ => RoleError::Api(e.to_string()),
            })?;

        Ok(member.roles.contains(&serenity::RoleId::new(role_id)))
    }

    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError> {
        self.http
            .add_member_role(
                serenity::GuildId::new(guild_id),
                serenity::UserId::new(user_id),
                serenity::RoleId::new(role_id),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(|e| role_error(e, role_id))
    }

    async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), RoleError> {
        self.http
            .remove_member_role(
                serenity::GuildId::new(guild_id),
                serenity::UserId::new(user_id),
                serenity::RoleId::new(role_id),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(|e| role_error(e, role_id))
    }
}
