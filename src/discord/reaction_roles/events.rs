// Raw reaction events. These fire for every message, cached or not, so the
// registry lookup is the only gate.

use crate::core::reaction_roles::{revoke_role, RevokeOutcome, RoleError};
use crate::discord::reaction_roles::member_roles::SerenityMemberRoles;
use crate::discord::reaction_roles::{emoji_key, verification};
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context};

/// Who reacted and where, if this is a guild reaction by someone else.
fn reaction_target(ctx: &Context, reaction: &serenity::Reaction) -> Option<(u64, u64)> {
    let user_id = reaction.user_id?;
    let guild_id = reaction.guild_id?;

    if user_id == ctx.cache.current_user().id {
        return None;
    }
    if reaction.member.as_ref().map_or(false, |m| m.user.bot) {
        return None;
    }
    Some((guild_id.get(), user_id.get()))
}

pub async fn handle_reaction_add(
    ctx: &Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<()> {
    let Some((guild_id, user_id)) = reaction_target(ctx, reaction) else {
        return Ok(());
    };

    let role_id = data
        .reaction_roles
        .resolve_reaction(reaction.message_id.get(), &emoji_key(&reaction.emoji))
        .await?;

    if let Some(role_id) = role_id {
        tracing::debug!(user_id, guild_id, role_id, "Tracked reaction added, sending verification DM");
        verification::send_prompt(ctx, user_id, guild_id, role_id).await;
    }
    Ok(())
}

pub async fn handle_reaction_remove(
    ctx: &Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<()> {
    let Some((guild_id, user_id)) = reaction_target(ctx, reaction) else {
        return Ok(());
    };

    let role_id = data
        .reaction_roles
        .resolve_reaction(reaction.message_id.get(), &emoji_key(&reaction.emoji))
        .await?;
    let Some(role_id) = role_id else {
        return Ok(());
    };

    let roles = SerenityMemberRoles::new(ctx.http.clone());
    match revoke_role(&roles, guild_id, user_id, role_id).await {
        Ok(RevokeOutcome::Revoked) => {
            tracing::info!(user_id, guild_id, role_id, "Reaction role revoked");
        }
        Ok(RevokeOutcome::NotHeld) => {}
        Err(e @ (RoleError::RoleNotFound(_) | RoleError::MemberNotFound(_))) => {
            tracing::warn!(user_id, guild_id, role_id, error = %e, "Reaction role target missing");
        }
        Err(e) => {
            tracing::error!(user_id, guild_id, role_id, error = %e, "Failed to revoke reaction role");
        }
    }
    Ok(())
}
