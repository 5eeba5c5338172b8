// Warning commands. Warnings live in the admin info row next to a profile,
// so both commands refuse members who never registered.

use crate::core::profiles::ProfileError;
use crate::discord::embeds::{self, error_reply};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Add warnings to a member.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn add_warning(
    ctx: Context<'_>,
    #[description = "Member to warn"] user: serenity::User,
    #[description = "Number of warnings to add (default 1)"]
    #[min = 1]
    count: Option<u32>,
) -> Result<(), Error> {
    let count = count.unwrap_or(1);
    let result = ctx.data().profiles.add_warning(user.id.get(), count).await;

    let total = match reply_on_failure(ctx, &user, result).await? {
        Some(total) => total,
        None => return Ok(()),
    };

    let embed = serenity::CreateEmbed::new()
        .title("Warning added")
        .description(format!("Added {} warning(s) to <@{}>.", count, user.id))
        .color(embeds::WARNING)
        .field("Total warnings", total.to_string(), false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Handled by {}",
            ctx.author().tag()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Remove warnings from a member. The count never drops below zero.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn remove_warning(
    ctx: Context<'_>,
    #[description = "Member to clear warnings from"] user: serenity::User,
    #[description = "Number of warnings to remove (default 1)"]
    #[min = 1]
    count: Option<u32>,
) -> Result<(), Error> {
    let count = count.unwrap_or(1);
    let result = ctx.data().profiles.remove_warning(user.id.get(), count).await;

    let total = match reply_on_failure(ctx, &user, result).await? {
        Some(total) => total,
        None => return Ok(()),
    };

    let embed = serenity::CreateEmbed::new()
        .title("Warning removed")
        .description(format!("Removed {} warning(s) from <@{}>.", count, user.id))
        .color(embeds::SUCCESS)
        .field("Total warnings", total.to_string(), false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Handled by {}",
            ctx.author().tag()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Answers user-facing failures ephemerally; storage errors bubble up.
async fn reply_on_failure(
    ctx: Context<'_>,
    user: &serenity::User,
    result: Result<u32, ProfileError>,
) -> Result<Option<u32>, Error> {
    match result {
        Ok(total) => Ok(Some(total)),
        Err(ProfileError::NotFound(_)) => {
            ctx.send(error_reply(format!(
                "<@{}> has no registered profile.",
                user.id
            )))
            .await?;
            Ok(None)
        }
        Err(ProfileError::Validation(reason)) => {
            ctx.send(error_reply(reason)).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
