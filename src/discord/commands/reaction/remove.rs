use crate::discord::embeds::{self, error_reply};
use crate::discord::reaction_roles::{display_emoji, reaction_from_key};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Remove a reaction role by its reaction ID.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Reaction ID (see /reaction list)"] reaction_id: String,
) -> Result<(), Error> {
    let data = ctx.data();
    let reaction_id = reaction_id.trim().to_uppercase();

    let Some(mapping) = data.reaction_roles.get_mapping(&reaction_id).await? else {
        ctx.send(error_reply(format!(
            "Reaction ID `{}` was not found.\nUse `/reaction list` to see valid IDs.",
            reaction_id
        )))
        .await?;
        return Ok(());
    };

    // Clear the emoji from the message; the mapping goes either way.
    if let Err(e) = serenity::ChannelId::new(mapping.channel_id)
        .delete_reaction_emoji(
            ctx.http(),
            serenity::MessageId::new(mapping.message_id),
            reaction_from_key(&mapping.emoji),
        )
        .await
    {
        tracing::debug!(reaction_id = %reaction_id, error = %e, "Could not clear reaction from message");
    }

    if !data.reaction_roles.remove_mapping(&reaction_id).await? {
        ctx.send(error_reply("Removing the reaction role failed.")).await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title("✅ Reaction role removed")
        .description(format!(
            "**Reaction ID:** `{}`\n\
             **Message ID:** `{}`\n\
             **Emoji:** {}\n\
             **Role:** <@&{}>\n\n\
             This reaction no longer grants a role.",
            reaction_id,
            mapping.message_id,
            display_emoji(&mapping.emoji),
            mapping.role_id
        ))
        .color(embeds::SUCCESS);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
