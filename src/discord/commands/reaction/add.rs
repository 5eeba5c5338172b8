use crate::discord::api_errors::{classify, ApiFailure};
use crate::discord::commands::delete::parse_snowflake;
use crate::discord::embeds::{self, error_reply};
use crate::discord::reaction_roles::{display_emoji, emoji_key};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const DEFAULT_EMOJI: &str = "✅";

/// Attach a reaction role to a message in this channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Message ID"] message_id: String,
    #[description = "Role to grant"] role: serenity::Role,
    #[description = "Reaction emoji (default ✅)"] emoji: Option<String>,
) -> Result<(), Error> {
    let Some(id) = parse_snowflake(&message_id) else {
        ctx.send(error_reply("Please enter a valid message ID.")).await?;
        return Ok(());
    };

    let raw_emoji = emoji.unwrap_or_else(|| DEFAULT_EMOJI.to_string());
    let Ok(reaction) = serenity::ReactionType::try_from(raw_emoji.trim()) else {
        ctx.send(error_reply(format!("`{}` is not an emoji I can use.", raw_emoji)))
            .await?;
        return Ok(());
    };

    let channel_id = ctx.channel_id();
    let message = match channel_id
        .message(ctx.http(), serenity::MessageId::new(id))
        .await
    {
        Ok(message) => message,
        Err(e) => {
            let text = match classify(&e) {
                ApiFailure::NotFound => "Couldn't find that message in this channel.".to_string(),
                _ => format!("Couldn't fetch the message: {}", e),
            };
            ctx.send(error_reply(text)).await?;
            return Ok(());
        }
    };

    if let Err(e) = message.react(ctx.http(), reaction.clone()).await {
        ctx.send(error_reply(format!("Couldn't add the reaction: {}", e)))
            .await?;
        return Ok(());
    }

    let key = emoji_key(&reaction);
    let reaction_id = ctx
        .data()
        .reaction_roles
        .add_mapping(id, channel_id.get(), &key, role.id.get())
        .await?;

    let embed = serenity::CreateEmbed::new()
        .title("✅ Reaction role added")
        .description(format!(
            "**Reaction ID:** `{}`\n\
             **Message ID:** `{}`\n\
             **Emoji:** {}\n\
             **Role:** <@&{}>\n\n\
             Reacting opens a profile form in DMs; the role is granted once it is filled in.\n\
             Removing the reaction takes the role away again.",
            reaction_id,
            id,
            display_emoji(&key),
            role.id
        ))
        .color(embeds::SUCCESS);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
