use crate::discord::api_errors::{classify, ApiFailure};
use crate::discord::embeds::{self, error_reply};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Parse a snowflake typed by a user. Zero is never a valid id.
pub fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

/// Delete one message in this channel by its id.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn delete_message(
    ctx: Context<'_>,
    #[description = "ID of the message to delete"] message_id: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(id) = parse_snowflake(&message_id) else {
        ctx.send(error_reply("That is not a valid message ID.")).await?;
        return Ok(());
    };

    let channel_id = ctx.channel_id();
    let message = match channel_id
        .message(ctx.http(), serenity::MessageId::new(id))
        .await
    {
        Ok(message) => message,
        Err(e) => return reply_api_failure(ctx, &e).await,
    };

    let author_id = message.author.id;
    if let Err(e) = message.delete(ctx.http()).await {
        return reply_api_failure(ctx, &e).await;
    }

    tracing::info!(message_id = id, channel_id = channel_id.get(), "Deleted message by id");

    let embed = serenity::CreateEmbed::new()
        .title("Message deleted")
        .description("The message was deleted.")
        .color(embeds::SUCCESS)
        .field("Author", format!("<@{}>", author_id), true)
        .field("Channel", format!("<#{}>", channel_id), true)
        .field("Moderator", format!("<@{}>", ctx.author().id), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Handled by {}",
            ctx.author().tag()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_api_failure(ctx: Context<'_>, err: &serenity::Error) -> Result<(), Error> {
    let text = match classify(err) {
        ApiFailure::NotFound => "Couldn't find that message in this channel.".to_string(),
        ApiFailure::Forbidden => "I don't have permission to delete that message.".to_string(),
        ApiFailure::Other => format!("Something went wrong while deleting the message: {}", err),
    };
    ctx.send(error_reply(text)).await?;
    Ok(())
}
