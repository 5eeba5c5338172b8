use crate::discord::embeds;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Select the text channel that receives server event logs.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn log_channel(
    ctx: Context<'_>,
    #[description = "Channel to send logs to"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let channel_id = channel.id.get();

    ctx.data()
        .logging
        .set_log_channel(guild_id, channel_id)
        .await?;

    let embed = serenity::CreateEmbed::new()
        .title("Log channel set")
        .description(format!("Server logs will be sent to <#{}>.", channel_id))
        .color(embeds::SUCCESS)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Set by {}",
            ctx.author().tag()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
