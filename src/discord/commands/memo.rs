use crate::core::profiles::ProfileError;
use crate::discord::embeds::{self, error_reply};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Write the admin memo for a member (replaces any previous memo).
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn memo(
    ctx: Context<'_>,
    #[description = "Member the memo is about"] user: serenity::User,
    #[description = "Memo text"]
    #[max_length = 1024]
    memo: String,
) -> Result<(), Error> {
    match ctx.data().profiles.set_memo(user.id.get(), &memo).await {
        Ok(()) => {}
        Err(ProfileError::NotFound(_)) => {
            ctx.send(error_reply(format!(
                "<@{}> has no registered profile.",
                user.id
            )))
            .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let shown = match memo.trim() {
        "" => "*(empty)*",
        text => text,
    };

    let embed = serenity::CreateEmbed::new()
        .title("Memo saved")
        .description(format!("Saved the memo for <@{}>.", user.id))
        .color(embeds::INFO)
        .field("Memo", shown, false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Written by {}",
            ctx.author().tag()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
