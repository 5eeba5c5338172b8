use crate::discord::embeds;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use poise::Modal as _;

type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

#[derive(Debug, poise::Modal)]
#[name = "Create role verification message"]
struct SetupForm {
    #[name = "Title"]
    #[placeholder = "Embed title (optional)"]
    #[max_length = 256]
    title: Option<String>,

    #[name = "Body"]
    #[placeholder = "Embed body"]
    #[paragraph]
    #[max_length = 4000]
    body: String,
}

/// Blank titles are dropped.
fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Post an announcement embed to react on.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn message_setup(app_ctx: ApplicationContext<'_>) -> Result<(), Error> {
    let Some(form) = SetupForm::execute(app_ctx).await? else {
        return Ok(());
    };
    let ctx = poise::Context::Application(app_ctx);

    let mut announcement = serenity::CreateEmbed::new()
        .description(form.body)
        .color(embeds::INFO);
    if let Some(title) = clean_title(form.title) {
        announcement = announcement.title(title);
    }

    ctx.channel_id()
        .send_message(
            ctx.http(),
            serenity::CreateMessage::new().embed(announcement),
        )
        .await?;

    ctx.send(
        poise::CreateReply::default()
            .embed(
                serenity::CreateEmbed::new()
                    .description("The verification message was posted.")
                    .color(embeds::SUCCESS),
            )
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
