use crate::core::logging::truncate_chars;
use crate::core::reaction_roles::ReactionRoleMapping;
use crate::discord::embeds::{self, error_reply};
use crate::discord::reaction_roles::display_emoji;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Discord's limits for a single embed.
const MAX_FIELD_VALUE: usize = 1024;
const MAX_FIELDS: usize = 25;

/// One embed field value per channel, cut to fit.
pub fn channel_field_value(mappings: &[ReactionRoleMapping]) -> String {
    let value = mappings
        .iter()
        .map(|m| {
            format!(
                "**ID:** `{}` | {} → <@&{}>\n└ Message: `{}`",
                m.reaction_id,
                display_emoji(&m.emoji),
                m.role_id,
                m.message_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    if value.chars().count() > MAX_FIELD_VALUE {
        format!("{}...", truncate_chars(&value, MAX_FIELD_VALUE - 3))
    } else {
        value
    }
}

/// List every reaction role, grouped by channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let total = data.reaction_roles.list_all().await?.len();
    let grouped = data.reaction_roles.mappings_by_channel().await?;

    if grouped.is_empty() {
        ctx.send(error_reply("No reaction roles are set up.")).await?;
        return Ok(());
    }

    // Resolve names before any await so the cache guard is dropped.
    let channel_names: Vec<(u64, String)> = {
        let guild = ctx.guild();
        grouped
            .keys()
            .map(|id| {
                let name = guild
                    .as_ref()
                    .and_then(|g| g.channels.get(&serenity::ChannelId::new(*id)))
                    .map(|c| format!("#{}", c.name))
                    .unwrap_or_else(|| id.to_string());
                (*id, name)
            })
            .collect()
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("📋 Reaction roles")
        .color(embeds::INFO);

    if grouped.len() > MAX_FIELDS {
        embed = embed.description("⚠️ Too many channels to show; only the first 25 are listed.");
    }

    for (channel_id, name) in channel_names.iter().take(MAX_FIELDS) {
        if let Some(mappings) = grouped.get(channel_id) {
            embed = embed.field(
                format!("📌 Channel: {}", name),
                channel_field_value(mappings),
                false,
            );
        }
    }

    embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
        "{} reaction role(s) in total",
        total
    )));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
