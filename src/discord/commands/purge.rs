// Bulk message removal. The paging decisions live in `core::moderation`;
// this file only fetches history pages and issues the deletes.

use crate::core::moderation::{PurgePlan, PurgeScan, ScanState, MAX_PURGE_COUNT, PURGE_LOOKBACK};
use crate::discord::api_errors::{classify, ApiFailure};
use crate::discord::embeds::{self, error_reply};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Delete recent messages in this channel, optionally only from one member.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Number of messages to delete"]
    #[min = 1]
    #[max = 100]
    count: u32,
    #[description = "Only delete messages from this member"] user: Option<serenity::User>,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let channel_id = ctx.channel_id();
    let scan = PurgeScan::new(
        (count as usize).min(MAX_PURGE_COUNT),
        user.as_ref().map(|u| u.id.get()),
    );

    let plan = match collect(ctx, channel_id, scan).await {
        Ok(plan) => plan,
        Err(e) => return reply_api_failure(ctx, &e).await,
    };

    if plan.found() > 0 {
        let ids: Vec<serenity::MessageId> = plan
            .message_ids
            .iter()
            .map(|id| serenity::MessageId::new(*id))
            .collect();

        if let Err(e) = channel_id.delete_messages(ctx.http(), ids).await {
            return reply_api_failure(ctx, &e).await;
        }
    }

    tracing::info!(
        channel_id = channel_id.get(),
        requested = plan.requested,
        deleted = plan.found(),
        filtered = plan.filtered,
        "Purged messages"
    );

    let description = match &user {
        Some(u) => format!("Deleted {} message(s) from <@{}>.", plan.found(), u.id),
        None => format!("Deleted {} message(s).", plan.found()),
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("Messages purged")
        .description(description)
        .color(embeds::SUCCESS)
        .timestamp(serenity::Timestamp::now());

    if plan.has_shortfall() {
        embed = embed.field(
            "Note",
            format!(
                "Only found {} matching message(s) in the last {} messages.",
                plan.found(),
                PURGE_LOOKBACK
            ),
            false,
        );
    }

    embed = embed
        .field("Channel", format!("<#{}>", channel_id), true)
        .field("Moderator", format!("<@{}>", ctx.author().id), true);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Walk channel history, newest first, until the scan is satisfied.
async fn collect(
    ctx: Context<'_>,
    channel_id: serenity::ChannelId,
    mut scan: PurgeScan,
) -> Result<PurgePlan, serenity::Error> {
    let mut before: Option<serenity::MessageId> = None;

    while scan.state() == ScanState::Continue {
        let mut request = serenity::GetMessages::new().limit(scan.next_page_size());
        if let Some(id) = before {
            request = request.before(id);
        }

        let page = channel_id.messages(ctx.http(), request).await?;
        let Some(last) = page.last() else {
            break;
        };
        before = Some(last.id);

        for message in &page {
            if scan.push(message.id.get(), message.author.id.get()) == ScanState::Done {
                break;
            }
        }
    }

    Ok(scan.finish())
}

async fn reply_api_failure(ctx: Context<'_>, err: &serenity::Error) -> Result<(), Error> {
    tracing::warn!(error = %err, "Purge failed");
    let text = match classify(err) {
        ApiFailure::Forbidden => "I don't have permission to delete messages here.".to_string(),
        _ => format!("Something went wrong while deleting messages: {}", err),
    };
    ctx.send(error_reply(text)).await?;
    Ok(())
}
