use crate::core::logging::{
    attribute_deletion, AuditEntry, LogEvent, LoggedAttachment, LoggedUser, MessageSnapshot,
    AUDIT_LOOKUP_LIMIT,
};
use crate::discord::logging::formatter::format_log_event;
use crate::discord::Data;
use anyhow::Result;
use chrono::Utc;
use poise::serenity_prelude::{self as serenity, Context};

fn logged_user(user: &serenity::User) -> LoggedUser {
    LoggedUser {
        id: user.id.get(),
        tag: user.tag(),
        avatar_url: Some(user.face()),
    }
}

pub async fn handle_member_join(
    ctx: &Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<()> {
    let event = LogEvent::MemberJoined {
        guild_id: member.guild_id.get(),
        user: logged_user(&member.user),
        created_at: *member.user.created_at(),
    };

    send_log(ctx, data, event).await
}

pub async fn handle_member_remove(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    member_data: Option<&serenity::Member>,
) -> Result<()> {
    let event = LogEvent::MemberLeft {
        guild_id: guild_id.get(),
        user: logged_user(user),
        joined_at: member_data.and_then(|m| m.joined_at).map(|t| *t),
    };

    send_log(ctx, data, event).await
}

fn snapshot_of(message: &serenity::Message, guild_id: serenity::GuildId) -> MessageSnapshot {
    MessageSnapshot {
        message_id: message.id.get(),
        guild_id: guild_id.get(),
        channel_id: message.channel_id.get(),
        author: logged_user(&message.author),
        content: message.content.clone(),
        attachments: message
            .attachments
            .iter()
            .map(|a| LoggedAttachment {
                filename: a.filename.clone(),
                url: a.url.clone(),
            })
            .collect(),
    }
}

/// Remember guild messages from people so later edits and deletes can be logged.
pub fn handle_message(data: &Data, message: &serenity::Message) {
    if message.author.bot {
        return;
    }
    if let Some(guild_id) = message.guild_id {
        data.logging.remember_message(snapshot_of(message, guild_id));
    }
}

pub async fn handle_message_delete(
    ctx: &Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    guild_id: Option<serenity::GuildId>,
) -> Result<()> {
    let Some(guild_id) = guild_id else {
        return Ok(());
    };

    // Our own snapshot first; Serenity drops the message from its cache
    // before this event is dispatched.
    let snapshot = match data.logging.take_snapshot(message_id.get()) {
        Some(snapshot) => snapshot,
        None => {
            let cached = ctx
                .cache
                .message(channel_id, message_id)
                .map(|m| m.clone());
            match cached {
                Some(message) if !message.author.bot => snapshot_of(&message, guild_id),
                _ => return Ok(()),
            }
        }
    };

    if snapshot.guild_id != guild_id.get() {
        return Ok(());
    }

    let entries = recent_delete_entries(ctx, guild_id).await;
    let deleted_by = attribute_deletion(snapshot.author.id, &entries, Utc::now());

    let event = LogEvent::MessageDeleted {
        guild_id: snapshot.guild_id,
        author: snapshot.author,
        channel_id: snapshot.channel_id,
        content: snapshot.content,
        attachments: snapshot.attachments,
        deleted_by,
    };

    send_log(ctx, data, event).await
}

/// Latest message-delete audit entries. Empty when the audit log is off limits.
async fn recent_delete_entries(ctx: &Context, guild_id: serenity::GuildId) -> Vec<AuditEntry> {
    let action = serenity::audit_log::Action::Message(serenity::audit_log::MessageAction::Delete);

    let logs = match guild_id
        .audit_logs(&ctx.http, Some(action), None, None, Some(AUDIT_LOOKUP_LIMIT))
        .await
    {
        Ok(logs) => logs,
        Err(e) => {
            tracing::debug!(guild_id = guild_id.get(), error = %e, "Audit log unavailable");
            return Vec::new();
        }
    };

    logs.entries
        .iter()
        .map(|entry| AuditEntry {
            target_id: entry.target_id.map(|id| id.get()),
            actor_id: entry.user_id.get(),
            actor_tag: ctx
                .cache
                .user(entry.user_id)
                .map(|u| u.tag())
                .unwrap_or_else(|| entry.user_id.to_string()),
            created_at: *entry.id.created_at(),
        })
        .collect()
}

pub async fn handle_message_update(
    ctx: &Context,
    data: &Data,
    old: Option<&serenity::Message>,
    event: &serenity::MessageUpdateEvent,
) -> Result<()> {
    let Some(guild_id) = event.guild_id else {
        return Ok(());
    };

    // Embed-only updates carry no content.
    let Some(new_content) = &event.content else {
        return Ok(());
    };

    let message_id = event.id.get();
    let (author, before_content) = match data.logging.snapshot(message_id) {
        Some(snapshot) => {
            if snapshot.content == *new_content {
                return Ok(());
            }
            data.logging.update_content(message_id, new_content);
            (snapshot.author, snapshot.content)
        }
        None => {
            let Some(old) = old else {
                return Ok(());
            };
            if old.author.bot || old.content == *new_content {
                return Ok(());
            }
            let mut snapshot = snapshot_of(old, guild_id);
            let before = std::mem::replace(&mut snapshot.content, new_content.clone());
            let author = snapshot.author.clone();
            data.logging.remember_message(snapshot);
            (author, before)
        }
    };

    let event = LogEvent::MessageEdited {
        guild_id: guild_id.get(),
        author,
        channel_id: event.channel_id.get(),
        message_id,
        before_content,
        after_content: new_content.clone(),
    };

    send_log(ctx, data, event).await
}

/// Send to the guild's log channel. No channel configured means no log.
async fn send_log(ctx: &Context, data: &Data, event: LogEvent) -> Result<()> {
    let guild_id = event.guild_id();
    let Some(channel_id) = data.logging.log_channel(guild_id).await? else {
        return Ok(());
    };

    let embed = format_log_event(&event, data.timezone);
    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!("Failed to send log to channel {}: {}", channel_id, e);
    }
    Ok(())
}
