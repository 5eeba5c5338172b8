use crate::core::logging::{
    truncate_chars, DeletedBy, LogEvent, LoggedAttachment, LoggedUser, MAX_LOGGED_ATTACHMENTS,
    MAX_LOGGED_CONTENT,
};
use crate::discord::embeds::{self, local_datetime, message_link};
use chrono_tz::Tz;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedFooter};

const NO_CONTENT: &str = "*No content*";

/// Message content as shown in a log field.
pub fn content_field(content: &str) -> String {
    if content.trim().is_empty() {
        NO_CONTENT.to_string()
    } else {
        truncate_chars(content, MAX_LOGGED_CONTENT).to_string()
    }
}

/// Markdown links for the first few attachments, if there are any.
pub fn attachment_links(attachments: &[LoggedAttachment]) -> Option<String> {
    if attachments.is_empty() {
        return None;
    }
    Some(
        attachments
            .iter()
            .take(MAX_LOGGED_ATTACHMENTS)
            .map(|a| format!("[{}]({})", a.filename, a.url))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn user_line(user: &LoggedUser) -> String {
    format!("{} ({})", user.tag, user.id)
}

fn with_avatar(embed: CreateEmbed, user: &LoggedUser) -> CreateEmbed {
    match &user.avatar_url {
        Some(url) => embed.thumbnail(url),
        None => embed,
    }
}

pub fn format_log_event(event: &LogEvent, tz: Tz) -> CreateEmbed {
    let guild_id = event.guild_id();
    let base = CreateEmbed::default()
        .footer(CreateEmbedFooter::new(format!("Guild ID: {}", guild_id)))
        .timestamp(serenity::Timestamp::now());

    match event {
        LogEvent::MemberJoined {
            user, created_at, ..
        } => {
            let embed = base
                .title("Member joined")
                .description(format!("<@{}> joined the server.", user.id))
                .color(embeds::SUCCESS)
                .field("User", user_line(user), false)
                .field("Account created", local_datetime(*created_at, tz), true);
            with_avatar(embed, user)
        }

        LogEvent::MemberLeft {
            user, joined_at, ..
        } => {
            let mut embed = base
                .title("Member left")
                .description(format!("<@{}> left the server.", user.id))
                .color(embeds::ERROR)
                .field("User", user_line(user), false);

            if let Some(joined) = joined_at {
                embed = embed.field("Joined server", local_datetime(*joined, tz), true);
            }
            with_avatar(embed, user)
        }

        LogEvent::MessageDeleted {
            author,
            channel_id,
            content,
            attachments,
            deleted_by,
            ..
        } => {
            let mut embed = match deleted_by {
                DeletedBy::Moderator { id, tag } => base
                    .title("Message deleted (moderator)")
                    .description(format!(
                        "A message by <@{}> was deleted by <@{}>.",
                        author.id, id
                    ))
                    .color(embeds::ERROR)
                    .field("Author", user_line(author), true)
                    .field("Deleted by", format!("{} ({})", tag, id), true),
                DeletedBy::Author => base
                    .title("Message deleted")
                    .description(format!("A message by <@{}> was deleted.", author.id))
                    .color(embeds::WARNING)
                    .field("Author", user_line(author), false),
            };

            embed = embed
                .field("Channel", format!("<#{}>", channel_id), true)
                .field("Content", content_field(content), false);

            if let Some(links) = attachment_links(attachments) {
                embed = embed.field("Attachments", links, false);
            }
            with_avatar(embed, author)
        }

        LogEvent::MessageEdited {
            guild_id,
            author,
            channel_id,
            message_id,
            before_content,
            after_content,
        } => {
            let embed = base
                .title("Message edited")
                .description(format!("<@{}> edited a message.", author.id))
                .color(embeds::INFO)
                .field("Author", user_line(author), false)
                .field("Channel", format!("<#{}>", channel_id), true)
                .field("Before", content_field(before_content), false)
                .field("After", content_field(after_content), false)
                .field(
                    "Message",
                    format!("[Jump to message]({})", message_link(*guild_id, *channel_id, *message_id)),
                    false,
                );
            with_avatar(embed, author)
        }
    }
}
