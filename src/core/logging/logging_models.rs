use chrono::{DateTime, Utc};

/// How long after a delete an audit log entry may appear and still be
/// attributed to that delete.
pub const DELETE_ATTRIBUTION_WINDOW_SECS: i64 = 3;

/// How many message-delete audit entries are inspected per delete.
pub const AUDIT_LOOKUP_LIMIT: u8 = 5;

/// Per-field content cap for edit/delete logs.
pub const MAX_LOGGED_CONTENT: usize = 1000;

/// Attachments beyond this are not linked in delete logs.
pub const MAX_LOGGED_ATTACHMENTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedUser {
    pub id: u64,
    pub tag: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedAttachment {
    pub filename: String,
    pub url: String,
}

/// Copy of a guild message kept in memory so edits and deletes can still be
/// described after Serenity's cache has let go of the original.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSnapshot {
    pub message_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author: LoggedUser,
    pub content: String,
    pub attachments: Vec<LoggedAttachment>,
}

/// Who removed a message, as far as the audit log can tell.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletedBy {
    /// The author deleted it, or the audit log was ambiguous/inaccessible.
    Author,
    Moderator { id: u64, tag: String },
}

#[derive(Debug, Clone)]
pub enum LogEvent {
    MemberJoined {
        guild_id: u64,
        user: LoggedUser,
        created_at: DateTime<Utc>,
    },
    MemberLeft {
        guild_id: u64,
        user: LoggedUser,
        joined_at: Option<DateTime<Utc>>,
    },
    MessageDeleted {
        guild_id: u64,
        author: LoggedUser,
        channel_id: u64,
        content: String,
        attachments: Vec<LoggedAttachment>,
        deleted_by: DeletedBy,
    },
    MessageEdited {
        guild_id: u64,
        author: LoggedUser,
        channel_id: u64,
        message_id: u64,
        before_content: String,
        after_content: String,
    },
}

impl LogEvent {
    pub fn guild_id(&self) -> u64 {
        match self {
            LogEvent::MemberJoined { guild_id, .. }
            | LogEvent::MemberLeft { guild_id, .. }
            | LogEvent::MessageDeleted { guild_id, .. }
            | LogEvent::MessageEdited { guild_id, .. } => *guild_id,
        }
    }
}

/// The bits of a message-delete audit log entry needed for attribution.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub target_id: Option<u64>,
    pub actor_id: u64,
    pub actor_tag: String,
    pub created_at: DateTime<Utc>,
}

/// Decide who deleted a message written by `author_id`.
///
/// Only an entry targeting the author, created less than
/// [`DELETE_ATTRIBUTION_WINDOW_SECS`] ago, by someone other than the author,
/// counts as a moderator delete.
pub fn attribute_deletion(author_id: u64, entries: &[AuditEntry], now: DateTime<Utc>) -> DeletedBy {
    let recent = entries.iter().find(|entry| {
        let age = now.signed_duration_since(entry.created_at);
        entry.target_id == Some(author_id)
            && age.num_milliseconds() < DELETE_ATTRIBUTION_WINDOW_SECS * 1000
    });

    match recent {
        Some(entry) if entry.actor_id != author_id => DeletedBy::Moderator {
            id: entry.actor_id,
            tag: entry.actor_tag.clone(),
        },
        _ => DeletedBy::Author,
    }
}

/// Truncate to at most `max` characters, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(target: u64, actor: u64, age_ms: i64, now: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            target_id: Some(target),
            actor_id: actor,
            actor_tag: format!("mod{}", actor),
            created_at: now - Duration::milliseconds(age_ms),
        }
    }

    #[test]
    fn recent_entry_for_author_is_moderator_delete() {
        let now = Utc::now();
        let entries = vec![entry(10, 99, 500, now)];

        assert_eq!(
            attribute_deletion(10, &entries, now),
            DeletedBy::Moderator {
                id: 99,
                tag: "mod99".to_string()
            }
        );
    }

    #[test]
    fn stale_entry_falls_back_to_author() {
        let now = Utc::now();
        let entries = vec![entry(10, 99, 3_500, now)];

        assert_eq!(attribute_deletion(10, &entries, now), DeletedBy::Author);
    }

    #[test]
    fn entry_for_other_target_is_ignored() {
        let now = Utc::now();
        let entries = vec![entry(11, 99, 100, now)];

        assert_eq!(attribute_deletion(10, &entries, now), DeletedBy::Author);
    }

    #[test]
    fn no_entries_means_self_delete() {
        assert_eq!(attribute_deletion(10, &[], Utc::now()), DeletedBy::Author);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("안녕하세요", 2), "안녕");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
