// Discord side of reaction roles: emoji conversion, the role port over the
// HTTP client, the DM verification flow and the raw reaction handlers.

use crate::core::reaction_roles::normalize_emoji;
use poise::serenity_prelude as serenity;

pub mod events;
pub mod member_roles;
pub mod verification;

/// Storage key for an emoji as Discord reports it on a reaction.
pub fn emoji_key(emoji: &serenity::ReactionType) -> String {
    match emoji {
        serenity::ReactionType::Custom { id, name, .. } => {
            format!("{}:{}", name.as_deref().unwrap_or_default(), id)
        }
        serenity::ReactionType::Unicode(s) => normalize_emoji(s),
        other => normalize_emoji(&other.to_string()),
    }
}

/// Split a stored `name:id` key. `None` for unicode emoji.
fn split_custom(key: &str) -> Option<(&str, u64)> {
    let (name, id) = key.rsplit_once(':')?;
    let id = id.parse::<u64>().ok().filter(|id| *id != 0)?;
    Some((name, id))
}

/// Rebuild a reaction from a stored key.
pub fn reaction_from_key(key: &str) -> serenity::ReactionType {
    match split_custom(key) {
        Some((name, id)) => serenity::ReactionType::Custom {
            animated: false,
            id: serenity::EmojiId::new(id),
            name: Some(name.to_string()),
        },
        None => serenity::ReactionType::Unicode(key.to_string()),
    }
}

/// How a stored key renders inside message text.
pub fn display_emoji(key: &str) -> String {
    match split_custom(key) {
        Some((name, id)) => format!("<:{}:{}>", name, id),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_emoji_keys() {
        let reaction = serenity::ReactionType::Custom {
            animated: true,
            id: serenity::EmojiId::new(987654321),
            name: Some("party".to_string()),
        };

        let key = emoji_key(&reaction);
        assert_eq!(key, "party:987654321");
        assert_eq!(key, normalize_emoji("<a:party:987654321>"));
        assert_eq!(display_emoji(&key), "<:party:987654321>");
        assert!(matches!(
            reaction_from_key(&key),
            serenity::ReactionType::Custom { id, .. } if id.get() == 987654321
        ));
    }

    #[test]
    fn test_unicode_emoji_keys() {
        let reaction = serenity::ReactionType::Unicode("✅".to_string());

        assert_eq!(emoji_key(&reaction), "✅");
        assert_eq!(display_emoji("✅"), "✅");
        assert_eq!(
            reaction_from_key("✅"),
            serenity::ReactionType::Unicode("✅".to_string())
        );
    }
}
