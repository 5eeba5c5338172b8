// Reaction-role domain models.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet for generated reaction ids.
pub const REACTION_ID_ALPHABET: &[u8] = b"0123456789ABCDEF";
pub const REACTION_ID_LEN: usize = 6;

/// A message + emoji pair that grants a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRoleMapping {
    pub reaction_id: String,
    pub message_id: u64,
    pub channel_id: u64,
    /// Normalised emoji key, see [`normalize_emoji`].
    pub emoji: String,
    pub role_id: u64,
    pub created_at: DateTime<Utc>,
}

/// Generate a candidate reaction id. Uniqueness is checked by the caller.
pub fn generate_reaction_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REACTION_ID_LEN)
        .map(|_| REACTION_ID_ALPHABET[rng.gen_range(0..REACTION_ID_ALPHABET.len())] as char)
        .collect()
}

/// Canonical form of an emoji used as a lookup key.
///
/// Unicode emoji are kept as-is. Custom emoji given as `<:name:id>`,
/// `<a:name:id>` or `name:id` all become `name:id`, so the key stored by the
/// add command matches the key built from a gateway reaction event.
pub fn normalize_emoji(raw: &str) -> String {
    let raw = raw.trim();

    let inner = raw
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.strip_prefix("a:").unwrap_or(s))
        .map(|s| s.strip_prefix(':').unwrap_or(s))
        .unwrap_or(raw);

    match inner.rsplit_once(':') {
        Some((name, id)) if !name.is_empty() && id.parse::<u64>().is_ok() => {
            format!("{}:{}", name, id)
        }
        _ => raw.to_string(),
    }
}
