// Shared embed colours and date rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;

pub const ERROR: u32 = 0xE74C3C;
pub const SUCCESS: u32 = 0x2ECC71;
pub const INFO: u32 = 0x3498DB;
pub const WARNING: u32 = 0xF39C12;
pub const NEUTRAL: u32 = 0x95A5A6;

/// `2024-03-01 09:30` in the configured timezone.
pub fn local_datetime(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// `2024-03-01` in the configured timezone.
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d").to_string()
}

pub fn error_embed(description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Error")
        .description(description)
        .color(ERROR)
        .timestamp(serenity::Timestamp::now())
}

/// Ephemeral reply with a single error embed.
pub fn error_reply(description: impl Into<String>) -> poise::CreateReply {
    poise::CreateReply::default()
        .embed(error_embed(description))
        .ephemeral(true)
}

pub fn message_link(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dates_render_in_configured_timezone() {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 20, 15, 0).unwrap();

        assert_eq!(local_datetime(at, chrono_tz::Asia::Seoul), "2024-03-01 05:15");
        assert_eq!(local_date(at, chrono_tz::Asia::Seoul), "2024-03-01");
        assert_eq!(local_date(at, chrono_tz::UTC), "2024-02-29");
    }

    #[test]
    fn test_message_link() {
        assert_eq!(
            message_link(1, 2, 3),
            "https://discord.com/channels/1/2/3"
        );
    }
}
