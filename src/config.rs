// Runtime configuration, read from the environment (and `.env` via dotenv).

use chrono_tz::Tz;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "data/stack_bot.db";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;
pub const DEFAULT_ACTIVITY: &str = "Keeping records...";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot token.")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub database_path: String,
    /// Timezone used when rendering dates in embeds.
    pub timezone: Tz,
    pub activity: String,
    /// Register commands in this guild only (instant updates while developing).
    pub dev_guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let timezone = match get("BOT_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                name: "BOT_TIMEZONE",
                value: name.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let dev_guild_id = match get("DEV_GUILD_ID") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "DEV_GUILD_ID",
                value: raw.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            token,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            timezone,
            activity: get("BOT_ACTIVITY").unwrap_or_else(|| DEFAULT_ACTIVITY.to_string()),
            dev_guild_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.timezone, chrono_tz::Asia::Seoul);
        assert_eq!(config.activity, DEFAULT_ACTIVITY);
        assert_eq!(config.dev_guild_id, None);
    }

    #[test]
    fn test_missing_token() {
        let err = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATABASE_PATH", "/tmp/bot.db"),
            ("BOT_TIMEZONE", "Europe/Berlin"),
            ("BOT_ACTIVITY", "Watching"),
            ("DEV_GUILD_ID", "1432001978447167611"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, "/tmp/bot.db");
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.activity, "Watching");
        assert_eq!(config.dev_guild_id, Some(1432001978447167611));
    }

    #[test]
    fn test_invalid_values() {
        let err = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("BOT_TIMEZONE", "Mars/Olympus"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BOT_TIMEZONE", .. }));

        let err = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DEV_GUILD_ID", "not-a-number"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DEV_GUILD_ID", .. }));
    }
}
