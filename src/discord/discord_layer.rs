// Discord layer - commands, event handlers and the glue between them.

use crate::core::extensions::NamedCommand;
use crate::core::logging::LoggingService;
use crate::core::profiles::ProfileService;
use crate::core::reaction_roles::ReactionRoleService;
use crate::infra::logging::SqliteSettingsStore;
use crate::infra::profiles::SqliteProfileStore;
use crate::infra::reaction_roles::SqliteReactionRoleStore;
use chrono_tz::Tz;
use std::sync::Arc;

pub mod api_errors;
pub mod commands;
pub mod embeds;
pub mod logging;
pub mod presence;
pub mod reaction_roles;

/// Shared state handed to every command and event handler.
pub struct Data {
    pub profiles: Arc<ProfileService<SqliteProfileStore>>,
    pub logging: Arc<LoggingService<SqliteSettingsStore>>,
    pub reaction_roles: Arc<ReactionRoleService<SqliteReactionRoleStore>>,
    /// Timezone for dates rendered in embeds.
    pub timezone: Tz,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type Command = poise::Command<Data, Error>;

impl NamedCommand for Command {
    fn command_name(&self) -> &str {
        &self.name
    }
}

/// Whether the invoking member has the Administrator permission.
pub fn is_admin(ctx: Context<'_>) -> bool {
    match ctx {
        poise::Context::Application(app) => app
            .interaction
            .member
            .as_ref()
            .and_then(|m| m.permissions)
            .map_or(false, |p| p.administrator()),
        poise::Context::Prefix(_) => false,
    }
}
