// `/reaction` command group: manage emoji -> role mappings.

use crate::discord::{Context, Error};

pub mod add;
pub mod list;
pub mod message_setup;
pub mod remove;

use add::add;
use list::list;
use message_setup::message_setup;
use remove::remove;

/// Manage reaction roles.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR",
    subcommands("add", "list", "remove", "message_setup"),
    subcommand_required
)]
pub async fn reaction(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}
