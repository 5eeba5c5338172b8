// Bot presence. Only set once, when the gateway reports ready.

use poise::serenity_prelude as serenity;

/// Show "Competing in <activity>" with an online status.
pub fn on_ready(ctx: &serenity::Context, activity: &str) {
    let activity = serenity::ActivityData::competing(activity);
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
