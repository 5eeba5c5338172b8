// Role verification over DM.
//
// Reacting on a tracked message sends the member a DM with a button. The
// button opens a profile form; submitting it registers the profile and
// grants the role. Guild and role ids ride along in the component custom
// ids, so buttons sent before a restart keep working.

use crate::core::profiles::{ProfileError, ProfileInput};
use crate::core::reaction_roles::{grant_role, GrantOutcome, RoleError};
use crate::discord::embeds;
use crate::discord::reaction_roles::member_roles::SerenityMemberRoles;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use poise::Modal as _;

const BUTTON_PREFIX: &str = "verify_button";
const FORM_PREFIX: &str = "verify_form";

/// Which verification step a component custom id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStep {
    Button { guild_id: u64, role_id: u64 },
    Form { guild_id: u64, role_id: u64 },
}

pub fn button_id(guild_id: u64, role_id: u64) -> String {
    format!("{}:{}:{}", BUTTON_PREFIX, guild_id, role_id)
}

pub fn form_id(guild_id: u64, role_id: u64) -> String {
    format!("{}:{}:{}", FORM_PREFIX, guild_id, role_id)
}

pub fn parse_custom_id(custom_id: &str) -> Option<VerificationStep> {
    let mut parts = custom_id.split(':');
    let prefix = parts.next()?;
    let guild_id = parts.next()?.parse::<u64>().ok().filter(|id| *id != 0)?;
    let role_id = parts.next()?.parse::<u64>().ok().filter(|id| *id != 0)?;
    if parts.next().is_some() {
        return None;
    }

    match prefix {
        BUTTON_PREFIX => Some(VerificationStep::Button { guild_id, role_id }),
        FORM_PREFIX => Some(VerificationStep::Form { guild_id, role_id }),
        _ => None,
    }
}

#[derive(Debug, poise::Modal)]
#[name = "Role verification profile"]
pub struct ProfileForm {
    #[name = "Nickname"]
    #[placeholder = "Nickname you want to use"]
    #[max_length = 50]
    pub nickname: String,

    #[name = "Birth year"]
    #[placeholder = "e.g. 2000"]
    #[min_length = 2]
    #[max_length = 4]
    pub birth_year: String,

    #[name = "Gender"]
    #[placeholder = "e.g. Male / Female"]
    #[max_length = 20]
    pub gender: String,

    #[name = "Region"]
    #[placeholder = "e.g. Seoul"]
    #[max_length = 50]
    pub region: String,
}

/// DM the member a button that opens the profile form.
/// A closed DM inbox is logged and not retried.
pub async fn send_prompt(ctx: &serenity::Context, user_id: u64, guild_id: u64, role_id: u64) {
    let embed = serenity::CreateEmbed::new()
        .description("To get verified, press the button below and fill in your profile.")
        .color(embeds::INFO);
    let button = serenity::CreateButton::new(button_id(guild_id, role_id))
        .label("Start profile")
        .style(serenity::ButtonStyle::Primary);
    let message = serenity::CreateMessage::new()
        .embed(embed)
        .components(vec![serenity::CreateActionRow::Buttons(vec![button])]);

    if let Err(e) = serenity::UserId::new(user_id)
        .direct_message(ctx, message)
        .await
    {
        tracing::warn!(user_id, guild_id, error = %e, "Failed to send verification DM");
    }
}

/// Route component and modal interactions that belong to verification.
pub async fn handle_interaction(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::Interaction,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component) => {
            if let Some(VerificationStep::Button { guild_id, role_id }) =
                parse_custom_id(&component.data.custom_id)
            {
                component
                    .create_response(&ctx.http, ProfileForm::create(None, form_id(guild_id, role_id)))
                    .await?;
            }
        }
        serenity::Interaction::Modal(modal) => {
            if let Some(VerificationStep::Form { guild_id, role_id }) =
                parse_custom_id(&modal.data.custom_id)
            {
                submit_form(ctx, data, modal, guild_id, role_id).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn submit_form(
    ctx: &serenity::Context,
    data: &Data,
    modal: &serenity::ModalInteraction,
    guild_id: u64,
    role_id: u64,
) -> Result<(), Error> {
    modal
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let user = &modal.user;
    let reply = match complete_verification(ctx, data, modal, guild_id, role_id).await {
        Ok(nickname) => {
            tracing::info!(user_id = user.id.get(), guild_id, role_id, "Verification completed");
            serenity::CreateEmbed::new()
                .description(format!("**{}**, you're verified!", nickname))
                .color(embeds::SUCCESS)
        }
        Err(message) => serenity::CreateEmbed::new()
            .description(message)
            .color(embeds::ERROR),
    };

    modal
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .embed(reply)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Returns the registered nickname, or the text to show the member.
async fn complete_verification(
    ctx: &serenity::Context,
    data: &Data,
    modal: &serenity::ModalInteraction,
    guild_id: u64,
    role_id: u64,
) -> Result<String, String> {
    let form = ProfileForm::parse(modal.data.clone()).map_err(|e| {
        tracing::warn!(error = e, "Malformed verification form");
        "The form could not be read. Please try again.".to_string()
    })?;

    let user_id = modal.user.id.get();
    let input = ProfileInput::new(
        &modal.user.tag(),
        &form.nickname,
        &form.birth_year,
        &form.gender,
        &form.region,
    )
    .map_err(|e| match e {
        ProfileError::Validation(reason) => reason,
        other => other.to_string(),
    })?;
    let nickname = input.display_name.clone();

    data.profiles
        .register_profile(user_id, input)
        .await
        .map_err(|e| {
            tracing::error!(user_id, error = %e, "Failed to register profile from form");
            "Registering your profile failed.".to_string()
        })?;

    let roles = SerenityMemberRoles::new(ctx.http.clone());
    match grant_role(&roles, guild_id, user_id, role_id).await {
        Ok(GrantOutcome::Granted) | Ok(GrantOutcome::AlreadyHeld) => Ok(nickname),
        Err(e) => {
            tracing::error!(user_id, guild_id, role_id, error = %e, "Failed to grant verification role");
            Err(match e {
                RoleError::MemberNotFound(_) => "You are no longer a member of that server.",
                RoleError::RoleNotFound(_) => "That role no longer exists.",
                RoleError::Forbidden(_) => "I don't have permission to give you that role.",
                RoleError::Api(_) => "Something went wrong while verifying you.",
            }
            .to_string())
        }
    }
}
