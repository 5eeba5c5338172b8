// Profile commands: register, list and look up member profiles.
//
// Same shape as every other command file:
// 1. Pull ids and strings out of the Discord types
// 2. Call the profile service
// 3. Render the result as an embed

use crate::core::profiles::{ProfileError, ProfileInput, RegistrationOutcome, PROFILES_PER_PAGE};
use crate::discord::embeds::{self, error_reply};
use crate::discord::{is_admin, Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, PartialEq, poise::ChoiceParameter)]
pub enum Gender {
    Male,
    Female,
    Other,
    #[name = "Prefer not to say"]
    Undisclosed,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::Undisclosed => "Prefer not to say",
        }
    }
}

/// Register or update a profile.
#[poise::command(slash_command, guild_only)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Nickname or name to display"] nickname: String,
    #[description = "Birth year (e.g. 2008 or 08)"] birth_year: String,
    #[description = "Gender"] gender: Gender,
    #[description = "Region you live in (e.g. Seoul)"] region: String,
    #[description = "Member to register (administrators only)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let is_self = target.id == ctx.author().id;

    if !is_self && !is_admin(ctx) {
        ctx.send(error_reply(
            "You need the Administrator permission to edit another member's profile.",
        ))
        .await?;
        return Ok(());
    }

    let input = match ProfileInput::new(&target.tag(), &nickname, &birth_year, gender.label(), &region)
    {
        Ok(input) => input,
        Err(ProfileError::Validation(reason)) => {
            ctx.send(error_reply(reason)).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = ctx
        .data()
        .profiles
        .register_profile(target.id.get(), input.clone())
        .await?;

    let verb = match outcome {
        RegistrationOutcome::Created => "registered",
        RegistrationOutcome::Updated => "updated",
    };
    let title = if is_self {
        format!("Profile {}", verb)
    } else {
        format!("Profile {} for {}", verb, target.name)
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .description("The profile was saved successfully!")
        .color(embeds::SUCCESS)
        .timestamp(serenity::Timestamp::now());

    if !is_self {
        embed = embed.field("Member", format!("<@{}>", target.id), false);
    }

    embed = embed
        .field("Nickname", &input.display_name, true)
        .field("Birth year", &input.birth_year, true)
        .field("Gender", &input.gender, true)
        .field("Region", &input.region, true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Registered by {}",
            ctx.author().tag()
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List every registered profile.
#[poise::command(slash_command, guild_only)]
pub async fn profiles(
    ctx: Context<'_>,
    #[description = "Page to show (defaults to 1)"]
    #[min = 1]
    page: Option<u32>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let page = ctx
        .data()
        .profiles
        .profile_page(page.unwrap_or(1) as usize, PROFILES_PER_PAGE)
        .await?;

    if page.entries.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .embed(
                    serenity::CreateEmbed::new()
                        .description("No profiles have been registered yet.")
                        .color(embeds::NEUTRAL),
                )
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let lines: Vec<String> = page
        .entries
        .iter()
        .enumerate()
        .map(|(offset, profile)| {
            format!(
                "{}. **{}** - <@{}>",
                page.first_index + offset + 1,
                profile.display_name,
                profile.user_id
            )
        })
        .collect();

    let mut embed = serenity::CreateEmbed::new()
        .title("Registered profiles")
        .color(embeds::INFO)
        .field("Members", lines.join("\n"), false)
        .timestamp(serenity::Timestamp::now());

    if page.total_pages > 1 {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{}",
            page.page, page.total_pages
        )));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show a member's profile.
#[poise::command(slash_command, guild_only)]
pub async fn info(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let user_id = target.id.get();
    let data = ctx.data();

    let profile = match data.profiles.get_profile(user_id).await? {
        Some(profile) => profile,
        None => {
            ctx.send(error_reply(format!(
                "<@{}> has no registered profile.",
                user_id
            )))
            .await?;
            return Ok(());
        }
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s profile", profile.display_name))
        .color(embeds::INFO)
        .thumbnail(target.face())
        .field("Discord", format!("<@{}>", user_id), false)
        .field("Nickname", &profile.display_name, true)
        .field("Birth year", &profile.birth_year, true)
        .field("Gender", &profile.gender, true)
        .field("Region", &profile.region, true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Registered {}",
            embeds::local_date(profile.registered_at, data.timezone)
        )))
        .timestamp(serenity::Timestamp::now());

    if is_admin(ctx) {
        if let Some(admin) = data.profiles.get_admin_info(user_id).await? {
            let memo = if admin.admin_memo.is_empty() {
                "None".to_string()
            } else {
                admin.admin_memo
            };
            embed = embed
                .field("\u{200b}", "**--- Admin only ---**", false)
                .field("Warnings", admin.warning_count.to_string(), true)
                .field("Admin memo", memo, false);
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_labels_pass_validation() {
        for gender in [Gender::Male, Gender::Female, Gender::Other, Gender::Undisclosed] {
            let input = ProfileInput::new("user#0", "nick", "2000", gender.label(), "Seoul").unwrap();
            assert_eq!(input.gender, gender.label());
        }
    }
}
