// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite stores)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands, event handlers and shutdown hooks

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::extensions::ExtensionLoader;
use crate::core::lifecycle::Lifecycle;
use crate::core::logging::LoggingService;
use crate::core::profiles::ProfileService;
use crate::core::reaction_roles::ReactionRoleService;
use crate::discord::logging::events as logging_events;
use crate::discord::reaction_roles::{events as reaction_events, verification};
use crate::discord::{commands, embeds, presence, Data, Error};
use crate::infra::logging::SqliteSettingsStore;
use crate::infra::profiles::SqliteProfileStore;
use crate::infra::reaction_roles::SqliteReactionRoleStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Messages Serenity keeps per channel, so edits arrive with the old content.
const CACHED_MESSAGES_PER_CHANNEL: usize = 10_000;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            logging_events::handle_message(data, new_message);
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = logging_events::handle_member_join(ctx, data, new_member).await {
                tracing::error!("Error handling member join log: {}", e);
            }
        }
        serenity::FullEvent::GuildMemberRemoval {
            guild_id,
            user,
            member_data_if_available,
        } => {
            if let Err(e) = logging_events::handle_member_remove(
                ctx,
                data,
                *guild_id,
                user,
                member_data_if_available.as_ref(),
            )
            .await
            {
                tracing::error!("Error handling member remove log: {}", e);
            }
        }
        serenity::FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            guild_id,
        } => {
            if let Err(e) = logging_events::handle_message_delete(
                ctx,
                data,
                *channel_id,
                *deleted_message_id,
                *guild_id,
            )
            .await
            {
                tracing::error!("Error handling message delete: {}", e);
            }
        }
        serenity::FullEvent::MessageUpdate {
            old_if_available,
            event,
            ..
        } => {
            if let Err(e) =
                logging_events::handle_message_update(ctx, data, old_if_available.as_ref(), event)
                    .await
            {
                tracing::error!("Error handling message update: {}", e);
            }
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            if let Err(e) = reaction_events::handle_reaction_add(ctx, data, add_reaction).await {
                tracing::error!("Error handling reaction add: {}", e);
            }
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            if let Err(e) =
                reaction_events::handle_reaction_remove(ctx, data, removed_reaction).await
            {
                tracing::error!("Error handling reaction remove: {}", e);
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            if let Err(e) = verification::handle_interaction(ctx, data, interaction).await {
                tracing::error!("Error handling verification interaction: {}", e);
            }
        }

        _ => {}
    }

    Ok(())
}

/// Command errors get a generic ephemeral reply so the interaction never hangs.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                user_id = ctx.author().id.get(),
                "Command failed: {}",
                error
            );
            if let Err(e) = ctx
                .send(embeds::error_reply(
                    "Something went wrong while running this command.",
                ))
                .await
            {
                tracing::warn!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // One SQLite pool shared by every store. Storage is the only thing that
    // must come up for the bot to start.

    let pool = match init_storage(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(path = %config.database_path, "Failed to initialize storage: {:#}", e);
            std::process::exit(1);
        }
    };

    let data = Data {
        profiles: Arc::new(ProfileService::new(SqliteProfileStore::new(pool.clone()))),
        logging: Arc::new(LoggingService::new(SqliteSettingsStore::new(pool.clone()))),
        reaction_roles: Arc::new(ReactionRoleService::new(SqliteReactionRoleStore::new(
            pool.clone(),
        ))),
        timezone: config.timezone,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let mut loader = ExtensionLoader::new();
    let report = loader.load_all(&commands::extensions()).clone();
    if report.failed.is_empty() {
        tracing::info!(count = report.loaded.len(), "Loaded all extensions");
    } else {
        tracing::warn!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Some extensions failed to load: {:?}",
            report.failed
        );
    }

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let activity = config.activity.clone();
    let dev_guild_id = config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: loader.into_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::info!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        guild_id = ctx.guild_id().map(|g| g.get()),
                        "Running command"
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "Bot is starting up...");

                // Guild registration shows up instantly; global can take up to an hour.
                match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        tracing::info!(guild_id, "Commands registered in development guild");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        tracing::info!("Commands registered globally");
                    }
                }

                presence::on_ready(ctx, &activity);
                tracing::info!("Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut cache_settings = ::serenity::cache::Settings::default();
    cache_settings.max_messages = CACHED_MESSAGES_PER_CHANNEL;

    let mut client = match serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .cache_settings(cache_settings)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Error creating client: {}", e);
            std::process::exit(1);
        }
    };

    // ========================================================================
    // SHUTDOWN
    // ========================================================================

    let lifecycle = Arc::new(Lifecycle::new());

    let shard_manager = client.shard_manager.clone();
    lifecycle
        .on_shutdown("shards", move || async move {
            shard_manager.shutdown_all().await;
        })
        .await;

    let shutdown_pool = pool.clone();
    lifecycle
        .on_shutdown("database", move || async move {
            shutdown_pool.close().await;
        })
        .await;

    let signal_lifecycle = Arc::clone(&lifecycle);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        signal_lifecycle.shutdown().await;
    });

    if let Err(e) = client.start().await {
        tracing::error!("Client error: {}", e);
    }

    // The gateway can also stop on its own; the hooks still need to run.
    if !lifecycle.is_shutting_down() {
        tracing::warn!("Gateway connection closed without a shutdown signal");
    }
    lifecycle.shutdown().await;
}

/// Open the database and bring every table up to date.
async fn init_storage(path: &str) -> anyhow::Result<sqlx::Pool<sqlx::Sqlite>> {
    let pool = infra::database::connect(path).await?;

    SqliteProfileStore::new(pool.clone()).migrate().await?;
    SqliteSettingsStore::new(pool.clone()).migrate().await?;
    SqliteReactionRoleStore::new(pool.clone()).migrate().await?;

    tracing::info!(path, "Database ready");
    Ok(pool)
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
    }
}
