use std::sync::Arc;

use anyhow::Context;
use evlog::meta;
use serenity::cache::Settings as CacheSettings;
use serenity::client::bridge::gateway::GatewayIntents;
use serenity::http::Http;
use serenity::Client;
use tokio::sync::mpsc;

use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::directory::{CommandDirectory, GuildCommandDirectory};
use crate::dispatch::EventDispatcher;
use crate::handler::BotHandler;
use crate::reaction::{DisabledReactionRoles, ReactionRoleStrategy};
use crate::runtime::get_logger;
use crate::sync::{self, SyncReport};

/// Messages kept per channel so reactions on recent messages resolve without a fetch.
pub const MESSAGE_CACHE_SIZE: usize = 500;

fn configure_cache(settings: &mut CacheSettings) -> &mut CacheSettings {
    settings.max_messages(MESSAGE_CACHE_SIZE)
}

/// One bot connected to one guild. Construct as many as needed; nothing is shared globally.
pub struct BotSession {
    config: Config,
    registry: Arc<CommandRegistry>,
    roles: Arc<dyn ReactionRoleStrategy>,
}

impl BotSession {
    pub fn new(config: Config, registry: CommandRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            roles: Arc::new(DisabledReactionRoles),
        }
    }

    pub fn with_reaction_roles(mut self, roles: Arc<dyn ReactionRoleStrategy>) -> Self {
        self.roles = roles;
        self
    }

    /// Connects to the gateway and runs until the connection ends.
    ///
    /// Command synchronization starts alongside the login and is not awaited.
    pub async fn start(&self) -> anyhow::Result<()> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let dispatcher = Arc::new(EventDispatcher::new(self.registry.clone(), self.roles.clone()));
        tokio::spawn(dispatcher.run(events_rx));

        let mut client = Client::builder(&self.config.token)
            .event_handler(BotHandler::new(events_tx))
            .application_id(self.config.application_id)
            .cache_settings(configure_cache)
            .intents(GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::GUILD_MESSAGE_REACTIONS)
            .await
            .context("Client initialization error.")?;

        let directory: Arc<dyn CommandDirectory> = Arc::new(GuildCommandDirectory::new(
            client.cache_and_http.http.clone(),
            self.config.guild_id,
        ));
        sync::spawn_startup_sync(directory, self.registry.clone());

        get_logger().info("Connecting to gateway.", meta! {
            "GuildID" => self.config.guild_id,
            "Commands" => self.registry.names(),
        });

        client.start().await.context("Client error.")
    }

    /// Runs one ordered synchronization without connecting to the gateway.
    pub async fn sync_commands(&self) -> anyhow::Result<()> {
        let http = Http::new_with_token_application_id(&self.config.token, self.config.application_id);
        let directory = GuildCommandDirectory::new(Arc::new(http), self.config.guild_id);

        let report = sync::synchronize(&directory, &self.registry).await;
        check_sync_report(self.config.guild_id, self.registry.len(), &report)
    }
}

fn check_sync_report(guild_id: u64, command_count: usize, report: &SyncReport) -> anyhow::Result<()> {
    if !report.registered {
        get_logger().error("Command synchronization failed; registered commands were not replaced.", meta! {
            "GuildID" => guild_id,
            "Deleted" => report.removal.deleted.len(),
            "FailedDeletes" => report.removal.failed.len(),
        });
        anyhow::bail!("failed to register commands in guild {}", guild_id);
    }

    get_logger().info("Synchronized commands.", meta! {
        "GuildID" => guild_id,
        "CommandCount" => command_count,
        "Deleted" => report.removal.deleted.len(),
        "FailedDeletes" => report.removal.failed.len(),
    });

    Ok(())
}
