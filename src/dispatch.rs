use std::sync::Arc;

use evlog::meta;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::commands::CommandRegistry;
use crate::helpers::command_resp::{CommandInteraction, Reply};
use crate::reaction::{ReactionResolver, ReactionRoleStrategy, ReactionSource, ResolvedReaction};
use crate::runtime::get_logger;

pub const UNRECOGNIZED_REPLY: &str = "Command not recognized.";

/// An inbound gateway event, already narrowed to what the bot handles.
pub enum BotEvent {
    Ready { user: String },
    InteractionCreate(Box<dyn CommandInteraction>),
    ReactionAdd(Box<dyn ReactionSource>),
    ReactionRemove(Box<dyn ReactionSource>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ready,
    Executed { command: String },
    Unrecognized { command: String },
    ReactionAdded(ResolvedReaction),
    ReactionRemoved(ResolvedReaction),
}

pub struct EventDispatcher {
    registry: Arc<CommandRegistry>,
    resolver: ReactionResolver,
    roles: Arc<dyn ReactionRoleStrategy>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<CommandRegistry>, roles: Arc<dyn ReactionRoleStrategy>) -> Self {
        Self {
            registry,
            resolver: ReactionResolver,
            roles,
        }
    }

    /// Handles one event. Handler and role-strategy errors are returned, not swallowed.
    pub async fn dispatch(&self, event: BotEvent) -> anyhow::Result<DispatchOutcome> {
        match event {
            BotEvent::Ready { user } => {
                get_logger().info("Discord client is ready.", meta! {
                    "User" => user,
                });
                Ok(DispatchOutcome::Ready)
            }
            BotEvent::InteractionCreate(interaction) => self.dispatch_interaction(interaction.as_ref()).await,
            BotEvent::ReactionAdd(reaction) => {
                let resolved = self.resolve(reaction.as_ref()).await;
                self.roles.reaction_added(&resolved).await?;
                Ok(DispatchOutcome::ReactionAdded(resolved))
            }
            BotEvent::ReactionRemove(reaction) => {
                let resolved = self.resolve(reaction.as_ref()).await;
                self.roles.reaction_removed(&resolved).await?;
                Ok(DispatchOutcome::ReactionRemoved(resolved))
            }
        }
    }

    async fn resolve(&self, reaction: &dyn ReactionSource) -> ResolvedReaction {
        let resolved = self.resolver.resolve(reaction).await;

        get_logger().debug("Reaction resolved.", meta! {
            "MessageID" => resolved.data.message_id,
            "Emoji" => resolved.data.emoji.clone(),
            "Complete" => resolved.is_complete(),
        });

        resolved
    }

    async fn dispatch_interaction(&self, interaction: &dyn CommandInteraction) -> anyhow::Result<DispatchOutcome> {
        let command_name = interaction.command_name().to_owned();

        let cmd = match self.registry.get(&command_name) {
            None => {
                get_logger().info("Unrecognized command invoked.", meta! {
                    "CommandName" => command_name.clone(),
                });
                interaction.reply(Reply::text(UNRECOGNIZED_REPLY)).await?;
                return Ok(DispatchOutcome::Unrecognized { command: command_name });
            }
            Some(v) => v,
        };

        get_logger().info("Executing command.", meta! {
            "CommandName" => command_name.clone(),
        });

        (cmd.handler)(interaction).await?;

        get_logger().info("Done.", meta! {
            "CommandName" => command_name.clone(),
        });

        Ok(DispatchOutcome::Executed { command: command_name })
    }

    /// Reads events until the sender side closes, handling each on its own task.
    ///
    /// Failed or panicking tasks are logged here and never stop the loop.
    /// Returns once every in-flight task has finished.
    pub async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<BotEvent>) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let dispatcher = Arc::clone(&self);
                        tasks.spawn(async move { dispatcher.dispatch(event).await });
                    }
                    None => break,
                },
                Some(finished) = tasks.join_next(), if !tasks.is_empty() => report(finished),
            }
        }

        while let Some(finished) = tasks.join_next().await {
            report(finished);
        }
    }
}

fn report(finished: Result<anyhow::Result<DispatchOutcome>, JoinError>) {
    match finished {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            get_logger().error("Error occurred in event handler.", meta! {
                "Error" => e,
            });
        }
        Err(e) => {
            get_logger().error("Event handler task did not complete.", meta! {
                "Panicked" => e.is_panic(),
                "Error" => e.to_string(),
            });
        }
    }
}
